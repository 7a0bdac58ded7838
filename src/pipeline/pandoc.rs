//! Document conversion with pandoc, and routing to the requested format.

use crate::config::ConversionConfig;
use crate::error::AttemptError;
use crate::pipeline::doc;
use crate::pipeline::tools::{Tool, ToolCommands, ToolInvocation};
use crate::pipeline::workspace::ensure_parent;
use crate::request::TargetFormat;
use crate::strategy::{Deliverable, StrategyContext};
use std::path::Path;

/// Reader used for extracted plain text.
///
/// pandoc has no plain-text reader, so the text is first escaped with
/// [`text_to_markdown`](crate::pipeline::markup::text_to_markdown) and read
/// back as Markdown.
pub const TEXT_READER: &str = "markdown";

/// `--standalone` / `--toc` switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PandocOptions {
    pub standalone: bool,
    pub toc: bool,
}

impl PandocOptions {
    /// No extra switches.
    pub const BARE: PandocOptions = PandocOptions {
        standalone: false,
        toc: false,
    };

    pub fn from_config(config: &ConversionConfig) -> Self {
        Self {
            standalone: config.standalone,
            toc: config.table_of_contents,
        }
    }
}

/// One pandoc run.
#[derive(Debug, Clone, Copy)]
pub struct PandocJob<'p> {
    pub from: &'p str,
    pub to: &'p str,
    pub input: &'p Path,
    pub output: &'p Path,
    pub options: PandocOptions,
}

impl PandocJob<'_> {
    pub fn invocation(&self, commands: &ToolCommands) -> ToolInvocation {
        let mut inv = commands
            .invoke(Tool::Pandoc)
            .args(["-f", self.from, "-t", self.to]);
        if self.options.standalone {
            inv = inv.arg("--standalone");
        }
        if self.options.toc {
            inv = inv.arg("--toc");
        }
        inv.arg("-o").arg(self.output).arg(self.input)
    }
}

/// Run pandoc and require a non-empty output.
pub fn run_pandoc(ctx: &StrategyContext<'_>, job: &PandocJob<'_>) -> Result<(), AttemptError> {
    ensure_parent(job.output)
        .map_err(|e| AttemptError::io(format!("creating directory for {}", job.output.display()), e))?;
    if job.output.exists() {
        std::fs::remove_file(job.output)
            .map_err(|e| AttemptError::io(format!("removing stale {}", job.output.display()), e))?;
    }
    ctx.run(&job.invocation(&ctx.config.tools))?;
    ctx.require_artifact(job.output)
}

/// Convert `input` (in pandoc format `from`) to the requested format.
///
/// ODT and DOCX are written by pandoc directly. DOC goes through a staging
/// DOCX and a DOC converter, degrading to the DOCX when no converter works.
pub fn produce_target(
    ctx: &StrategyContext<'_>,
    from: &str,
    input: &Path,
    options: PandocOptions,
) -> Result<Deliverable, AttemptError> {
    let format = ctx.request.format();
    match format.pandoc_writer() {
        Some(writer) => {
            ctx.step(&format!("Generating {}…", format.extension().to_uppercase()));
            let output = ctx.workspace.output_file(format);
            run_pandoc(
                ctx,
                &PandocJob {
                    from,
                    to: writer,
                    input,
                    output: &output,
                    options,
                },
            )?;
            Ok(Deliverable::new(output, format))
        }
        None => {
            ctx.step("Generating DOC (via DOCX)…");
            let docx = ctx.workspace.docx_staging_file();
            run_pandoc(
                ctx,
                &PandocJob {
                    from,
                    to: TargetFormat::Docx.extension(),
                    input,
                    output: &docx,
                    options,
                },
            )?;
            doc::docx_to_doc(ctx, &docx)
        }
    }
}
