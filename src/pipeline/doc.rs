//! DOCX → DOC conversion, with DOCX substitution as the last resort.
//!
//! Two interchangeable converters exist (LibreOffice headless and unoconv).
//! Each is tried in the configured order; a converter counts as successful
//! only when it exits 0 *and* leaves a non-empty `.doc` behind. If none
//! does, the staging DOCX itself becomes the deliverable and the result
//! carries a [`Substitution`] notice. That is a soft outcome, never a
//! strategy failure.

use crate::error::AttemptError;
use crate::output::Substitution;
use crate::pipeline::tools::{Tool, ToolCommands, ToolInvocation};
use crate::pipeline::workspace::is_non_empty;
use crate::request::TargetFormat;
use crate::strategy::{Deliverable, StrategyContext};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A program able to turn DOCX into DOC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocConverter {
    /// `libreoffice --headless --convert-to doc --outdir <dir> <docx>`
    LibreOffice,
    /// `unoconv -f doc -o <dir>/<stem>.doc <docx>`
    Unoconv,
}

impl DocConverter {
    pub const DEFAULT_ORDER: [DocConverter; 2] = [DocConverter::LibreOffice, DocConverter::Unoconv];

    pub fn tool(self) -> Tool {
        match self {
            DocConverter::LibreOffice => Tool::LibreOffice,
            DocConverter::Unoconv => Tool::Unoconv,
        }
    }

    /// The `.doc` this converter writes for `docx` into `out_dir`.
    pub fn expected_output(docx: &Path, out_dir: &Path) -> PathBuf {
        let stem = docx
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        out_dir.join(format!("{stem}.{}", TargetFormat::Doc.extension()))
    }

    pub fn invocation(self, commands: &ToolCommands, docx: &Path, out_dir: &Path) -> ToolInvocation {
        let inv = commands.invoke(self.tool());
        match self {
            DocConverter::LibreOffice => inv
                .args(["--headless", "--convert-to", "doc", "--outdir"])
                .arg(out_dir)
                .arg(docx),
            DocConverter::Unoconv => inv
                .args(["-f", "doc", "-o"])
                .arg(Self::expected_output(docx, out_dir))
                .arg(docx),
        }
    }
}

impl fmt::Display for DocConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tool(), f)
    }
}

/// Convert a staging DOCX to DOC, or fall back to delivering the DOCX.
pub fn docx_to_doc(ctx: &StrategyContext<'_>, docx: &Path) -> Result<Deliverable, AttemptError> {
    let out_dir = ctx
        .workspace
        .doc_dir()
        .map_err(|e| AttemptError::io("creating DOC output directory", e))?;
    let expected = DocConverter::expected_output(docx, &out_dir);

    for converter in &ctx.config.doc_converters {
        // A leftover from an earlier strategy must not pass for fresh output.
        if expected.exists() {
            std::fs::remove_file(&expected)
                .map_err(|e| AttemptError::io(format!("removing stale {}", expected.display()), e))?;
        }

        ctx.step(&format!("Converting DOCX to DOC with {converter}…"));
        match ctx.run(&converter.invocation(&ctx.config.tools, docx, &out_dir)) {
            Ok(_) if is_non_empty(&expected) => {
                info!("{} produced {}", converter, expected.display());
                ctx.record_artifact(&expected);
                return Ok(Deliverable::new(expected, TargetFormat::Doc));
            }
            Ok(_) => warn!("{} exited successfully but wrote no DOC", converter),
            Err(e) => warn!("{} unavailable: {}", converter, e),
        }
    }

    let substitution = Substitution {
        requested: TargetFormat::Doc,
        delivered: TargetFormat::Docx,
    };
    ctx.step("Cannot convert directly to DOC. Generating DOCX instead…");
    Ok(Deliverable::substituted(docx.to_path_buf(), substitution))
}
