use super::{AttemptOutcome, Strategy, StrategyContext};
use crate::error::AttemptError;
use crate::pipeline::extract::{self, TextMode};
use crate::pipeline::pandoc::{self, PandocOptions};
use crate::pipeline::{markup, render};

/// Text plus vector pages, assembled into one HTML document for pandoc.
///
/// With no SVG pages (renderer missing, `vector_pages` off, or every page
/// failed) the HTML carries the extracted text as paragraphs instead, so
/// this strategy still produces a document on text-only systems.
#[derive(Debug, Default, Clone, Copy)]
pub struct RichReconstructionStrategy;

impl Strategy for RichReconstructionStrategy {
    fn name(&self) -> &'static str {
        "rich-reconstruction"
    }

    fn attempt(&self, ctx: &StrategyContext<'_>) -> AttemptOutcome {
        ctx.step("Extracting text…");
        let text_path = ctx.workspace.text_file();
        extract::extract_text(ctx, TextMode::Layout, &text_path)?;
        let text = extract::read_text(&text_path)?;

        let pages = if ctx.config.vector_pages {
            ctx.step("Converting PDF to SVG…");
            render::render_svg_pages(ctx)
        } else {
            Vec::new()
        };
        if pages.is_empty() {
            extract::require_text(&text)?;
        }

        ctx.step("Creating HTML document…");
        let html_path = ctx.workspace.html_file();
        std::fs::write(&html_path, markup::build_html(&pages, &text))
            .map_err(|e| AttemptError::io(format!("writing {}", html_path.display()), e))?;
        ctx.record_artifact(&html_path);

        pandoc::produce_target(ctx, "html", &html_path, PandocOptions::from_config(ctx.config))
    }
}
