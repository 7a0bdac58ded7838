use super::{AttemptOutcome, Strategy, StrategyContext};
use crate::pipeline::extract;
use crate::pipeline::pandoc::{self, PandocJob, PandocOptions, TEXT_READER};

/// Extracted text → Markdown → target.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextStrategy;

impl Strategy for PlainTextStrategy {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn attempt(&self, ctx: &StrategyContext<'_>) -> AttemptOutcome {
        ctx.step("Trying alternative method (text only)…");
        let text_path = ctx.workspace.text_file();
        extract::extract_with_retry(ctx, &text_path)?;
        let text = extract::read_text(&text_path)?;
        extract::require_text(&text)?;

        ctx.step("Converting text to Markdown…");
        let source = extract::write_markdown_source(ctx, &text)?;
        let md_path = ctx.workspace.markdown_file();
        pandoc::run_pandoc(
            ctx,
            &PandocJob {
                from: TEXT_READER,
                to: "markdown",
                input: &source,
                output: &md_path,
                options: PandocOptions::BARE,
            },
        )?;

        pandoc::produce_target(ctx, "markdown", &md_path, PandocOptions::from_config(ctx.config))
    }
}
