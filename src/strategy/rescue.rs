use super::{AttemptOutcome, Strategy, StrategyContext};
use crate::pipeline::extract;
use crate::pipeline::pandoc::{self, PandocJob, PandocOptions, TEXT_READER};

/// Last resort: text → ODT bridge document → target, without `--toc` or
/// `--standalone`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OdtBridgeStrategy;

impl Strategy for OdtBridgeStrategy {
    fn name(&self) -> &'static str {
        "odt-bridge"
    }

    fn attempt(&self, ctx: &StrategyContext<'_>) -> AttemptOutcome {
        ctx.step("Trying final rescue method…");
        let text_path = extract::ensure_text(ctx)?;
        let text = extract::read_text(&text_path)?;
        extract::require_text(&text)?;

        ctx.step("Creating ODT bridge document…");
        let source = extract::write_markdown_source(ctx, &text)?;
        let bridge = ctx.workspace.bridge_file();
        pandoc::run_pandoc(
            ctx,
            &PandocJob {
                from: TEXT_READER,
                to: "odt",
                input: &source,
                output: &bridge,
                options: PandocOptions::BARE,
            },
        )?;

        pandoc::produce_target(ctx, "odt", &bridge, PandocOptions::BARE)
    }
}
