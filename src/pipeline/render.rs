//! Vector page rendering: one SVG per page via `pdftocairo -svg`.
//!
//! ## Why one invocation per page?
//!
//! `pdftocairo -svg` writes a single output file. Rendering page ranges of
//! one page each gives one file per page, which is what the HTML assembly
//! needs to wrap every page in its own block. The page count comes from
//! `pdfinfo`, shipped in the same poppler-utils package.
//!
//! Rendering never fails the strategy: a page that cannot be rendered is
//! skipped, and an empty result makes the rich strategy fall back to text
//! paragraphs. Blank pages render to a valid SVG with nothing drawn on it;
//! those are dropped too, so a PDF with no text and only blank pages has no
//! content at all.

use crate::error::{AttemptError, ToolError};
use crate::pipeline::markup::{self, SvgPage};
use crate::pipeline::tools::Tool;
use crate::pipeline::workspace::is_non_empty;
use crate::strategy::StrategyContext;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

static RE_PAGES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^Pages:\s+(\d+)\s*$").unwrap());

/// Extract the page count from `pdfinfo` output.
pub fn parse_page_count(pdfinfo_stdout: &str) -> Option<usize> {
    RE_PAGES
        .captures(pdfinfo_stdout)
        .and_then(|caps| caps[1].parse().ok())
}

/// Number of pages in the source PDF, via `pdfinfo`.
pub fn page_count(ctx: &StrategyContext<'_>) -> Result<usize, AttemptError> {
    let inv = ctx.invoke(Tool::PdfInfo).arg(ctx.request.source());
    let out = ctx.run(&inv)?;
    parse_page_count(&out.stdout).ok_or_else(|| AttemptError::Io {
        context: "parsing pdfinfo output".to_string(),
        detail: "no 'Pages:' line".to_string(),
    })
}

/// Render every page to SVG, returning the pages that have something drawn
/// on them, in page order.
pub fn render_svg_pages(ctx: &StrategyContext<'_>) -> Vec<SvgPage> {
    let total = match page_count(ctx) {
        Ok(n) => n,
        Err(e) => {
            warn!("Cannot determine page count: {}", e);
            ctx.step(&format!("Vector rendering unavailable: {e}"));
            return Vec::new();
        }
    };

    let svg_dir = match ctx.workspace.svg_dir() {
        Ok(d) => d,
        Err(e) => {
            warn!("Cannot create SVG directory: {}", e);
            return Vec::new();
        }
    };

    let stem = ctx.workspace.stem();
    let mut pages = Vec::with_capacity(total);

    for page in 1..=total {
        let dest = svg_dir.join(format!("{stem}-{page:04}.svg"));
        let page_arg = page.to_string();
        let inv = ctx
            .invoke(Tool::PdfToCairo)
            .arg("-svg")
            .args(["-f", page_arg.as_str(), "-l", page_arg.as_str()])
            .arg(ctx.request.source())
            .arg(&dest);

        match ctx.run(&inv) {
            Ok(_) if is_non_empty(&dest) => match std::fs::read_to_string(&dest) {
                Ok(svg) if markup::svg_has_content(&svg) => {
                    ctx.record_artifact(&dest);
                    pages.push(SvgPage { path: dest, svg });
                }
                Ok(_) => debug!("Page {}: blank, skipped", page),
                Err(e) => warn!("Page {}: unreadable SVG: {}", page, e),
            },
            Ok(_) => warn!("Page {}: pdftocairo produced no SVG", page),
            Err(e @ ToolError::Missing { .. }) => {
                warn!("{}", e);
                break;
            }
            Err(e) => warn!("Page {}: {}", page, e),
        }
    }

    info!("Rendered {}/{} pages to SVG", pages.len(), total);
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pdfinfo_pages_line() {
        let out = "Title:          Annual report\nProducer:       LibreOffice\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(out), Some(12));
    }

    #[test]
    fn missing_pages_line_is_none() {
        assert_eq!(parse_page_count("Title: x\n"), None);
        assert_eq!(parse_page_count(""), None);
    }
}
