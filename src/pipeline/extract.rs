//! Text extraction with `pdftotext`.

use crate::error::AttemptError;
use crate::pipeline::markup;
use crate::pipeline::tools::Tool;
use crate::pipeline::workspace::is_non_empty;
use crate::strategy::StrategyContext;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How `pdftotext` lays out the text it writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    /// `-layout -nopgbrk`: keep the physical layout, no form feeds.
    Layout,
    /// Reading order, default flags.
    Plain,
}

/// Run `pdftotext` in `mode`, writing to `dest`. Returns the byte size.
pub fn extract_text(ctx: &StrategyContext<'_>, mode: TextMode, dest: &Path) -> Result<u64, AttemptError> {
    let mut inv = ctx.invoke(Tool::PdfToText);
    if mode == TextMode::Layout {
        inv = inv.args(["-layout", "-nopgbrk"]);
    }
    let inv = inv.arg(ctx.request.source()).arg(dest);
    ctx.run(&inv)?;

    let size = std::fs::metadata(dest).map(|m| m.len()).unwrap_or(0);
    ctx.record_artifact(dest);
    debug!("pdftotext ({:?}) wrote {} bytes", mode, size);
    Ok(size)
}

/// Layout-preserving extraction, retried in plain mode when it yields
/// zero bytes.
pub fn extract_with_retry(ctx: &StrategyContext<'_>, dest: &Path) -> Result<u64, AttemptError> {
    let size = extract_text(ctx, TextMode::Layout, dest)?;
    if size > 0 {
        return Ok(size);
    }
    ctx.step("Could not extract text from the PDF. Trying alternative extraction…");
    extract_text(ctx, TextMode::Plain, dest)
}

/// The workspace text file, extracting it only if an earlier strategy did
/// not leave a non-empty one behind.
pub fn ensure_text(ctx: &StrategyContext<'_>) -> Result<PathBuf, AttemptError> {
    let path = ctx.workspace.text_file();
    if is_non_empty(&path) {
        ctx.step("Reusing previously extracted text");
        return Ok(path);
    }
    extract_with_retry(ctx, &path)?;
    Ok(path)
}

/// Read extracted text, replacing invalid UTF-8.
pub fn read_text(path: &Path) -> Result<String, AttemptError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AttemptError::io(format!("reading {}", path.display()), e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write `text` as literal Markdown for pandoc, returning its path.
pub fn write_markdown_source(ctx: &StrategyContext<'_>, text: &str) -> Result<PathBuf, AttemptError> {
    let path = ctx.workspace.text_markdown_file();
    std::fs::write(&path, markup::text_to_markdown(text))
        .map_err(|e| AttemptError::io(format!("writing {}", path.display()), e))?;
    ctx.record_artifact(&path);
    Ok(path)
}

/// Fail with [`AttemptError::NoContent`] when `text` is blank.
pub fn require_text(text: &str) -> Result<(), AttemptError> {
    if text.trim().is_empty() {
        return Err(AttemptError::NoContent {
            detail: "the PDF contains no extractable text".to_string(),
        });
    }
    Ok(())
}
