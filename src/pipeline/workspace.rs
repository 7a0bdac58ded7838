//! Per-request scratch directory.
//!
//! Every intermediate artifact (extracted text, markdown, HTML, SVG pages,
//! the ODT bridge, DOCX staging files) lives under one [`TempDir`]. Dropping
//! the [`Workspace`] removes the whole tree, so cleanup happens on every exit
//! path including panics unwinding through the orchestrator.

use crate::request::TargetFormat;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;

/// Prefix of workspace directory names.
pub const WORKSPACE_PREFIX: &str = "pdf2doc-";

/// Scratch directory owned by exactly one conversion request.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    stem: String,
}

impl Workspace {
    /// Create a workspace under `root`, or the system temp dir when `None`.
    pub fn create(root: Option<&Path>, stem: &str) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        debug!("Workspace created at {}", dir.path().display());
        Ok(Self {
            dir,
            stem: stem.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// `<stem>.txt`, the extracted text shared by all strategies.
    pub fn text_file(&self) -> PathBuf {
        self.file("txt")
    }

    /// `<stem>.text.md`, the extracted text escaped for pandoc's Markdown reader.
    pub fn text_markdown_file(&self) -> PathBuf {
        self.file("text.md")
    }

    pub fn markdown_file(&self) -> PathBuf {
        self.file("md")
    }

    pub fn html_file(&self) -> PathBuf {
        self.file("html")
    }

    /// `<stem>.odt` bridge document for the rescue strategy.
    pub fn bridge_file(&self) -> PathBuf {
        self.subdir_file("bridge", "odt")
    }

    /// Staging DOCX that a DOC converter reads.
    pub fn docx_staging_file(&self) -> PathBuf {
        self.subdir_file("staging", TargetFormat::Docx.extension())
    }

    /// Where a strategy writes its final document for `format`.
    pub fn output_file(&self, format: TargetFormat) -> PathBuf {
        self.subdir_file("out", format.extension())
    }

    /// Directory for per-page SVG renders.
    pub fn svg_dir(&self) -> io::Result<PathBuf> {
        self.ensure_dir("svg")
    }

    /// Directory a DOC converter writes into.
    pub fn doc_dir(&self) -> io::Result<PathBuf> {
        self.ensure_dir("doc")
    }

    /// Create `name` under the workspace (idempotent).
    pub fn ensure_dir(&self, name: &str) -> io::Result<PathBuf> {
        let dir = self.path().join(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Remove the workspace now, reporting any I/O error.
    ///
    /// Dropping has the same effect but swallows errors.
    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        debug!("Workspace removed: {}", path.display());
        Ok(())
    }

    fn file(&self, ext: &str) -> PathBuf {
        self.path().join(format!("{}.{ext}", self.stem))
    }

    /// Files that name-collide across steps get their own subdirectory so
    /// a stale artifact from a failed strategy is never mistaken for a new one.
    fn subdir_file(&self, sub: &str, ext: &str) -> PathBuf {
        self.path().join(sub).join(format!("{}.{ext}", self.stem))
    }
}

/// True when `path` exists and has a non-zero size.
pub fn is_non_empty(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Make sure the parent directory of `path` exists.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
