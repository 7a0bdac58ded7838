//! Configuration types for PDF-to-document conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to move a config onto a background thread and to log exactly
//! which tools a run used.

use crate::error::Pdf2DocError;
use crate::pipeline::doc::DocConverter;
use crate::pipeline::input;
use crate::pipeline::tools::{SharedToolRunner, SystemToolRunner, Tool, ToolCommands, ToolRunner};
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a PDF-to-document conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdf2doc::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output_dir("/tmp/converted")
///     .table_of_contents(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Directory the finished document is written to.
    /// If None, uses [`input::default_output_dir`] (the desktop).
    pub output_dir: Option<PathBuf>,

    /// Parent directory for per-request workspaces. If None, the system
    /// temporary directory.
    pub temp_root: Option<PathBuf>,

    /// Pass `--toc` to pandoc in the rich and plain-text strategies. Default: true.
    pub table_of_contents: bool,

    /// Pass `--standalone` to pandoc in the rich and plain-text strategies. Default: true.
    pub standalone: bool,

    /// Render each page to SVG for the rich strategy. Default: true.
    ///
    /// When false the rich strategy embeds the extracted text only.
    pub vector_pages: bool,

    /// Program names for each external tool.
    pub tools: ToolCommands,

    /// DOCX → DOC converters, tried in order. Default: LibreOffice, unoconv.
    ///
    /// An empty list makes every DOC request deliver DOCX.
    pub doc_converters: Vec<DocConverter>,

    /// Pre-constructed tool runner. If None, uses [`SystemToolRunner`].
    pub runner: Option<SharedToolRunner>,

    /// Receives progress events while a conversion runs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            temp_root: None,
            table_of_contents: true,
            standalone: true,
            vector_pages: true,
            tools: ToolCommands::default(),
            doc_converters: DocConverter::DEFAULT_ORDER.to_vec(),
            runner: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output_dir", &self.output_dir)
            .field("temp_root", &self.temp_root)
            .field("table_of_contents", &self.table_of_contents)
            .field("standalone", &self.standalone)
            .field("vector_pages", &self.vector_pages)
            .field("tools", &self.tools)
            .field("doc_converters", &self.doc_converters)
            .field("runner", &self.runner.as_ref().map(|_| "<dyn ToolRunner>"))
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured runner, or a fresh [`SystemToolRunner`].
    pub fn runner(&self) -> SharedToolRunner {
        match self.runner {
            Some(ref runner) => Arc::clone(runner),
            None => Arc::new(SystemToolRunner),
        }
    }

    /// The configured output directory, or the desktop.
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(input::default_output_dir)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_root = Some(dir.into());
        self
    }

    pub fn table_of_contents(mut self, v: bool) -> Self {
        self.config.table_of_contents = v;
        self
    }

    pub fn standalone(mut self, v: bool) -> Self {
        self.config.standalone = v;
        self
    }

    pub fn vector_pages(mut self, v: bool) -> Self {
        self.config.vector_pages = v;
        self
    }

    /// Override the program used for one tool.
    pub fn tool(mut self, tool: Tool, program: impl Into<String>) -> Self {
        self.config.tools.set(tool, program);
        self
    }

    pub fn doc_converters(mut self, converters: Vec<DocConverter>) -> Self {
        self.config.doc_converters = converters;
        self
    }

    pub fn runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.config.runner = Some(runner);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2DocError> {
        let c = &self.config;
        for tool in Tool::ALL {
            if c.tools.program(tool).trim().is_empty() {
                return Err(Pdf2DocError::InvalidConfig(format!(
                    "program for {tool} must not be empty"
                )));
            }
        }
        if let Some(ref dir) = c.output_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(Pdf2DocError::InvalidConfig(format!(
                    "output directory '{}' exists and is not a directory",
                    dir.display()
                )));
            }
        }
        if let Some(ref dir) = c.temp_root {
            if !dir.is_dir() {
                return Err(Pdf2DocError::InvalidConfig(format!(
                    "temporary root '{}' is not an existing directory",
                    dir.display()
                )));
            }
        }
        Ok(self.config)
    }
}
