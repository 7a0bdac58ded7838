//! # edgequake-pdf2doc
//!
//! Convert PDF documents to editable word-processor files (ODT, DOC, DOCX)
//! by orchestrating poppler-utils, pandoc and, for DOC, LibreOffice or
//! unoconv.
//!
//! ## Why a fallback chain?
//!
//! No single PDF → document path works for every PDF. Vector reconstruction
//! keeps the page appearance but depends on a renderer; plain text survives
//! almost anything but loses layout. The orchestrator tries the richest
//! strategy first and falls back until one produces a non-empty file:
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. rich-reconstruction  pdftotext + pdftocairo -svg → HTML → pandoc
//!  ├─ 2. plain-text           pdftotext (retry w/o layout) → Markdown → pandoc
//!  └─ 3. odt-bridge           text → ODT → pandoc
//!                                                        │
//!                     DOC: pandoc → DOCX → LibreOffice / unoconv → DOC
//!                          (no converter: deliver DOCX + notice)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2doc::{convert, ConversionConfig, ConversionRequest, TargetFormat};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let request = ConversionRequest::new("report.pdf", TargetFormat::Docx)?;
//!     let config = ConversionConfig::builder().output_dir("converted").build()?;
//!     let result = convert(&request, &config);
//!     if let Some(notice) = result.notice() {
//!         eprintln!("note: {notice}");
//!     }
//!     println!("{}", result.into_result()?.message);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2doc` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! edgequake-pdf2doc = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod request;
pub mod reveal;
pub mod strategy;
pub mod stream;
pub mod toolcheck;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_async, convert_file, Orchestrator};
pub use error::{AttemptError, Pdf2DocError, ToolError};
pub use output::{AttemptRecord, ConversionResult, Substitution};
pub use pipeline::doc::DocConverter;
pub use pipeline::tools::{SystemToolRunner, Tool, ToolInvocation, ToolOutput, ToolRunner};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use request::{ConversionRequest, TargetFormat};
pub use reveal::reveal;
pub use strategy::{AttemptOutcome, Deliverable, Strategy, StrategyContext};
pub use stream::{convert_stream, ConversionEvent, EventStream};
pub use toolcheck::{check_tools, ToolReport};
