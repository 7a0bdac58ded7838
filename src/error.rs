//! Error types for the edgequake-pdf2doc library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`Pdf2DocError`] — **Fatal**: the request cannot even be accepted (bad
//!   input file, invalid configuration) or the caller asked for a failed
//!   conversion to be turned into an `Err` via
//!   [`crate::output::ConversionResult::into_result`].
//!
//! * [`AttemptError`] — **Non-fatal**: one strategy failed (a tool exited
//!   non-zero, an artifact came out empty). The orchestrator records it in
//!   [`crate::output::AttemptRecord`] and moves on to the next strategy.
//!
//! * [`ToolError`] — a single external-tool invocation failed. It is always
//!   folded into an [`AttemptError`] at the point of invocation.
//!
//! Nothing below [`Pdf2DocError`] ever escapes [`crate::convert::convert`]:
//! the only thing a caller sees from a run is the terminal
//! [`crate::output::ConversionResult`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf2doc library.
#[derive(Debug, Error)]
pub enum Pdf2DocError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The path exists but is a directory or other non-regular file.
    #[error("'{path}' is not a regular file")]
    NotAFile { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    /// The requested output format is not one of odt, doc, docx.
    #[error("Unsupported output format '{format}' (expected odt, doc or docx)")]
    UnsupportedFormat { format: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Outcome errors ────────────────────────────────────────────────────
    /// Every strategy was tried and none produced a non-empty document.
    ///
    /// Returned by [`crate::output::ConversionResult::into_result`] when the
    /// caller wants to treat a failed conversion as an error.
    #[error("All {attempts} conversion strategies failed.\nLast error: {last_error}")]
    AllStrategiesFailed { attempts: usize, last_error: String },

    /// None of the platform openers could show the directory.
    #[error("Could not open '{path}' in the file browser: {detail}")]
    RevealFailed { path: PathBuf, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of a single external program invocation.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ToolError {
    /// The executable is not installed or not on `PATH`.
    #[error("'{program}' is not installed or not on PATH")]
    Missing { program: String },

    /// The program ran and exited unsuccessfully.
    #[error("'{program}' failed ({}): {stderr}", exit_label(*code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The program could not be started for a reason other than absence.
    #[error("could not start '{program}': {detail}")]
    Spawn { program: String, detail: String },
}

impl ToolError {
    /// The program this error refers to.
    pub fn program(&self) -> &str {
        match self {
            ToolError::Missing { program }
            | ToolError::Failed { program, .. }
            | ToolError::Spawn { program, .. } => program,
        }
    }
}

fn exit_label(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit status {c}"),
        None => "terminated by signal".to_string(),
    }
}

/// A non-fatal error for a single strategy attempt.
///
/// Stored (as text) in [`crate::output::AttemptRecord::diagnostic`]. The
/// orchestrator continues with the next strategy unless this was the last.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum AttemptError {
    /// An external tool was missing or failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// A step completed but its artifact is missing or zero bytes.
    #[error("'{}' was not produced or is empty", artifact.display())]
    EmptyOutput { artifact: PathBuf },

    /// The PDF yielded neither text nor vector pages.
    #[error("no extractable content: {detail}")]
    NoContent { detail: String },

    /// Reading or writing an intermediate file failed.
    #[error("{context}: {detail}")]
    Io { context: String, detail: String },

    /// The strategy panicked; the panic was contained.
    #[error("strategy panicked: {detail}")]
    Panicked { detail: String },
}

impl AttemptError {
    /// Wrap an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>, err: std::io::Error) -> Self {
        AttemptError::Io {
            context: context.into(),
            detail: err.to_string(),
        }
    }
}
