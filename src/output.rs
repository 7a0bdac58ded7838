//! Result types returned by the orchestrator.

use crate::error::Pdf2DocError;
use crate::request::TargetFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A lesser format delivered because the requested one could not be made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub requested: TargetFormat,
    pub delivered: TargetFormat,
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} conversion is not available; a {} file was generated instead",
            self.requested.extension().to_uppercase(),
            self.delivered.extension().to_uppercase()
        )
    }
}

/// What one strategy did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Strategy name, e.g. `"rich-reconstruction"`.
    pub strategy: String,
    pub succeeded: bool,
    /// Command lines run, in order.
    pub invocations: Vec<String>,
    /// File names of the intermediate artifacts written to the workspace.
    pub artifacts: Vec<String>,
    /// Why the attempt failed. `None` on success.
    pub diagnostic: Option<String>,
    pub duration_ms: u64,
}

/// Terminal outcome of one conversion request.
///
/// Exactly one is produced per [`crate::ConversionRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub succeeded: bool,
    /// Where the document was written. Present iff `succeeded`.
    ///
    /// With a [`Substitution`] this is the `.docx` path, not the `.doc`
    /// that was asked for.
    pub output_path: Option<PathBuf>,
    /// Format actually delivered.
    pub format: Option<TargetFormat>,
    /// Name of the strategy that produced the output.
    pub strategy: Option<String>,
    pub substitution: Option<Substitution>,
    /// Human-readable summary; the last diagnostic on failure.
    pub message: String,
    pub attempts: Vec<AttemptRecord>,
    pub duration_ms: u64,
}

impl ConversionResult {
    /// A failed result carrying `message` as its diagnostic.
    pub fn failed(message: impl Into<String>, attempts: Vec<AttemptRecord>, duration_ms: u64) -> Self {
        Self {
            succeeded: false,
            output_path: None,
            format: None,
            strategy: None,
            substitution: None,
            message: message.into(),
            attempts,
            duration_ms,
        }
    }

    /// Turn a failed result into [`Pdf2DocError::AllStrategiesFailed`].
    ///
    /// A substitution is still a success.
    pub fn into_result(self) -> Result<ConversionResult, Pdf2DocError> {
        if self.succeeded {
            Ok(self)
        } else {
            Err(Pdf2DocError::AllStrategiesFailed {
                attempts: self.attempts.len(),
                last_error: self.message,
            })
        }
    }

    /// The substitution notice, if any.
    pub fn notice(&self) -> Option<String> {
        self.substitution.map(|s| s.to_string())
    }
}
