//! The immutable conversion request and the target-format enum.

use crate::error::Pdf2DocError;
use crate::pipeline::input;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Word-processor format the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    /// OpenDocument Text.
    Odt,
    /// Legacy Word 97-2003. Pandoc cannot write it; produced from DOCX by a
    /// DOC converter.
    Doc,
    /// Office Open XML. (default)
    #[default]
    Docx,
}

impl TargetFormat {
    /// All formats, in the order they are usually presented.
    pub const ALL: [TargetFormat; 3] = [TargetFormat::Odt, TargetFormat::Doc, TargetFormat::Docx];

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Odt => "odt",
            TargetFormat::Doc => "doc",
            TargetFormat::Docx => "docx",
        }
    }

    /// Pandoc writer name, or `None` when pandoc cannot produce the format.
    pub fn pandoc_writer(self) -> Option<&'static str> {
        match self {
            TargetFormat::Odt => Some("odt"),
            TargetFormat::Docx => Some("docx"),
            TargetFormat::Doc => None,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = Pdf2DocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match normalised.as_str() {
            "odt" => Ok(TargetFormat::Odt),
            "doc" => Ok(TargetFormat::Doc),
            "docx" => Ok(TargetFormat::Docx),
            _ => Err(Pdf2DocError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// A validated request to convert one PDF to one target format.
///
/// Only constructible through [`ConversionRequest::new`], so a request in
/// hand always points at a readable file that starts with `%PDF`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    source: PathBuf,
    format: TargetFormat,
}

impl ConversionRequest {
    /// Validate `source` and accept the request.
    ///
    /// # Errors
    /// `FileNotFound`, `PermissionDenied`, `NotAFile` or `NotAPdf`.
    pub fn new(source: impl AsRef<Path>, format: TargetFormat) -> Result<Self, Pdf2DocError> {
        let source = input::validate_pdf(source.as_ref())?;
        Ok(Self { source, format })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn format(&self) -> TargetFormat {
        self.format
    }

    /// Source file name without its extension, used to name every artifact.
    pub fn stem(&self) -> String {
        self.source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "document".to_string())
    }
}
