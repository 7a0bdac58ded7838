//! Input validation and output-location resolution.
//!
//! The external tools give poor diagnostics for a wrong path ("Couldn't open
//! file") so the source is checked up-front: it must exist, be a regular
//! file, be readable and start with the `%PDF` magic bytes.

use crate::error::Pdf2DocError;
use crate::request::TargetFormat;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local PDF path, returning it unchanged on success.
pub fn validate_pdf(path: &Path) -> Result<PathBuf, Pdf2DocError> {
    let path = path.to_path_buf();

    let meta = match std::fs::metadata(&path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2DocError::PermissionDenied { path });
        }
        Err(_) => return Err(Pdf2DocError::FileNotFound { path }),
    };
    if !meta.is_file() {
        return Err(Pdf2DocError::NotAFile { path });
    }

    match std::fs::File::open(&path) {
        Ok(f) => {
            let mut magic = Vec::with_capacity(4);
            f.take(4)
                .read_to_end(&mut magic)
                .map_err(|e| Pdf2DocError::Internal(format!("reading {}: {e}", path.display())))?;
            if magic != b"%PDF" {
                return Err(Pdf2DocError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2DocError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2DocError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// Directory used when the caller does not configure one.
///
/// Order: the platform desktop directory, `~/Desktop`, `~/Escritorio`,
/// the home directory, then the current directory.
pub fn default_output_dir() -> PathBuf {
    if let Some(desktop) = dirs::desktop_dir().filter(|d| d.is_dir()) {
        return desktop;
    }
    if let Some(home) = dirs::home_dir() {
        for name in ["Desktop", "Escritorio"] {
            let candidate = home.join(name);
            if candidate.is_dir() {
                return candidate;
            }
        }
        return home;
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Final output path for `stem` in `dir`.
pub fn output_path(dir: &Path, stem: &str, format: TargetFormat) -> PathBuf {
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Path delivered instead of a `.doc` when DOC conversion is unavailable.
///
/// Only the extension changes; directory and stem stay as requested.
pub fn substituted_path(requested: &Path) -> PathBuf {
    requested.with_extension(TargetFormat::Docx.extension())
}
