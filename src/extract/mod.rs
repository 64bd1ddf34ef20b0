//! Text extraction from study files

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::PdfExtractor;

use crate::{Result, ScoringError};
use std::fs;
use std::path::Path;

/// File extensions read as plain text
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "text", "md"];

/// Produces the raw text of a study file
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether a file has an extension this build can extract
pub fn is_supported_document(path: &Path) -> bool {
    match extension(path).as_deref() {
        Some(ext) if TEXT_EXTENSIONS.contains(&ext) => true,
        Some("pdf") => cfg!(feature = "pdf"),
        _ => false,
    }
}

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| ScoringError::UnreadableFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Reads UTF-8 text files. Invalid sequences are replaced rather than rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = read_bytes(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Dispatches on file extension
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoExtractor {
    plain: PlainTextExtractor,
}

impl AutoExtractor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextExtractor for AutoExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        match extension(path).as_deref() {
            Some(ext) if TEXT_EXTENSIONS.contains(&ext) => self.plain.extract(path),
            #[cfg(feature = "pdf")]
            Some("pdf") => PdfExtractor.extract(path),
            #[cfg(not(feature = "pdf"))]
            Some("pdf") => Err(ScoringError::UnsupportedFormat {
                path: path.to_path_buf(),
                hint: "rebuild with `--features pdf` or convert the PDF to text".to_string(),
            }),
            _ => Err(ScoringError::UnsupportedFormat {
                path: path.to_path_buf(),
                hint: format!("expected one of .{} or .pdf", TEXT_EXTENSIONS.join(", .")),
            }),
        }
    }
}
