//! PDF text extraction through the `pdf-extract` crate

use super::{read_bytes, TextExtractor};
use crate::{Result, ScoringError};
use std::path::Path;

/// Extracts the text layer of a PDF. Page breaks become newlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = read_bytes(path)?;
        let text = pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            ScoringError::UnreadableFile {
                path: path.to_path_buf(),
                reason: format!("failed to extract PDF text: {}", e),
            }
        })?;
        Ok(text.replace('\u{000C}', "\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_extract_pdf_garbage_is_unreadable() {
        let mut file = NamedTempFile::with_suffix(".pdf").unwrap();
        file.write_all(b"not a pdf").unwrap();
        let err = PdfExtractor.extract(file.path()).unwrap_err();
        assert!(matches!(err, ScoringError::UnreadableFile { .. }));
    }
}
