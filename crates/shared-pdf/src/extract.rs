//! PDF text extraction
//!
//! Pages are read with lopdf first. When lopdf cannot decode any text (unusual
//! font encodings, broken content streams) the whole document is handed to
//! pdf-extract and split on form feeds instead.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

use crate::error::PdfError;

/// Page-ordered raw text of one PDF
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText {
    pub pages: Vec<String>,
}

impl ExtractedText {
    /// All pages joined with newlines, the input expected by segmentation
    pub fn full_text(&self) -> String {
        self.pages.join("\n")
    }

    /// Character count of the trimmed full text
    pub fn char_count(&self) -> usize {
        self.full_text().trim().chars().count()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Main PDF extraction interface
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Extract page texts from a file on disk
    pub fn extract_path(path: impl AsRef<Path>) -> Result<ExtractedText, PdfError> {
        let bytes = std::fs::read(path.as_ref())?;
        debug!(path = %path.as_ref().display(), bytes = bytes.len(), "Read PDF");
        Self::extract(&bytes)
    }

    /// Extract page texts from PDF bytes
    ///
    /// # Errors
    /// - `PdfError::Encrypted` - the document needs a password
    /// - `PdfError::ExtractionFailed` - neither backend could parse the bytes
    pub fn extract(pdf_bytes: &[u8]) -> Result<ExtractedText, PdfError> {
        match Document::load_mem(pdf_bytes) {
            Ok(doc) => {
                if doc.is_encrypted() {
                    return Err(PdfError::Encrypted);
                }
                let pages = Self::extract_with_lopdf(&doc);
                if pages.iter().any(|p| !p.trim().is_empty()) {
                    return Ok(ExtractedText { pages });
                }
                debug!("lopdf returned no text, falling back to pdf-extract");
            }
            Err(e) => {
                debug!(error = %e, "lopdf could not load document, falling back to pdf-extract");
            }
        }

        Self::extract_with_pdf_extract(pdf_bytes)
    }

    fn extract_with_lopdf(doc: &Document) -> Vec<String> {
        let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut pages = Vec::with_capacity(page_numbers.len());

        for page_number in page_numbers {
            match doc.extract_text(&[page_number]) {
                Ok(text) => pages.push(text),
                Err(e) => {
                    warn!(page = page_number, error = %e, "Failed to extract page text");
                    pages.push(String::new());
                }
            }
        }

        pages
    }

    fn extract_with_pdf_extract(pdf_bytes: &[u8]) -> Result<ExtractedText, PdfError> {
        let raw_text = pdf_extract::extract_text_from_mem(pdf_bytes).map_err(|e| {
            let message = e.to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("encrypted") || lowered.contains("password") {
                PdfError::Encrypted
            } else {
                PdfError::ExtractionFailed(message)
            }
        })?;

        Ok(ExtractedText {
            pages: split_form_feeds(&raw_text),
        })
    }
}

/// Split pdf-extract output into pages on form feed characters
fn split_form_feeds(text: &str) -> Vec<String> {
    text.split('\x0C').map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_garbage_bytes_fail_extraction() {
        let result = PdfTextExtractor::extract(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::ExtractionFailed(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = PdfTextExtractor::extract_path(dir.path().join("missing.pdf"));
        assert!(matches!(result, Err(PdfError::Io(_))));
    }

    #[test]
    fn test_split_form_feeds_keeps_page_order() {
        let pages = split_form_feeds("first page\x0Csecond page\x0C");
        assert_eq!(pages, vec!["first page", "second page", ""]);
    }

    #[test]
    fn test_full_text_joins_pages() {
        let extracted = ExtractedText {
            pages: vec!["1. Umumiy qoidalar".to_string(), "Kredit 90 kun".to_string()],
        };
        assert_eq!(extracted.full_text(), "1. Umumiy qoidalar\nKredit 90 kun");
        assert_eq!(extracted.page_count(), 2);
        assert_eq!(extracted.char_count(), 32);
    }
}
