//! Shared PDF handling utilities
//!
//! Turns uploaded or reference PDFs into plain text, one string per page,
//! ready for segmentation.

pub mod error;
pub mod extract;

pub use error::PdfError;
pub use extract::{ExtractedText, PdfTextExtractor};
