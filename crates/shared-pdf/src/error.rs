use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("PDF is encrypted or password protected")]
    Encrypted,

    #[error("Failed to read PDF file: {0}")]
    Io(#[from] std::io::Error),
}
