use compliance_engine::ComplianceError;
use shared_pdf::PdfError;
use thiserror::Error;

/// Failures at the embedding / vector-store boundary
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("{collaborator} unavailable: {reason}")]
    CollaboratorUnavailable {
        collaborator: &'static str,
        reason: String,
    },

    #[error("{0} collection not available")]
    CollectionNotFound(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding backend returned {returned} vectors for {requested} inputs")]
    EmbeddingCountMismatch { requested: usize, returned: usize },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CorpusError {
    pub fn embedding_unavailable(reason: impl Into<String>) -> Self {
        CorpusError::CollaboratorUnavailable {
            collaborator: "embedding backend",
            reason: reason.into(),
        }
    }
}

/// Terminal error for one document run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] PdfError),

    #[error(transparent)]
    Compliance(#[from] ComplianceError),

    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

pub type Result<T> = std::result::Result<T, CorpusError>;
