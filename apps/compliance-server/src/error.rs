//! Error types for the compliance server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use compliance_engine::ComplianceError;
use corpus_core::{CorpusError, PipelineError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Document text too short: {0}")]
    EmptyDocument(String),

    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ServerError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            ServerError::EmptyDocument(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_DOCUMENT", msg)
            }
            ServerError::ExtractionFailed(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED", msg)
            }
            ServerError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "COLLABORATOR_UNAVAILABLE", msg)
            }
            ServerError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ComplianceError> for ServerError {
    fn from(err: ComplianceError) -> Self {
        match err {
            ComplianceError::EmptyDocument { .. } => ServerError::EmptyDocument(err.to_string()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<CorpusError> for ServerError {
    fn from(err: CorpusError) -> Self {
        match err {
            CorpusError::CollaboratorUnavailable { .. } | CorpusError::CollectionNotFound(_) => {
                ServerError::Unavailable(err.to_string())
            }
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Extraction(e) => ServerError::ExtractionFailed(e.to_string()),
            PipelineError::Compliance(e) => e.into(),
            PipelineError::Corpus(e) => e.into(),
        }
    }
}
