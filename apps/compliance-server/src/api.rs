//! API handlers for the compliance server
//!
//! Provides REST endpoints for:
//! - Segmentation preview
//! - Full document checks (base64 PDF or raw text)
//! - Correction reports from an existing compliance report
//! - Collection listing

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine};
use compliance_engine::ChunkStatistics;
use corpus_core::CollectionInfo;
use serde::{Deserialize, Serialize};
use shared_types::{Chunk, ComplianceReport, CorpusKind, CorrectionReport};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "compliance-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Segment request body
#[derive(Deserialize)]
pub struct SegmentRequest {
    pub text: String,

    /// Selects the split policy and chunk id scheme
    #[serde(default = "default_corpus")]
    pub corpus: CorpusKind,

    #[serde(default = "default_document")]
    pub document: String,
}

fn default_corpus() -> CorpusKind {
    CorpusKind::Uploaded
}

fn default_document() -> String {
    "document.pdf".to_string()
}

#[derive(Serialize)]
pub struct SegmentResponse {
    pub success: bool,
    pub chunks: Vec<Chunk>,
    pub statistics: ChunkStatistics,
}

/// Handler: POST /api/segment
pub async fn handle_segment(
    State(state): State<AppState>,
    Json(req): Json<SegmentRequest>,
) -> Result<Json<SegmentResponse>, ServerError> {
    debug!(document = %req.document, corpus = %req.corpus, chars = req.text.len(), "Segment request");

    let engine = state.pipeline.engine();
    let chunks = engine.build_chunks(&req.document, &req.text, req.corpus)?;
    let statistics = engine.statistics(&chunks);

    Ok(Json(SegmentResponse {
        success: true,
        chunks,
        statistics,
    }))
}

/// Check request body. Exactly one of `pdf_base64` and `text` is used;
/// `pdf_base64` wins when both are present.
#[derive(Deserialize)]
pub struct CheckRequest {
    #[serde(default = "default_document")]
    pub document: String,
    pub pdf_base64: Option<String>,
    pub text: Option<String>,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub success: bool,
    pub chunks_analyzed: usize,
    pub report: ComplianceReport,
    pub corrections: CorrectionReport,
}

enum DocumentInput {
    Pdf(Vec<u8>),
    Text(String),
}

/// Handler: POST /api/check
pub async fn handle_check(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, ServerError> {
    let input = match (req.pdf_base64, req.text) {
        (Some(data), _) => DocumentInput::Pdf(STANDARD.decode(data.trim()).map_err(|e| {
            ServerError::InvalidRequest(format!("pdf_base64 is not valid base64: {}", e))
        })?),
        (None, Some(text)) => DocumentInput::Text(text),
        (None, None) => {
            return Err(ServerError::InvalidRequest(
                "Either 'pdf_base64' or 'text' is required".to_string(),
            ))
        }
    };

    let _guard = state.check_lock.lock().await;
    let outcome = match input {
        DocumentInput::Pdf(bytes) => {
            info!(document = %req.document, bytes = bytes.len(), "Checking PDF upload");
            state.pipeline.check_pdf_bytes(&req.document, &bytes).await?
        }
        DocumentInput::Text(text) => {
            info!(document = %req.document, chars = text.len(), "Checking text upload");
            state.pipeline.check_text(&req.document, &text).await?
        }
    };

    Ok(Json(CheckResponse {
        success: true,
        chunks_analyzed: outcome.chunks.len(),
        report: outcome.report,
        corrections: outcome.corrections,
    }))
}

/// Handler: POST /api/corrections
pub async fn handle_corrections(
    State(state): State<AppState>,
    Json(report): Json<ComplianceReport>,
) -> Json<CorrectionReport> {
    Json(state.pipeline.engine().correction_report(&report))
}

#[derive(Serialize)]
pub struct CollectionsResponse {
    pub success: bool,
    pub collections: Vec<CollectionInfo>,
}

/// Handler: GET /api/collections
pub async fn handle_list_collections(State(state): State<AppState>) -> Json<CollectionsResponse> {
    Json(CollectionsResponse {
        success: true,
        collections: state.pipeline.store().list_collections().await,
    })
}
