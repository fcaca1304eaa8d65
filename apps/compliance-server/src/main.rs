//! Compliance Server
//!
//! HTTP front end for the document-compliance pipeline. Provides REST API
//! endpoints for:
//!
//! - Segmentation preview with chunking statistics
//! - Full checks of an uploaded contract against the regulation and policy corpora
//! - Correction reports derived from a compliance report
//! - Collection listing
//!
//! Document checks run one at a time: every check replaces the shared
//! `uploaded_documents` collection.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use compliance_engine::EngineConfig;
use corpus_core::{CompliancePipeline, CorpusConfig, DistanceMetric};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod state;
#[cfg(test)]
mod tests;

use api::{
    handle_check, handle_corrections, handle_health, handle_list_collections, handle_segment,
};
use state::AppState;

/// Command-line arguments for the compliance server
#[derive(Parser, Debug)]
#[command(name = "compliance-server")]
#[command(about = "HTTP API for document compliance checks")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Collection snapshot directory (overrides COMPLIANCE_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Candidates retrieved per chunk (overrides COMPLIANCE_TOP_K)
    #[arg(long)]
    top_k: Option<usize>,

    /// Distance metric: l2 or cosine (overrides COMPLIANCE_DISTANCE)
    #[arg(long)]
    distance: Option<DistanceMetric>,

    /// Use the offline hashing embedder instead of the HTTP backend
    #[arg(long)]
    offline: bool,

    /// Maximum request body size in megabytes
    #[arg(long, default_value = "25")]
    max_body_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/segment", post(handle_segment))
        .route("/api/check", post(handle_check))
        .route("/api/corrections", post(handle_corrections))
        .route("/api/collections", get(handle_list_collections))
        // Apply middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Environment first, flags on top
    let mut config = CorpusConfig::from_env()?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    if let Some(distance) = args.distance {
        config.distance = distance;
    }
    info!(data_dir = %config.data_dir.display(), top_k = config.top_k, "Loading collections");

    let pipeline = if args.offline {
        CompliancePipeline::open_offline(EngineConfig::default(), config).await?
    } else {
        CompliancePipeline::open(EngineConfig::default(), config).await?
    };

    for collection in pipeline.store().list_collections().await {
        info!(collection = %collection.name, entries = collection.count, "Collection ready");
    }

    let app = build_router(AppState::new(pipeline), args.max_body_mb * 1024 * 1024);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
