//! Corpus Core - collaborators and orchestration around the compliance engine
//!
//! This crate provides:
//! - The `Embedder` trait with an OpenAI-compatible HTTP backend, bounded retries
//!   and an offline hashing backend
//! - The `VectorStore` trait with an in-memory store persisted as JSON snapshots
//! - Explicit configuration (`CorpusConfig`)
//! - Reference document manifests (`DocumentManifest`) read from CSV
//! - `CompliancePipeline`: extract → segment → embed → retrieve → classify → correct

pub mod config;
pub mod embeddings;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod store;

// Re-export commonly used types
pub use config::{CorpusConfig, DistanceMetric, EmbeddingConfig};
pub use embeddings::{embed_in_batches, Embedder, HashingEmbedder, OpenAiEmbedder, RetryingEmbedder};
pub use error::{CorpusError, PipelineError, Result};
pub use manifest::{DocumentManifest, ManifestEntry};
pub use pipeline::{
    CheckOutcome, CompliancePipeline, FailedDocument, IngestSummary, ManifestIngest, UploadedDocument,
};
pub use store::{CollectionInfo, InMemoryVectorStore, StoredVector, VectorStore};
