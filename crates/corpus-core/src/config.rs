//! Configuration for the corpus collaborators
//!
//! Built explicitly by the binaries (optionally from environment variables via
//! [`CorpusConfig::from_env`]) and passed down; library code never reads the
//! environment itself.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, Result};

/// Distance measure used by the vector store. Smaller is more similar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Squared Euclidean distance
    #[default]
    L2,
    /// 1 - cosine similarity
    Cosine,
}

impl FromStr for DistanceMetric {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "l2" | "euclidean" => Ok(DistanceMetric::L2),
            "cosine" => Ok(DistanceMetric::Cosine),
            _ => Err(CorpusError::Config(format!("Unknown distance metric: {}", s))),
        }
    }
}

/// OpenAI-compatible embedding endpoint settings
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
    /// Maximum inputs per request
    pub batch_size: usize,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            batch_size: 100,
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
        }
    }
}

impl EmbeddingConfig {
    pub fn with_model(mut self, model: &str, dimension: usize) -> Self {
        self.model = model.to_string();
        self.dimension = dimension;
        self
    }
}

/// Corpus configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusConfig {
    /// Directory holding one JSON snapshot per collection
    pub data_dir: PathBuf,
    /// Candidates retrieved per uploaded chunk
    pub top_k: usize,
    pub distance: DistanceMetric,
    pub embedding: EmbeddingConfig,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self::local("./compliance-data")
    }
}

impl CorpusConfig {
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            top_k: 3,
            distance: DistanceMetric::default(),
            embedding: EmbeddingConfig::default(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_embedding(mut self, embedding: EmbeddingConfig) -> Self {
        self.embedding = embedding;
        self
    }

    /// Snapshot file of a collection
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        collection_path(&self.data_dir, collection)
    }

    /// Load configuration from environment variables
    ///
    /// Expected variables:
    /// - COMPLIANCE_DATA_DIR: snapshot directory (default: "./compliance-data")
    /// - COMPLIANCE_TOP_K: candidates per chunk (default: 3)
    /// - COMPLIANCE_DISTANCE: "l2" or "cosine" (default: "l2")
    /// - OPENAI_API_KEY: embedding API key
    /// - EMBEDDING_API_BASE: embedding endpoint base URL
    /// - EMBEDDING_MODEL: embedding model name
    /// - EMBEDDING_DIMENSION: vector length produced by the model
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("COMPLIANCE_DATA_DIR")
            .unwrap_or_else(|_| "./compliance-data".to_string());

        let top_k = match std::env::var("COMPLIANCE_TOP_K") {
            Ok(value) => parse_number(&value, "COMPLIANCE_TOP_K")?,
            Err(_) => 3,
        };

        let distance = match std::env::var("COMPLIANCE_DISTANCE") {
            Ok(value) => value.parse()?,
            Err(_) => DistanceMetric::default(),
        };

        let mut embedding = EmbeddingConfig {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            ..EmbeddingConfig::default()
        };
        if let Ok(api_base) = std::env::var("EMBEDDING_API_BASE") {
            embedding.api_base = api_base.trim_end_matches('/').to_string();
        }
        if let Ok(model) = std::env::var("EMBEDDING_MODEL") {
            embedding.model = model;
        }
        if let Ok(dimension) = std::env::var("EMBEDDING_DIMENSION") {
            embedding.dimension = parse_number(&dimension, "EMBEDDING_DIMENSION")?;
        }

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            top_k,
            distance,
            embedding,
        })
    }
}

pub(crate) fn collection_path(data_dir: &Path, collection: &str) -> PathBuf {
    data_dir.join(format!("{}.json", collection))
}

fn parse_number(value: &str, name: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| CorpusError::Config(format!("{} must be a positive integer, got '{}'", name, value)))
}
