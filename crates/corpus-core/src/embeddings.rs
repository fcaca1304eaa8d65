//! Embedding backends
//!
//! The pipeline only needs "ordered strings in, equally ordered vectors out".
//! [`OpenAiEmbedder`] talks to any OpenAI-compatible `/embeddings` endpoint,
//! [`RetryingEmbedder`] adds bounded fixed-delay retries around it, and
//! [`HashingEmbedder`] is a deterministic offline backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EmbeddingConfig;
use crate::error::{CorpusError, Result};

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch, preserving input order 1:1
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Length of every vector this backend produces
    fn dimension(&self) -> usize;
}

/// Embed `texts` in consecutive batches of at most `batch_size`
pub async fn embed_in_batches(
    embedder: &dyn Embedder,
    texts: &[String],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
    let mut vectors = Vec::with_capacity(texts.len());
    let batch_size = batch_size.max(1);
    let dimension = embedder.dimension();

    for (batch_index, batch) in texts.chunks(batch_size).enumerate() {
        let embedded = embedder.embed_batch(batch).await?;
        if embedded.len() != batch.len() {
            return Err(CorpusError::EmbeddingCountMismatch {
                requested: batch.len(),
                returned: embedded.len(),
            });
        }
        if let Some(v) = embedded.iter().find(|v| v.len() != dimension) {
            return Err(CorpusError::DimensionMismatch {
                expected: dimension,
                actual: v.len(),
            });
        }
        debug!(batch = batch_index, size = batch.len(), "Embedded batch");
        vectors.extend(embedded);
    }

    Ok(vectors)
}

// ============================================================================
// OpenAI-compatible HTTP backend
// ============================================================================

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

pub struct OpenAiEmbedder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CorpusError::embedding_unavailable(e.to_string()))?;

        info!(model = %config.model, api_base = %config.api_base, "Configured embedding backend");
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| CorpusError::embedding_unavailable("no API key configured"))?;

        let url = format!("{}/embeddings", self.config.api_base);
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| CorpusError::embedding_unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CorpusError::embedding_unavailable(format!(
                "{} returned {}: {}",
                self.config.api_base, status, body
            )));
        }

        let mut parsed = response
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| CorpusError::embedding_unavailable(format!("invalid response body: {}", e)))?;

        if parsed.data.len() != texts.len() {
            return Err(CorpusError::EmbeddingCountMismatch {
                requested: texts.len(),
                returned: parsed.data.len(),
            });
        }
        parsed.data.sort_by_key(|d| d.index);

        let vectors: Vec<Vec<f32>> = parsed.data.into_iter().map(|d| d.embedding).collect();
        if let Some(v) = vectors.iter().find(|v| v.len() != self.config.dimension) {
            return Err(CorpusError::DimensionMismatch {
                expected: self.config.dimension,
                actual: v.len(),
            });
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}

// ============================================================================
// Retries
// ============================================================================

/// Retries unavailable-backend failures a bounded number of times with a fixed delay
pub struct RetryingEmbedder<E> {
    inner: E,
    max_attempts: u32,
    delay: Duration,
}

impl<E: Embedder> RetryingEmbedder<E> {
    pub fn new(inner: E, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

#[async_trait]
impl<E: Embedder> Embedder for RetryingEmbedder<E> {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut attempt = 1;
        loop {
            match self.inner.embed_batch(texts).await {
                Err(err @ CorpusError::CollaboratorUnavailable { .. }) if attempt < self.max_attempts => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "Embedding request failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

// ============================================================================
// Offline backend
// ============================================================================

/// Feature-hashed bag of lowercase words, L2-normalized.
///
/// Needs no network. Identical texts map to identical vectors and texts sharing
/// words land close together, which is enough for dry runs and tests.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = (fnv1a(&token.to_lowercase()) % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn fnv1a(text: &str) -> u64 {
    text.bytes().fold(0xcbf29ce484222325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}
