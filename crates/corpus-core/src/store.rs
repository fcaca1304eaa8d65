//! Vector storage and retrieval
//!
//! Collections are flat sets of (id, vector, text, metadata) entries searched
//! exhaustively. With a data directory configured, every collection is
//! snapshotted to `<data_dir>/<collection>.json` after each write and loaded
//! back on open.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::ReferenceCandidate;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{collection_path, DistanceMetric};
use crate::error::{CorpusError, Result};

/// One stored entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVector {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    pub count: usize,
    pub dimension: Option<usize>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace entries by id, creating the collection if needed
    async fn upsert(&self, collection: &str, entries: Vec<StoredVector>) -> Result<()>;

    /// Up to `top_k` nearest entries, closest first
    async fn query(&self, collection: &str, vector: &[f32], top_k: usize) -> Result<Vec<ReferenceCandidate>>;

    async fn has_collection(&self, collection: &str) -> bool;

    async fn count(&self, collection: &str) -> Result<usize>;

    /// Remove every entry, keeping the collection
    async fn clear(&self, collection: &str) -> Result<()>;

    async fn list_collections(&self) -> Vec<CollectionInfo>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Collection {
    dimension: Option<usize>,
    entries: BTreeMap<String, StoredVector>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    dimension: Option<usize>,
    entries: Vec<&'a StoredVector>,
}

#[derive(Deserialize)]
struct Snapshot {
    dimension: Option<usize>,
    entries: Vec<StoredVector>,
}

/// Exhaustive-search vector store held in memory
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
    distance: DistanceMetric,
    data_dir: Option<PathBuf>,
}

impl InMemoryVectorStore {
    /// A store that never touches disk
    pub fn new(distance: DistanceMetric) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            distance,
            data_dir: None,
        }
    }

    /// Open a persistent store, loading every `*.json` snapshot in `data_dir`
    pub async fn open(data_dir: impl AsRef<Path>, distance: DistanceMetric) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&data_dir).await?;

        let mut collections = HashMap::new();
        let mut dir = tokio::fs::read_dir(&data_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                continue;
            };

            let bytes = tokio::fs::read(&path).await?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
            let collection = Collection {
                dimension: snapshot.dimension,
                entries: snapshot
                    .entries
                    .into_iter()
                    .map(|e| (e.id.clone(), e))
                    .collect(),
            };
            info!(collection = %name, entries = collection.entries.len(), "Loaded collection snapshot");
            collections.insert(name, collection);
        }

        Ok(Self {
            collections: RwLock::new(collections),
            distance,
            data_dir: Some(data_dir),
        })
    }

    async fn persist(&self, name: &str, collection: &Collection) -> Result<()> {
        let Some(data_dir) = &self.data_dir else {
            return Ok(());
        };
        let snapshot = SnapshotRef {
            dimension: collection.dimension,
            entries: collection.entries.values().collect(),
        };
        let bytes = serde_json::to_vec(&snapshot)?;
        let path = collection_path(data_dir, name);
        tokio::fs::write(&path, bytes).await?;
        debug!(collection = name, path = %path.display(), "Persisted collection");
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, collection: &str, entries: Vec<StoredVector>) -> Result<()> {
        let mut collections = self.collections.write().await;

        // The whole batch is checked before the collection is created or touched
        let mut dimension = collections.get(collection).and_then(|c| c.dimension);
        for entry in &entries {
            let actual = entry.vector.len();
            match dimension {
                Some(expected) if expected != actual => {
                    return Err(CorpusError::DimensionMismatch { expected, actual });
                }
                None => dimension = Some(actual),
                _ => {}
            }
        }

        let target = collections.entry(collection.to_string()).or_default();
        target.dimension = dimension;
        let added = entries.len();
        for entry in entries {
            target.entries.insert(entry.id.clone(), entry);
        }
        debug!(collection, added, total = target.entries.len(), "Upserted entries");

        self.persist(collection, target).await
    }

    async fn query(&self, collection: &str, vector: &[f32], top_k: usize) -> Result<Vec<ReferenceCandidate>> {
        let collections = self.collections.read().await;
        let target = collections
            .get(collection)
            .ok_or_else(|| CorpusError::CollectionNotFound(collection.to_string()))?;

        if let Some(expected) = target.dimension {
            if expected != vector.len() {
                return Err(CorpusError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
        }

        let mut scored: Vec<(f64, &StoredVector)> = target
            .entries
            .values()
            .map(|entry| (distance(self.distance, vector, &entry.vector), entry))
            .collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(distance, entry)| ReferenceCandidate {
                id: entry.id.clone(),
                text: Some(entry.text.clone()),
                metadata: entry.metadata.clone(),
                distance,
            })
            .collect())
    }

    async fn has_collection(&self, collection: &str) -> bool {
        self.collections.read().await.contains_key(collection)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.entries.len())
            .ok_or_else(|| CorpusError::CollectionNotFound(collection.to_string()))
    }

    async fn clear(&self, collection: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();
        let removed = target.entries.len();
        target.entries.clear();
        target.dimension = None;
        if removed > 0 {
            info!(collection, removed, "Cleared collection");
        }
        self.persist(collection, target).await
    }

    async fn list_collections(&self) -> Vec<CollectionInfo> {
        let collections = self.collections.read().await;
        let mut infos: Vec<CollectionInfo> = collections
            .iter()
            .map(|(name, c)| CollectionInfo {
                name: name.clone(),
                count: c.entries.len(),
                dimension: c.dimension,
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

/// Distance between two vectors of equal length. 0 means identical.
pub fn distance(metric: DistanceMetric, a: &[f32], b: &[f32]) -> f64 {
    match metric {
        DistanceMetric::L2 => a
            .iter()
            .zip(b)
            .map(|(x, y)| {
                let d = (*x - *y) as f64;
                d * d
            })
            .sum(),
        DistanceMetric::Cosine => {
            let dot: f64 = a.iter().zip(b).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
            let norm_a = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
            let norm_b = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
            if norm_a == 0.0 || norm_b == 0.0 {
                warn!("Cosine distance against a zero vector");
                return 1.0;
            }
            (1.0 - dot / (norm_a * norm_b)).max(0.0)
        }
    }
}
