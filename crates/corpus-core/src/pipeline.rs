//! Request-scoped compliance pipeline
//!
//! extract → segment → embed → retrieve → classify → correct, one document at a
//! time. Per-corpus failures (a missing collection, a store error during
//! retrieval) end up in the report as that corpus's `error`; extraction, empty
//! documents and embedding failures end the run.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use compliance_engine::{ComplianceEngine, CorpusOutcome, EngineConfig};
use serde::{Deserialize, Serialize};
use shared_pdf::PdfTextExtractor;
use shared_types::{
    Chunk, ComplianceReport, CorpusCheck, CorpusKind, CorrectionReport, Language,
};
use tracing::{info, warn};

use crate::config::CorpusConfig;
use crate::embeddings::{embed_in_batches, Embedder, HashingEmbedder, OpenAiEmbedder, RetryingEmbedder};
use crate::error::{CorpusError, PipelineError};
use crate::manifest::DocumentManifest;
use crate::store::{InMemoryVectorStore, StoredVector, VectorStore};

/// Result of ingesting one reference document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestSummary {
    pub document: String,
    pub corpus: CorpusKind,
    pub language: Language,
    pub chunks: usize,
    pub total_words: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedDocument {
    pub document: String,
    pub error: String,
}

/// Result of ingesting the documents listed in a manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestIngest {
    pub ingested: Vec<IngestSummary>,
    pub failed: Vec<FailedDocument>,
    /// Rows skipped because their status is not `Active`
    pub inactive: usize,
}

/// Uploaded chunks and the vectors they were stored with, index-aligned
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub chunks: Vec<Chunk>,
    pub vectors: Vec<Vec<f32>>,
}

/// Everything one document check produces
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub report: ComplianceReport,
    pub corrections: CorrectionReport,
    pub chunks: Vec<Chunk>,
}

pub struct CompliancePipeline {
    engine: ComplianceEngine,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    config: CorpusConfig,
}

impl CompliancePipeline {
    pub fn new(
        engine: ComplianceEngine,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: CorpusConfig,
    ) -> Self {
        Self {
            engine,
            embedder,
            store,
            config,
        }
    }

    /// Persistent store under `config.data_dir` with the HTTP embedding backend
    pub async fn open(engine_config: EngineConfig, config: CorpusConfig) -> Result<Self, CorpusError> {
        let embedding = config.embedding.clone();
        let embedder = RetryingEmbedder::new(
            OpenAiEmbedder::new(embedding.clone())?,
            embedding.max_retries,
            embedding.retry_delay,
        );
        let store = InMemoryVectorStore::open(&config.data_dir, config.distance).await?;
        Ok(Self::new(
            ComplianceEngine::new(engine_config),
            Arc::new(embedder),
            Arc::new(store),
            config,
        ))
    }

    /// Persistent store with the deterministic hashing embedder, no network
    pub async fn open_offline(engine_config: EngineConfig, config: CorpusConfig) -> Result<Self, CorpusError> {
        let store = InMemoryVectorStore::open(&config.data_dir, config.distance).await?;
        Ok(Self::new(
            ComplianceEngine::new(engine_config),
            Arc::new(HashingEmbedder::default()),
            Arc::new(store),
            config,
        ))
    }

    pub fn engine(&self) -> &ComplianceEngine {
        &self.engine
    }

    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    /// Chunk a reference document and upsert it into its corpus collection
    pub async fn ingest_text(
        &self,
        document: &str,
        text: &str,
        corpus: CorpusKind,
        language: Language,
    ) -> Result<IngestSummary, PipelineError> {
        self.ingest_document(document, text, corpus, language, &BTreeMap::new())
            .await
    }

    /// Ingest one reference file: PDFs through the extractor, anything else as UTF-8 text
    pub async fn ingest_file(
        &self,
        path: impl AsRef<Path>,
        corpus: CorpusKind,
        language: Language,
    ) -> Result<IngestSummary, PipelineError> {
        let path = path.as_ref();
        let text = read_reference(path).await?;
        self.ingest_text(&file_name(path), &text, corpus, language).await
    }

    /// Ingest every active document of `manifest`, each in its own language.
    /// A document that fails is recorded and the rest still run.
    pub async fn ingest_manifest(&self, manifest: &DocumentManifest, corpus: CorpusKind) -> ManifestIngest {
        let mut outcome = ManifestIngest {
            inactive: manifest.entries().len() - manifest.active().count(),
            ..ManifestIngest::default()
        };

        for entry in manifest.active() {
            let path = manifest.document_path(entry);
            let result = match read_reference(&path).await {
                Ok(text) => {
                    self.ingest_document(&entry.filename, &text, corpus, entry.language, &entry.chunk_metadata())
                        .await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(summary) => outcome.ingested.push(summary),
                Err(e) => {
                    warn!(document = %entry.filename, path = %path.display(), error = %e, "Skipping manifest document");
                    outcome.failed.push(FailedDocument {
                        document: entry.filename.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            corpus = %corpus,
            ingested = outcome.ingested.len(),
            failed = outcome.failed.len(),
            inactive = outcome.inactive,
            "Manifest ingestion complete"
        );
        outcome
    }

    async fn ingest_document(
        &self,
        document: &str,
        text: &str,
        corpus: CorpusKind,
        language: Language,
        extra_metadata: &BTreeMap<String, String>,
    ) -> Result<IngestSummary, PipelineError> {
        let chunks = self.engine.build_chunks(document, text, corpus)?;
        let script = language.embedding_script();
        let texts: Vec<String> = chunks.iter().map(|c| c.text_in(script).to_string()).collect();
        let vectors = embed_in_batches(self.embedder.as_ref(), &texts, self.config.embedding.batch_size).await?;

        let entries: Vec<StoredVector> = chunks
            .iter()
            .zip(texts)
            .zip(vectors)
            .map(|((chunk, text), vector)| {
                let mut entry = StoredVector {
                    id: chunk.id.clone(),
                    vector,
                    text,
                    metadata: extra_metadata.clone(),
                };
                let metadata = &mut entry.metadata;
                metadata.insert("document_filename".into(), chunk.source_document.clone());
                metadata.insert("chunk_index".into(), chunk.index.to_string());
                metadata.insert("section_number".into(), chunk.section_number.clone());
                metadata.insert("word_count".into(), chunk.word_count.to_string());
                metadata.insert(
                    "compliance_flags".into(),
                    chunk.compliance_flags.iter().cloned().collect::<Vec<_>>().join(","),
                );
                metadata.insert("detected_script".into(), chunk.script.to_string());
                metadata.insert("language".into(), language.to_string());
                entry
            })
            .collect();

        self.store.upsert(corpus.collection_name(), entries).await?;

        let summary = IngestSummary {
            document: document.to_string(),
            corpus,
            language,
            chunks: chunks.len(),
            total_words: chunks.iter().map(|c| c.word_count).sum(),
        };
        info!(document, corpus = %corpus, chunks = summary.chunks, "Ingested reference document");
        Ok(summary)
    }

    /// Replace the uploaded-documents collection with the chunks of `document`
    pub async fn process_upload(&self, document: &str, text: &str) -> Result<UploadedDocument, PipelineError> {
        let chunks = self.engine.build_chunks(document, text, CorpusKind::Uploaded)?;
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embed_in_batches(self.embedder.as_ref(), &texts, self.config.embedding.batch_size).await?;

        let collection = CorpusKind::Uploaded.collection_name();
        self.store.clear(collection).await?;

        let entries: Vec<StoredVector> = chunks
            .iter()
            .zip(&vectors)
            .map(|(chunk, vector)| {
                let mut entry = StoredVector {
                    id: chunk.id.clone(),
                    vector: vector.clone(),
                    text: chunk.text.clone(),
                    metadata: Default::default(),
                };
                entry.metadata.insert("source_pdf".into(), document.to_string());
                entry.metadata.insert("chunk_index".into(), chunk.index.to_string());
                entry.metadata.insert("word_count".into(), chunk.word_count.to_string());
                entry.metadata.insert("chunk_position".into(), chunk.position());
                entry.metadata.insert("section_number".into(), chunk.section_number.clone());
                entry
            })
            .collect();
        self.store.upsert(collection, entries).await?;

        info!(document, chunks = chunks.len(), "Processed upload");
        Ok(UploadedDocument { chunks, vectors })
    }

    /// Retrieve `top_k` candidates per uploaded chunk from `corpus` and classify them
    pub async fn check_against(
        &self,
        corpus: CorpusKind,
        chunks: &[Chunk],
        vectors: &[Vec<f32>],
    ) -> Result<CorpusCheck, CorpusError> {
        let collection = corpus.collection_name();
        if !self.store.has_collection(collection).await || self.store.count(collection).await? == 0 {
            return Err(CorpusError::CollectionNotFound(collection.to_string()));
        }

        let mut results = Vec::with_capacity(chunks.len());
        for (chunk, vector) in chunks.iter().zip(vectors) {
            let candidates = self.store.query(collection, vector, self.config.top_k).await?;
            results.push((chunk.clone(), candidates));
        }

        let check = self.engine.check_corpus(corpus, &results);
        if !check.has_evaluated_matches() {
            warn!(
                corpus = %corpus,
                chunks = check.total_chunks_checked,
                skipped = check.skipped_candidates,
                "No evaluated matches, corpus scores 0"
            );
        }
        Ok(check)
    }

    /// Full check of already-extracted text
    pub async fn check_text(&self, document: &str, text: &str) -> Result<CheckOutcome, PipelineError> {
        let upload = self.process_upload(document, text).await?;

        let regulation = self.corpus_outcome(CorpusKind::Regulations, &upload).await;
        let policy = self.corpus_outcome(CorpusKind::Policies, &upload).await;

        let report = self.engine.compliance_report(document, &regulation, &policy);
        let corrections = self.engine.correction_report(&report);
        info!(
            document,
            status = %report.overall_status,
            score = report.overall_compliance_score,
            corrections = corrections.total_corrections_needed,
            "Document checked"
        );

        Ok(CheckOutcome {
            report,
            corrections,
            chunks: upload.chunks,
        })
    }

    pub async fn check_pdf_bytes(&self, document: &str, pdf_bytes: &[u8]) -> Result<CheckOutcome, PipelineError> {
        let extracted = PdfTextExtractor::extract(pdf_bytes)?;
        info!(document, pages = extracted.page_count(), chars = extracted.char_count(), "Extracted upload");
        self.check_text(document, &extracted.full_text()).await
    }

    pub async fn check_pdf(&self, path: impl AsRef<Path>) -> Result<CheckOutcome, PipelineError> {
        let path = path.as_ref();
        let extracted = PdfTextExtractor::extract_path(path)?;
        self.check_text(&file_name(path), &extracted.full_text()).await
    }

    async fn corpus_outcome(&self, corpus: CorpusKind, upload: &UploadedDocument) -> CorpusOutcome {
        self.check_against(corpus, &upload.chunks, &upload.vectors)
            .await
            .map_err(|e| {
                warn!(corpus = %corpus, error = %e, "Corpus check unavailable");
                e.to_string()
            })
    }
}

async fn read_reference(path: &Path) -> Result<String, PipelineError> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if is_pdf {
        return Ok(PdfTextExtractor::extract_path(path)?.full_text());
    }
    Ok(tokio::fs::read_to_string(path).await.map_err(CorpusError::from)?)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
