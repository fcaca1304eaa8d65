//! Compliance engine: segmentation, hotspot tagging, match classification,
//! numeric discrepancy detection and correction generation.
//!
//! Everything here is synchronous and free of I/O. Embedding and retrieval are
//! done by the caller, which hands ranked reference candidates back in.

pub mod chunker;
pub mod config;
pub mod error;
pub mod extractors;
pub mod hotspots;
pub mod patterns;
pub mod report;
pub mod rules;
pub mod segmenter;
pub mod statistics;
pub mod transliterate;

pub use chunker::ChunkBuilder;
pub use config::EngineConfig;
pub use error::{ComplianceError, Result};
pub use hotspots::{HotspotCategory, HotspotTagger};
pub use report::{build_compliance_report, CorpusOutcome};
pub use rules::{ClassifiedMatches, CorrectionGenerator, MatchClassifier};
pub use segmenter::{Segment, Segmenter, SplitPolicy};
pub use statistics::ChunkStatistics;

use shared_types::{
    Chunk, ComplianceReport, CorpusCheck, CorpusKind, CorrectionReport, ReferenceCandidate,
};
use tracing::info;

/// ComplianceEngine entry point
pub struct ComplianceEngine {
    config: EngineConfig,
    tagger: HotspotTagger,
    classifier: MatchClassifier,
    corrections: CorrectionGenerator,
}

impl ComplianceEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            tagger: HotspotTagger::new(config.hotspots.clone()),
            classifier: MatchClassifier::new(&config),
            corrections: CorrectionGenerator::new(config.outlier_guard),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reject text too short to be a real document
    pub fn validate_text(&self, text: &str) -> Result<()> {
        let chars = text.trim().chars().count();
        if chars < self.config.min_text_chars {
            return Err(ComplianceError::EmptyDocument {
                chars,
                min_chars: self.config.min_text_chars,
            });
        }
        Ok(())
    }

    /// Chunk texts of `text` under the split policy of `corpus`, page numbers removed
    pub fn segment(&self, text: &str, corpus: CorpusKind) -> Vec<String> {
        Segmenter::new(self.config.split_policy(corpus)).segment(&segmenter::strip_page_numbers(text))
    }

    /// Validate, segment and annotate one document
    pub fn build_chunks(&self, document: &str, text: &str, corpus: CorpusKind) -> Result<Vec<Chunk>> {
        self.validate_text(text)?;
        let builder = ChunkBuilder::new(corpus, self.config.split_policy(corpus), &self.tagger);
        let chunks = builder.build(document, text);
        info!(document, corpus = %corpus, chunks = chunks.len(), "Built chunks");
        Ok(chunks)
    }

    pub fn classify(&self, chunk: &Chunk, candidates: &[ReferenceCandidate]) -> ClassifiedMatches {
        self.classifier.classify(chunk, candidates)
    }

    pub fn check_corpus(
        &self,
        corpus: CorpusKind,
        results: &[(Chunk, Vec<ReferenceCandidate>)],
    ) -> CorpusCheck {
        let check = self.classifier.check_corpus(corpus, results);
        info!(
            corpus = %corpus,
            strong = check.matches.len(),
            weak = check.weak_matches.len(),
            violations = check.violations.len(),
            skipped = check.skipped_candidates,
            score = check.compliance_score,
            "Checked corpus"
        );
        check
    }

    pub fn compliance_report(
        &self,
        document: &str,
        regulation: &CorpusOutcome,
        policy: &CorpusOutcome,
    ) -> ComplianceReport {
        build_compliance_report(document, regulation, policy)
    }

    pub fn correction_report(&self, report: &ComplianceReport) -> CorrectionReport {
        self.corrections.build_report(report)
    }

    pub fn statistics(&self, chunks: &[Chunk]) -> ChunkStatistics {
        ChunkStatistics::from_chunks(chunks, self.tagger.category_names())
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
