//! Distance tiering of retrieved reference candidates

use shared_types::{Chunk, CorpusCheck, CorpusKind, MatchRecord, MatchTier, ReferenceCandidate};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::ComplianceError;
use crate::patterns::excerpt;
use crate::rules::discrepancy;

/// Records produced for one uploaded chunk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedMatches {
    pub records: Vec<MatchRecord>,
    pub skipped_candidates: usize,
    pub dropped_far_matches: usize,
}

#[derive(Debug, Clone)]
pub struct MatchClassifier {
    strong_threshold: f64,
    weak_threshold: f64,
    excerpt_chars: usize,
}

impl MatchClassifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            strong_threshold: config.strong_threshold,
            weak_threshold: config.weak_threshold,
            excerpt_chars: config.excerpt_chars,
        }
    }

    pub fn tier(&self, distance: f64) -> MatchTier {
        if distance < self.strong_threshold {
            MatchTier::Strong
        } else if distance < self.weak_threshold {
            MatchTier::Weak
        } else {
            MatchTier::Violation
        }
    }

    /// Pair one uploaded chunk with its ranked candidates.
    ///
    /// Candidates without text are skipped. Violation-tier candidates are kept
    /// only when a numeric discrepancy was found.
    pub fn classify(&self, chunk: &Chunk, candidates: &[ReferenceCandidate]) -> ClassifiedMatches {
        let mut result = ClassifiedMatches::default();

        for candidate in candidates {
            let reference_text = match candidate.text.as_deref() {
                Some(text) if !text.trim().is_empty() => text,
                _ => {
                    let err = ComplianceError::MalformedReferenceEntry {
                        candidate_id: candidate.id.clone(),
                    };
                    warn!(chunk = %chunk.id, "{}", err);
                    result.skipped_candidates += 1;
                    continue;
                }
            };

            let potential_issue = discrepancy::detect(&chunk.text, reference_text);
            let tier = self.tier(candidate.distance);

            if tier == MatchTier::Violation && potential_issue.is_none() {
                debug!(
                    chunk = %chunk.id,
                    candidate = %candidate.id,
                    distance = candidate.distance,
                    "Dropping far match without numeric conflict"
                );
                result.dropped_far_matches += 1;
                continue;
            }

            result.records.push(MatchRecord {
                uploaded_chunk_id: chunk.id.clone(),
                uploaded_section: chunk.section_number.clone(),
                uploaded_text_excerpt: excerpt(&chunk.text, self.excerpt_chars),
                matched_text_excerpt: excerpt(reference_text, self.excerpt_chars),
                source_document: candidate.source_document().to_string(),
                distance: round_to(candidate.distance, 3),
                similarity: round_to(1.0 - candidate.distance, 3),
                tier,
                potential_issue,
            });
        }

        result
    }

    /// Classify every uploaded chunk against its candidates from one corpus
    pub fn check_corpus(
        &self,
        corpus: CorpusKind,
        results: &[(Chunk, Vec<ReferenceCandidate>)],
    ) -> CorpusCheck {
        let mut check = CorpusCheck {
            corpus,
            total_chunks_checked: results.len(),
            matches: Vec::new(),
            weak_matches: Vec::new(),
            violations: Vec::new(),
            skipped_candidates: 0,
            dropped_far_matches: 0,
            compliance_score: 0.0,
        };

        for (chunk, candidates) in results {
            let classified = self.classify(chunk, candidates);
            check.skipped_candidates += classified.skipped_candidates;
            check.dropped_far_matches += classified.dropped_far_matches;

            for record in classified.records {
                match record.tier {
                    MatchTier::Strong => check.matches.push(record),
                    MatchTier::Weak => check.weak_matches.push(record),
                    MatchTier::Violation => check.violations.push(record),
                }
            }
        }

        check.compliance_score = compliance_score(
            check.matches.len(),
            check.weak_matches.len(),
            check.violations.len(),
        );
        check
    }
}

/// 100 * (strong + 0.5 * weak) / total, two decimals; 0.0 when nothing was kept
pub fn compliance_score(strong: usize, weak: usize, violations: usize) -> f64 {
    let total = strong + weak + violations;
    if total == 0 {
        return 0.0;
    }
    let score = (strong as f64 + weak as f64 * 0.5) / total as f64;
    round_to(score * 100.0, 2)
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn chunk(text: &str) -> Chunk {
        Chunk {
            id: "uploaded_chunk_0".to_string(),
            source_document: "contract.pdf".to_string(),
            index: 0,
            total_in_document: 1,
            text: text.to_string(),
            script: shared_types::Script::Latin,
            text_variant: None,
            word_count: text.split_whitespace().count(),
            section_number: "7.4.".to_string(),
            compliance_flags: BTreeSet::new(),
        }
    }

    fn candidate(id: &str, text: Option<&str>, distance: f64) -> ReferenceCandidate {
        let mut metadata = BTreeMap::new();
        metadata.insert("document_filename".to_string(), "reg.pdf".to_string());
        ReferenceCandidate {
            id: id.to_string(),
            text: text.map(str::to_string),
            metadata,
            distance,
        }
    }

    fn classifier() -> MatchClassifier {
        MatchClassifier::new(&EngineConfig::default())
    }

    #[test]
    fn test_tier_boundaries() {
        let c = classifier();
        assert_eq!(c.tier(0.0), MatchTier::Strong);
        assert_eq!(c.tier(0.2999), MatchTier::Strong);
        assert_eq!(c.tier(0.3), MatchTier::Weak);
        assert_eq!(c.tier(0.4999), MatchTier::Weak);
        assert_eq!(c.tier(0.5), MatchTier::Violation);
        assert_eq!(c.tier(1.7), MatchTier::Violation);
    }

    #[test]
    fn test_strong_and_weak_score_75() {
        let uploaded = chunk("Kredit muddati 90 kun");
        let results = vec![(
            uploaded,
            vec![
                candidate("a", Some("Kredit muddati 90 kun"), 0.2),
                candidate("b", Some("Kredit muddati haqida"), 0.4),
            ],
        )];
        let check = classifier().check_corpus(CorpusKind::Regulations, &results);

        assert_eq!(check.matches.len(), 1);
        assert_eq!(check.weak_matches.len(), 1);
        assert!(check.violations.is_empty());
        assert_eq!(check.compliance_score, 75.0);
    }

    #[test]
    fn test_far_match_without_issue_is_dropped() {
        let uploaded = chunk("Kredit muddati 90 kun");
        let results = vec![(
            uploaded,
            vec![
                candidate("a", Some("Kredit muddati 90 kun"), 0.2),
                candidate("far", Some("Boshqa mavzu"), 0.6),
            ],
        )];
        let check = classifier().check_corpus(CorpusKind::Regulations, &results);

        assert!(check.violations.is_empty());
        assert_eq!(check.dropped_far_matches, 1);
        assert_eq!(check.compliance_score, 100.0);
    }

    #[test]
    fn test_far_match_with_issue_is_violation() {
        let classified = classifier().classify(
            &chunk("Kredit muddati 90 kun"),
            &[candidate("far", Some("Kredit muddati 95 kun"), 0.61234)],
        );

        assert_eq!(classified.records.len(), 1);
        let record = &classified.records[0];
        assert_eq!(record.tier, MatchTier::Violation);
        assert_eq!(record.distance, 0.612);
        assert_eq!(record.similarity, 0.388);
        assert_eq!(record.uploaded_section, "7.4.");
        assert_eq!(record.source_document, "reg.pdf");
        assert_eq!(
            record.potential_issue.as_deref(),
            Some("DAYS: Uploaded says 90.0, reference says 95.0")
        );
    }

    #[test]
    fn test_candidates_without_text_are_skipped() {
        let classified = classifier().classify(
            &chunk("Kredit muddati 90 kun"),
            &[candidate("none", None, 0.1), candidate("blank", Some("   "), 0.1)],
        );
        assert!(classified.records.is_empty());
        assert_eq!(classified.skipped_candidates, 2);
    }

    #[test]
    fn test_no_candidates_scores_zero() {
        let check = classifier().check_corpus(CorpusKind::Policies, &[]);
        assert_eq!(check.compliance_score, 0.0);
        assert_eq!(check.total_chunks_checked, 0);
    }

    #[test]
    fn test_excerpts_are_truncated() {
        let long = "kredit ".repeat(60);
        let classified = classifier().classify(&chunk(&long), &[candidate("a", Some(&long), 0.1)]);
        let record = &classified.records[0];
        assert_eq!(record.uploaded_text_excerpt.chars().count(), 203);
        assert!(record.matched_text_excerpt.ends_with("..."));
    }

    #[test]
    fn test_score_rounding() {
        assert_eq!(compliance_score(1, 1, 1), 50.0);
        assert_eq!(compliance_score(1, 0, 2), 33.33);
        assert_eq!(compliance_score(0, 0, 0), 0.0);
    }
}
