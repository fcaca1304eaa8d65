//! Nested report structures handed to the report consumer (UI / export)

use chrono::{DateTime, Utc};

use crate::types::{CorpusKind, CorrectionItem, MatchRecord};

/// Overall document status derived from the mean compliance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplianceStatus {
    Pass,
    Warning,
    Fail,
}

impl ComplianceStatus {
    /// >= 80 is PASS, >= 60 is WARNING, anything else FAIL
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ComplianceStatus::Pass
        } else if score >= 60.0 {
            ComplianceStatus::Warning
        } else {
            ComplianceStatus::Fail
        }
    }
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceStatus::Pass => write!(f, "PASS"),
            ComplianceStatus::Warning => write!(f, "WARNING"),
            ComplianceStatus::Fail => write!(f, "FAIL"),
        }
    }
}

/// Result of checking every uploaded chunk against one reference corpus
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CorpusCheck {
    pub corpus: CorpusKind,
    pub total_chunks_checked: usize,
    pub matches: Vec<MatchRecord>,
    pub weak_matches: Vec<MatchRecord>,
    pub violations: Vec<MatchRecord>,
    /// Candidates skipped because their reference text was missing
    pub skipped_candidates: usize,
    /// Far matches with no numeric conflict, counted nowhere else
    pub dropped_far_matches: usize,
    pub compliance_score: f64,
}

impl CorpusCheck {
    /// True when at least one candidate landed in a tier
    pub fn has_evaluated_matches(&self) -> bool {
        !(self.matches.is_empty() && self.weak_matches.is_empty() && self.violations.is_empty())
    }
}

/// Per-corpus section of the compliance report
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CorpusCompliance {
    pub score: f64,
    pub total_violations: usize,
    pub violations: Vec<MatchRecord>,
    /// Set when the sub-check could not run, e.g. "regulations collection not available"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CorpusCompliance {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            total_violations: 0,
            violations: Vec::new(),
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DetailedFindings {
    pub regulation_matches: usize,
    pub regulation_weak_matches: usize,
    pub policy_matches: usize,
    pub policy_weak_matches: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ComplianceReport {
    pub report_date: DateTime<Utc>,
    pub document: String,
    pub overall_status: ComplianceStatus,
    pub overall_compliance_score: f64,
    pub regulation_compliance: CorpusCompliance,
    pub policy_compliance: CorpusCompliance,
    pub detailed_findings: DetailedFindings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CorrectionSummary {
    pub critical_count: usize,
    pub high_count: usize,
    pub medium_count: usize,
}

/// Corrections grouped by severity
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CorrectionReport {
    pub report_date: DateTime<Utc>,
    pub overall_status: ComplianceStatus,
    pub overall_compliance_score: f64,
    pub total_corrections_needed: usize,
    pub critical_corrections: Vec<CorrectionItem>,
    pub high_priority_corrections: Vec<CorrectionItem>,
    pub medium_priority_corrections: Vec<CorrectionItem>,
    pub summary: CorrectionSummary,
    /// Issue segments that did not match the discrepancy template
    pub skipped_segments: usize,
    /// Segments whose values differed by more than the outlier guard
    pub discarded_outliers: usize,
}

impl CorrectionReport {
    /// All corrections, most severe first
    pub fn all_corrections(&self) -> impl Iterator<Item = &CorrectionItem> {
        self.critical_corrections
            .iter()
            .chain(self.high_priority_corrections.iter())
            .chain(self.medium_priority_corrections.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchTier;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_thresholds() {
        assert_eq!(ComplianceStatus::from_score(80.0), ComplianceStatus::Pass);
        assert_eq!(ComplianceStatus::from_score(79.99), ComplianceStatus::Warning);
        assert_eq!(ComplianceStatus::from_score(60.0), ComplianceStatus::Warning);
        assert_eq!(ComplianceStatus::from_score(59.99), ComplianceStatus::Fail);
        assert_eq!(ComplianceStatus::from_score(0.0), ComplianceStatus::Fail);
    }

    #[test]
    fn test_unavailable_corpus_has_zero_score() {
        let section = CorpusCompliance::unavailable("regulations collection not available");
        assert_eq!(section.score, 0.0);
        assert_eq!(section.total_violations, 0);
        assert_eq!(
            section.error.as_deref(),
            Some("regulations collection not available")
        );
    }

    #[test]
    fn test_evaluated_matches() {
        let mut check = CorpusCheck {
            corpus: CorpusKind::Policies,
            total_chunks_checked: 2,
            matches: vec![],
            weak_matches: vec![],
            violations: vec![],
            skipped_candidates: 4,
            dropped_far_matches: 1,
            compliance_score: 0.0,
        };
        assert!(!check.has_evaluated_matches());

        check.violations.push(MatchRecord {
            uploaded_chunk_id: "uploaded_chunk_0".to_string(),
            uploaded_section: "4.2.".to_string(),
            uploaded_text_excerpt: "kredit muddati 90 kun".to_string(),
            matched_text_excerpt: "kredit muddati 60 kun".to_string(),
            source_document: "nizom.pdf".to_string(),
            distance: 0.61,
            similarity: 0.39,
            tier: MatchTier::Violation,
            potential_issue: Some("DAYS: Uploaded says 90.0, reference says 60.0".to_string()),
        });
        assert!(check.has_evaluated_matches());
    }

    #[test]
    fn test_error_field_omitted_when_absent() {
        let section = CorpusCompliance {
            score: 75.0,
            total_violations: 0,
            violations: vec![],
            error: None,
        };
        let json = serde_json::to_value(&section).unwrap();
        assert!(json.get("error").is_none());
    }
}
