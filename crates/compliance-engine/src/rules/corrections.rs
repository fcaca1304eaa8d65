//! Correction generation from violation records
//!
//! Each `potential_issue` segment is parsed back into a field and value pair,
//! filtered through the outlier guard, given a severity, and deduplicated
//! across the whole report.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{
    ComplianceReport, CorpusKind, CorrectionItem, CorrectionReport, CorrectionSummary,
    MatchRecord, QuantityKind, Severity,
};
use tracing::{debug, info, warn};

use crate::error::ComplianceError;
use crate::extractors::find_phrase_with_value;
use crate::segmenter::section_label;

lazy_static! {
    static ref ISSUE_TEMPLATE: Regex =
        Regex::new(r"^(\w+):\s*Uploaded says ([0-9.]+),\s*reference says ([0-9.]+)").unwrap();
}

/// A discrepancy segment parsed back from its text form
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIssue {
    pub kind: QuantityKind,
    pub current_value: String,
    pub correct_value: String,
    pub difference: f64,
}

/// Parse one segment of a `potential_issue` string
pub fn parse_issue_segment(segment: &str) -> Result<ParsedIssue, ComplianceError> {
    let segment = segment.trim();
    let failure = || ComplianceError::DiscrepancyParseFailure(segment.to_string());

    let caps = ISSUE_TEMPLATE.captures(segment).ok_or_else(failure)?;
    let kind = QuantityKind::from_label(&caps[1]).ok_or_else(failure)?;
    let current: f64 = caps[2].parse().map_err(|_| failure())?;
    let correct: f64 = caps[3].parse().map_err(|_| failure())?;

    Ok(ParsedIssue {
        kind,
        current_value: caps[2].to_string(),
        correct_value: caps[3].to_string(),
        difference: (current - correct).abs(),
    })
}

/// Severity table: percent and days escalate with the size of the gap
pub fn severity_for(kind: QuantityKind, difference: f64) -> Severity {
    match kind {
        QuantityKind::Percent if difference >= 5.0 => Severity::Critical,
        QuantityKind::Percent if difference >= 1.0 => Severity::High,
        QuantityKind::Days if difference >= 5.0 => Severity::High,
        _ => Severity::Medium,
    }
}

/// Corrections derived from one violation, plus what was skipped on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionOutcome {
    pub items: Vec<CorrectionItem>,
    pub skipped_segments: usize,
    pub discarded_outliers: usize,
}

#[derive(Debug, Clone)]
pub struct CorrectionGenerator {
    outlier_guard: f64,
}

impl CorrectionGenerator {
    pub fn new(outlier_guard: f64) -> Self {
        Self { outlier_guard }
    }

    /// Corrections for a single violation record (not deduplicated)
    pub fn generate(&self, record: &MatchRecord, corpus: CorpusKind) -> CorrectionOutcome {
        let mut outcome = CorrectionOutcome::default();
        let Some(issue) = record.potential_issue.as_deref() else {
            return outcome;
        };

        let section = if record.uploaded_section != "unknown" {
            record.uploaded_section.clone()
        } else {
            section_label(&record.uploaded_text_excerpt).unwrap_or_else(|| "unknown".to_string())
        };

        for segment in issue.split('|') {
            let parsed = match parse_issue_segment(segment) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(chunk = %record.uploaded_chunk_id, "{}", e);
                    outcome.skipped_segments += 1;
                    continue;
                }
            };

            if parsed.difference > self.outlier_guard {
                debug!(
                    segment = segment.trim(),
                    difference = parsed.difference,
                    "Discarding outlier discrepancy"
                );
                outcome.discarded_outliers += 1;
                continue;
            }

            let unit = parsed.kind.unit_name();
            let current_phrase = find_phrase_with_value(
                &record.uploaded_text_excerpt,
                parsed.kind,
                &parsed.current_value,
            )
            .unwrap_or_else(|| format!("{} {}", parsed.current_value, unit));
            let corrected_phrase = find_phrase_with_value(
                &record.matched_text_excerpt,
                parsed.kind,
                &parsed.correct_value,
            )
            .unwrap_or_else(|| format!("{} {}", parsed.correct_value, unit));

            outcome.items.push(CorrectionItem {
                field: parsed.kind,
                action_required: format!(
                    "Change '{} {}' to '{} {}'",
                    parsed.current_value, unit, parsed.correct_value, unit
                ),
                severity: severity_for(parsed.kind, parsed.difference),
                current_value: parsed.current_value,
                correct_value: parsed.correct_value,
                unit: unit.to_string(),
                current_phrase,
                corrected_phrase,
                section: section.clone(),
                corpus,
                source_document: record.source_document.clone(),
            });
        }

        outcome
    }

    /// Correction report for a full compliance report, regulations first
    pub fn build_report(&self, compliance: &ComplianceReport) -> CorrectionReport {
        let mut report = CorrectionReport {
            report_date: chrono::Utc::now(),
            overall_status: compliance.overall_status,
            overall_compliance_score: compliance.overall_compliance_score,
            total_corrections_needed: 0,
            critical_corrections: Vec::new(),
            high_priority_corrections: Vec::new(),
            medium_priority_corrections: Vec::new(),
            summary: CorrectionSummary::default(),
            skipped_segments: 0,
            discarded_outliers: 0,
        };
        let mut seen = HashSet::new();

        let violations = compliance
            .regulation_compliance
            .violations
            .iter()
            .map(|v| (v, CorpusKind::Regulations))
            .chain(
                compliance
                    .policy_compliance
                    .violations
                    .iter()
                    .map(|v| (v, CorpusKind::Policies)),
            );

        for (violation, corpus) in violations {
            let outcome = self.generate(violation, corpus);
            report.skipped_segments += outcome.skipped_segments;
            report.discarded_outliers += outcome.discarded_outliers;

            for item in outcome.items {
                if !seen.insert(item.key()) {
                    continue;
                }
                match item.severity {
                    Severity::Critical => {
                        report.summary.critical_count += 1;
                        report.critical_corrections.push(item);
                    }
                    Severity::High => {
                        report.summary.high_count += 1;
                        report.high_priority_corrections.push(item);
                    }
                    Severity::Medium => {
                        report.summary.medium_count += 1;
                        report.medium_priority_corrections.push(item);
                    }
                }
            }
        }

        report.total_corrections_needed =
            report.summary.critical_count + report.summary.high_count + report.summary.medium_count;

        info!(
            total = report.total_corrections_needed,
            critical = report.summary.critical_count,
            high = report.summary.high_count,
            medium = report.summary.medium_count,
            "Generated correction report"
        );
        report
    }
}

impl Default for CorrectionGenerator {
    fn default() -> Self {
        Self::new(100.0)
    }
}
