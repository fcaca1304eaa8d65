use shared_types::{ComplianceReport, ComplianceStatus, CorpusCheck, CorpusCompliance, DetailedFindings};
use tracing::info;

use crate::rules::classifier::round_to;

/// Outcome of one corpus sub-check: the check itself, or why it could not run
pub type CorpusOutcome = Result<CorpusCheck, String>;

fn section(outcome: &CorpusOutcome) -> CorpusCompliance {
    match outcome {
        Ok(check) => CorpusCompliance {
            score: check.compliance_score,
            total_violations: check.violations.len(),
            violations: check.violations.clone(),
            error: None,
        },
        Err(message) => CorpusCompliance::unavailable(message.clone()),
    }
}

fn strong_and_weak(outcome: &CorpusOutcome) -> (usize, usize) {
    match outcome {
        Ok(check) => (check.matches.len(), check.weak_matches.len()),
        Err(_) => (0, 0),
    }
}

/// Assemble the nested report from the regulation and policy sub-checks.
///
/// An unavailable corpus contributes a score of 0 to the mean.
pub fn build_compliance_report(
    document: &str,
    regulation: &CorpusOutcome,
    policy: &CorpusOutcome,
) -> ComplianceReport {
    let regulation_compliance = section(regulation);
    let policy_compliance = section(policy);

    let overall = (regulation_compliance.score + policy_compliance.score) / 2.0;
    let overall_status = ComplianceStatus::from_score(overall);

    let (regulation_matches, regulation_weak_matches) = strong_and_weak(regulation);
    let (policy_matches, policy_weak_matches) = strong_and_weak(policy);

    info!(
        document,
        score = overall,
        status = %overall_status,
        regulation_violations = regulation_compliance.total_violations,
        policy_violations = policy_compliance.total_violations,
        "Built compliance report"
    );

    ComplianceReport {
        report_date: chrono::Utc::now(),
        document: document.to_string(),
        overall_status,
        overall_compliance_score: round_to(overall, 2),
        regulation_compliance,
        policy_compliance,
        detailed_findings: DetailedFindings {
            regulation_matches,
            regulation_weak_matches,
            policy_matches,
            policy_weak_matches,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::CorpusKind;

    fn check(corpus: CorpusKind, score: f64) -> CorpusCheck {
        CorpusCheck {
            corpus,
            total_chunks_checked: 2,
            matches: vec![],
            weak_matches: vec![],
            violations: vec![],
            skipped_candidates: 0,
            dropped_far_matches: 0,
            compliance_score: score,
        }
    }

    #[test]
    fn test_overall_score_is_mean() {
        let report = build_compliance_report(
            "contract.pdf",
            &Ok(check(CorpusKind::Regulations, 90.0)),
            &Ok(check(CorpusKind::Policies, 75.0)),
        );
        assert_eq!(report.overall_compliance_score, 82.5);
        assert_eq!(report.overall_status, ComplianceStatus::Pass);
    }

    #[test]
    fn test_unavailable_corpus_is_reported_not_fatal() {
        let report = build_compliance_report(
            "contract.pdf",
            &Err("regulations collection not available".to_string()),
            &Ok(check(CorpusKind::Policies, 100.0)),
        );
        assert_eq!(
            report.regulation_compliance.error.as_deref(),
            Some("regulations collection not available")
        );
        assert_eq!(report.overall_compliance_score, 50.0);
        assert_eq!(report.overall_status, ComplianceStatus::Fail);
        assert!(report.policy_compliance.error.is_none());
    }

    #[test]
    fn test_warning_band() {
        let report = build_compliance_report(
            "contract.pdf",
            &Ok(check(CorpusKind::Regulations, 70.0)),
            &Ok(check(CorpusKind::Policies, 60.0)),
        );
        assert_eq!(report.overall_status, ComplianceStatus::Warning);
    }
}
