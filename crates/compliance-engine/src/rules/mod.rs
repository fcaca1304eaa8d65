pub mod classifier;
pub mod corrections;
pub mod discrepancy;

pub use classifier::{compliance_score, ClassifiedMatches, MatchClassifier};
pub use corrections::{parse_issue_segment, severity_for, CorrectionGenerator, CorrectionOutcome, ParsedIssue};
pub use discrepancy::{detect, find_discrepancies, Discrepancy};
