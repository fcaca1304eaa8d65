use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComplianceError {
    #[error("Document text too short: {chars} characters (minimum {min_chars})")]
    EmptyDocument { chars: usize, min_chars: usize },

    #[error("Reference candidate '{candidate_id}' has no text")]
    MalformedReferenceEntry { candidate_id: String },

    #[error("Unrecognized discrepancy segment: '{0}'")]
    DiscrepancyParseFailure(String),
}

pub type Result<T> = std::result::Result<T, ComplianceError>;
