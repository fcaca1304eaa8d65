pub mod report;
pub mod types;

pub use report::{
    ComplianceReport, ComplianceStatus, CorpusCheck, CorpusCompliance, CorrectionReport,
    CorrectionSummary, DetailedFindings,
};
pub use types::{
    Chunk, CorpusKind, CorrectionItem, Language, MatchRecord, MatchTier, ParseLanguageError,
    QuantityKind, ReferenceCandidate, Script, Severity,
};
