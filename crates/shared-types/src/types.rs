use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Writing system of a chunk's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Script {
    Latin,
    Cyrillic,
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Script::Latin => write!(f, "Latin"),
            Script::Cyrillic => write!(f, "Cyrillic"),
        }
    }
}

/// Document language. Selects which text variant of a chunk gets embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Uzbek,
    Russian,
}

impl Language {
    /// Script whose text variant is embedded for documents in this language
    pub fn embedding_script(&self) -> Script {
        match self {
            Language::Uzbek => Script::Latin,
            Language::Russian => Script::Cyrillic,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Uzbek => write!(f, "uzbek"),
            Language::Russian => write!(f, "russian"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown document language: '{0}' (expected 'uzbek' or 'russian')")]
pub struct ParseLanguageError(pub String);

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uzbek" | "uz" | "o'zbek" | "ўзбек" => Ok(Language::Uzbek),
            "russian" | "ru" | "русский" => Ok(Language::Russian),
            _ => Err(ParseLanguageError(s.to_string())),
        }
    }
}

/// The three logical vector collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorpusKind {
    Regulations,
    Policies,
    Uploaded,
}

impl CorpusKind {
    /// Name of the vector-store collection backing this corpus
    pub fn collection_name(&self) -> &'static str {
        match self {
            CorpusKind::Regulations => "regulations",
            CorpusKind::Policies => "bank_policies",
            CorpusKind::Uploaded => "uploaded_documents",
        }
    }

    /// Short label used in correction items ("regulation" / "policy")
    pub fn violation_label(&self) -> &'static str {
        match self {
            CorpusKind::Regulations => "regulation",
            CorpusKind::Policies => "policy",
            CorpusKind::Uploaded => "uploaded",
        }
    }

    pub fn from_violation_label(label: &str) -> Option<Self> {
        match label {
            "regulation" => Some(CorpusKind::Regulations),
            "policy" => Some(CorpusKind::Policies),
            "uploaded" => Some(CorpusKind::Uploaded),
            _ => None,
        }
    }
}

/// (De)serializes a [`CorpusKind`] as its violation label
mod violation_label {
    use super::CorpusKind;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(corpus: &CorpusKind, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(corpus.violation_label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CorpusKind, D::Error> {
        let label = String::deserialize(deserializer)?;
        CorpusKind::from_violation_label(&label)
            .ok_or_else(|| D::Error::custom(format!("unknown corpus label '{}'", label)))
    }
}

impl fmt::Display for CorpusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

/// A contiguous span of source text plus derived metadata.
///
/// Created once per document during segmentation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Chunk {
    pub id: String,
    pub source_document: String,
    pub index: usize,
    pub total_in_document: usize,
    pub text: String,
    pub script: Script,
    /// Same text transliterated into the other script (reference corpora only)
    pub text_variant: Option<String>,
    pub word_count: usize,
    pub section_number: String, // e.g. "7.4.5." or "unknown"
    pub compliance_flags: BTreeSet<String>,
}

impl Chunk {
    /// Text in the requested script, falling back to the primary text when no
    /// variant was produced.
    pub fn text_in(&self, script: Script) -> &str {
        if script == self.script {
            return &self.text;
        }
        self.text_variant.as_deref().unwrap_or(&self.text)
    }

    /// "3/12"-style position inside the source document
    pub fn position(&self) -> String {
        format!("{}/{}", self.index + 1, self.total_in_document)
    }
}

/// One ranked result returned by the vector store for a query vector
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReferenceCandidate {
    pub id: String,
    pub text: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub distance: f64,
}

impl ReferenceCandidate {
    pub fn source_document(&self) -> &str {
        self.metadata
            .get("document_filename")
            .map(String::as_str)
            .unwrap_or("Unknown")
    }
}

/// Distance tier of a single candidate match
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Strong,
    Weak,
    Violation,
}

/// The pairing of one uploaded chunk with one retrieved reference chunk
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchRecord {
    pub uploaded_chunk_id: String,
    /// Section number of the uploaded chunk, "unknown" when it has none
    #[serde(default = "unknown_section")]
    pub uploaded_section: String,
    pub uploaded_text_excerpt: String,
    pub matched_text_excerpt: String,
    pub source_document: String,
    pub distance: f64,
    pub similarity: f64,
    pub tier: MatchTier,
    pub potential_issue: Option<String>,
}

fn unknown_section() -> String {
    "unknown".to_string()
}

/// Typed numeric quantity categories compared between texts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityKind {
    Days,
    Percent,
    Months,
    Years,
}

impl QuantityKind {
    pub const ALL: [QuantityKind; 4] = [
        QuantityKind::Days,
        QuantityKind::Percent,
        QuantityKind::Months,
        QuantityKind::Years,
    ];

    /// Upper-case label used in discrepancy descriptions ("DAYS: ...")
    pub fn label(&self) -> &'static str {
        match self {
            QuantityKind::Days => "DAYS",
            QuantityKind::Percent => "PERCENT",
            QuantityKind::Months => "MONTHS",
            QuantityKind::Years => "YEARS",
        }
    }

    /// Unit name appended to bare values in correction phrases
    pub fn unit_name(&self) -> &'static str {
        match self {
            QuantityKind::Days => "kalendar kun",
            QuantityKind::Percent => "%",
            QuantityKind::Months => "oy",
            QuantityKind::Years => "yil",
        }
    }

    /// Case-insensitive inverse of [`QuantityKind::label`]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_lowercase().as_str() {
            "days" => Some(QuantityKind::Days),
            "percent" => Some(QuantityKind::Percent),
            "months" => Some(QuantityKind::Months),
            "years" => Some(QuantityKind::Years),
            _ => None,
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "CRITICAL"),
            Severity::High => write!(f, "HIGH"),
            Severity::Medium => write!(f, "MEDIUM"),
        }
    }
}

/// One concrete fix derived from a numeric discrepancy
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CorrectionItem {
    pub field: QuantityKind,
    pub current_value: String, // numeric string, e.g. "90.0"
    pub correct_value: String,
    pub unit: String,
    pub current_phrase: String,
    pub corrected_phrase: String,
    pub severity: Severity,
    pub section: String,
    #[serde(with = "violation_label")]
    pub corpus: CorpusKind,
    pub source_document: String,
    pub action_required: String,
}

impl CorrectionItem {
    /// Deduplication key: (field, current value, correct value)
    pub fn key(&self) -> (QuantityKind, String, String) {
        (
            self.field,
            self.current_value.clone(),
            self.correct_value.clone(),
        )
    }
}
