//! Engine configuration
//!
//! Every tunable the core uses is passed in here at construction time; nothing
//! in this crate reads the environment.

use serde::{Deserialize, Serialize};
use shared_types::CorpusKind;

use crate::hotspots::{default_categories, HotspotCategory};
use crate::segmenter::SplitPolicy;

/// Distance below which a candidate is a strong match
pub const STRONG_MATCH_THRESHOLD: f64 = 0.3;

/// Distance below which a candidate is at least a weak match
pub const WEAK_MATCH_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub regulation_policy: SplitPolicy,
    pub policy_policy: SplitPolicy,
    pub contract_policy: SplitPolicy,

    /// Extracted text shorter than this (in characters) is an empty document
    pub min_text_chars: usize,

    pub strong_threshold: f64,
    pub weak_threshold: f64,

    /// Characters kept in match-record excerpts
    pub excerpt_chars: usize,

    /// Discrepancies whose values differ by more than this are discarded
    pub outlier_guard: f64,

    pub hotspots: Vec<HotspotCategory>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            regulation_policy: SplitPolicy::regulation(),
            policy_policy: SplitPolicy::policy(),
            contract_policy: SplitPolicy::contract(),
            min_text_chars: 100,
            strong_threshold: STRONG_MATCH_THRESHOLD,
            weak_threshold: WEAK_MATCH_THRESHOLD,
            excerpt_chars: 200,
            outlier_guard: 100.0,
            hotspots: default_categories(),
        }
    }
}

impl EngineConfig {
    /// Split policy used when chunking documents of the given corpus
    pub fn split_policy(&self, corpus: CorpusKind) -> SplitPolicy {
        match corpus {
            CorpusKind::Regulations => self.regulation_policy,
            CorpusKind::Policies => self.policy_policy,
            CorpusKind::Uploaded => self.contract_policy,
        }
    }

    pub fn with_min_text_chars(mut self, min_text_chars: usize) -> Self {
        self.min_text_chars = min_text_chars;
        self
    }

    pub fn with_thresholds(mut self, strong: f64, weak: f64) -> Self {
        self.strong_threshold = strong;
        self.weak_threshold = weak;
        self
    }

    pub fn with_hotspots(mut self, hotspots: Vec<HotspotCategory>) -> Self {
        self.hotspots = hotspots;
        self
    }
}
