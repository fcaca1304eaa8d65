use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use shared_types::Chunk;

use crate::rules::classifier::round_to;

/// Summary of a chunking run across one or more documents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkStatistics {
    pub total_chunks: usize,
    pub total_documents: usize,
    pub avg_chunks_per_document: f64,
    pub avg_words_per_chunk: f64,
    /// Chunks flagged per hotspot category, zero for categories never seen
    pub hotspot_distribution: BTreeMap<String, usize>,
    pub script_distribution: BTreeMap<String, usize>,
}

impl ChunkStatistics {
    pub fn from_chunks<'a>(chunks: &[Chunk], categories: impl IntoIterator<Item = &'a str>) -> Self {
        let documents: BTreeSet<&str> = chunks.iter().map(|c| c.source_document.as_str()).collect();
        let total_words: usize = chunks.iter().map(|c| c.word_count).sum();

        let mut hotspot_distribution: BTreeMap<String, usize> =
            categories.into_iter().map(|name| (name.to_string(), 0)).collect();
        let mut script_distribution = BTreeMap::new();

        for chunk in chunks {
            for flag in &chunk.compliance_flags {
                *hotspot_distribution.entry(flag.clone()).or_insert(0) += 1;
            }
            *script_distribution.entry(chunk.script.to_string()).or_insert(0) += 1;
        }

        Self {
            total_chunks: chunks.len(),
            total_documents: documents.len(),
            avg_chunks_per_document: round_to(chunks.len() as f64 / documents.len().max(1) as f64, 2),
            avg_words_per_chunk: round_to(total_words as f64 / chunks.len().max(1) as f64, 2),
            hotspot_distribution,
            script_distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Script;

    fn chunk(document: &str, words: usize, script: Script, flags: &[&str]) -> Chunk {
        Chunk {
            id: format!("{}_{}", document, words),
            source_document: document.to_string(),
            index: 0,
            total_in_document: 1,
            text: "x ".repeat(words).trim().to_string(),
            script,
            text_variant: None,
            word_count: words,
            section_number: "unknown".to_string(),
            compliance_flags: flags.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_statistics() {
        let chunks = vec![
            chunk("a.pdf", 10, Script::Latin, &["collateral"]),
            chunk("a.pdf", 20, Script::Cyrillic, &["collateral", "interest_rate"]),
            chunk("b.pdf", 15, Script::Latin, &[]),
        ];
        let stats = ChunkStatistics::from_chunks(&chunks, ["collateral", "interest_rate", "pre_selected"]);

        assert_eq!(stats.total_chunks, 3);
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.avg_chunks_per_document, 1.5);
        assert_eq!(stats.avg_words_per_chunk, 15.0);
        assert_eq!(stats.hotspot_distribution["collateral"], 2);
        assert_eq!(stats.hotspot_distribution["pre_selected"], 0);
        assert_eq!(stats.script_distribution["Latin"], 2);
    }

    #[test]
    fn test_serialized_shape() {
        let chunks = vec![chunk("a.pdf", 12, Script::Latin, &["collateral"])];
        let stats = ChunkStatistics::from_chunks(&chunks, ["collateral"]);
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["total_documents"], 1);
        assert_eq!(json["avg_words_per_chunk"], 12.0);
        assert_eq!(json["hotspot_distribution"]["collateral"], 1);
        assert_eq!(json["script_distribution"]["Latin"], 1);
    }

    #[test]
    fn test_empty_input() {
        let stats = ChunkStatistics::from_chunks(&[], std::iter::empty::<&str>());
        assert_eq!(stats.total_chunks, 0);
        assert_eq!(stats.avg_words_per_chunk, 0.0);
    }
}
