use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::patterns::DEFAULT_HOTSPOTS;

/// A named compliance category and the phrases that flag it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotspotCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

impl HotspotCategory {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// The built-in banking categories
pub fn default_categories() -> Vec<HotspotCategory> {
    DEFAULT_HOTSPOTS
        .iter()
        .map(|(name, keywords)| HotspotCategory::new(*name, keywords))
        .collect()
}

/// Flags every category whose keywords occur in a chunk (case-insensitive substring)
#[derive(Debug, Clone)]
pub struct HotspotTagger {
    categories: Vec<HotspotCategory>,
}

impl HotspotTagger {
    pub fn new(categories: Vec<HotspotCategory>) -> Self {
        let categories = categories
            .into_iter()
            .map(|category| HotspotCategory {
                keywords: category.keywords.iter().map(|k| k.to_lowercase()).collect(),
                name: category.name,
            })
            .collect();
        Self { categories }
    }

    pub fn tag(&self, text: &str) -> BTreeSet<String> {
        let text_lower = text.to_lowercase();
        self.categories
            .iter()
            .filter(|category| category.keywords.iter().any(|k| text_lower.contains(k.as_str())))
            .map(|category| category.name.clone())
            .collect()
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.name.as_str())
    }
}

impl Default for HotspotTagger {
    fn default() -> Self {
        Self::new(default_categories())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_multiple_categories() {
        let tagger = HotspotTagger::default();
        let flags = tagger.tag("Foiz stavkasi yillik 24%, garov sifatida ko'chmas mulk");
        assert!(flags.contains("interest_rate"));
        assert!(flags.contains("collateral"));
        assert_eq!(flags.len(), 2);
    }

    #[test]
    fn test_tags_cyrillic_case_insensitively() {
        let tagger = HotspotTagger::default();
        let flags = tagger.tag("КЛИЕНТ ИМЕЕТ ПРАВО расторгнуть договор");
        assert!(flags.contains("mandatory_disclosure"));
    }

    #[test]
    fn test_checkbox_marks_flag_preselection() {
        let tagger = HotspotTagger::default();
        assert!(tagger.tag("☑ SMS xabarnoma").contains("pre_selected"));
    }

    #[test]
    fn test_no_keywords_no_flags() {
        let tagger = HotspotTagger::default();
        assert!(tagger.tag("Oddiy matn").is_empty());
    }

    #[test]
    fn test_custom_categories() {
        let tagger = HotspotTagger::new(vec![HotspotCategory::new("penalty", &["Jarima"])]);
        assert!(tagger.tag("kechikish uchun jarima").contains("penalty"));
        assert_eq!(tagger.category_names().collect::<Vec<_>>(), vec!["penalty"]);
    }
}
