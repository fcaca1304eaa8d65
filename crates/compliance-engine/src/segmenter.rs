//! Layout-driven paragraph segmentation
//!
//! One line-oriented pass over extracted text. Section header lines are always
//! dropped and always close the open chunk. The remaining split rules are
//! switched on per corpus through [`SplitPolicy`]:
//!
//! | rule | regulation | policy | contract |
//! |---|---|---|---|
//! | indentation (2+ leading whitespace) | | x | x |
//! | previous line ended with `.` or `;` | x | | x |
//! | leading capital letter | | x | x |
//! | leading numeric label (not a header) | | | x |
//!
//! A flushed chunk shorter than `min_words` is discarded.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::patterns::{leading_whitespace, LEADING_CAPITAL, PAGE_NUMBER_LINE, SECTION_HEADER, SECTION_NUMBER};

/// Which split rules are active, plus the minimum chunk length in words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPolicy {
    pub indentation: bool,
    pub sentence_end: bool,
    pub leading_capital: bool,
    pub numbered_line: bool,
    pub min_words: usize,
}

impl SplitPolicy {
    /// Regulations: headers plus sentence-end splits, 5 words minimum
    pub fn regulation() -> Self {
        Self {
            indentation: false,
            sentence_end: true,
            leading_capital: false,
            numbered_line: false,
            min_words: 5,
        }
    }

    /// Internal policies: headers, indentation and leading capitals, 10 words minimum
    pub fn policy() -> Self {
        Self {
            indentation: true,
            sentence_end: false,
            leading_capital: true,
            numbered_line: false,
            min_words: 10,
        }
    }

    /// Uploaded contracts: every rule, 10 words minimum
    pub fn contract() -> Self {
        Self {
            indentation: true,
            sentence_end: true,
            leading_capital: true,
            numbered_line: true,
            min_words: 10,
        }
    }

    pub fn with_min_words(mut self, min_words: usize) -> Self {
        self.min_words = min_words;
        self
    }
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self::contract()
    }
}

/// A chunk of text together with the label of the section header above it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// Numeric label of the most recent dropped header, e.g. "3.1."
    pub heading: Option<String>,
}

impl Segment {
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    policy: SplitPolicy,
}

impl Segmenter {
    pub fn new(policy: SplitPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SplitPolicy {
        &self.policy
    }

    /// Split `text` into ordered chunk texts
    pub fn segment(&self, text: &str) -> Vec<String> {
        self.segment_with_headings(text)
            .into_iter()
            .map(|segment| segment.text)
            .collect()
    }

    /// Split `text` into ordered segments, remembering the governing header label
    pub fn segment_with_headings(&self, text: &str) -> Vec<Segment> {
        let policy = &self.policy;
        let mut segments = Vec::new();
        let mut open = OpenChunk::default();
        let mut last_heading: Option<String> = None;
        let mut force_split = false;

        for raw_line in text.split('\n') {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if SECTION_HEADER.is_match(line) {
                open.flush(policy.min_words, &mut segments);
                last_heading = section_label(line);
                force_split = false;
                continue;
            }

            let split = !open.is_empty()
                && ((policy.indentation && leading_whitespace(raw_line) >= 2)
                    || (policy.sentence_end && force_split)
                    || (policy.leading_capital && LEADING_CAPITAL.is_match(line))
                    || (policy.numbered_line && SECTION_NUMBER.is_match(line)));
            if split {
                open.flush(policy.min_words, &mut segments);
            }

            if open.is_empty() {
                open.heading = last_heading.clone();
            }
            open.lines.push(line);
            force_split = line.ends_with('.') || line.ends_with(';');
        }

        open.flush(policy.min_words, &mut segments);
        debug!(chunks = segments.len(), min_words = policy.min_words, "Segmented text");
        segments
    }
}

#[derive(Default)]
struct OpenChunk<'a> {
    lines: Vec<&'a str>,
    heading: Option<String>,
}

impl OpenChunk<'_> {
    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn flush(&mut self, min_words: usize, out: &mut Vec<Segment>) {
        if self.lines.is_empty() {
            return;
        }
        let text = self.lines.join(" ").trim().to_string();
        self.lines.clear();
        let heading = self.heading.take();

        if text.split_whitespace().count() >= min_words && !text.is_empty() {
            out.push(Segment { text, heading });
        }
    }
}

/// Leading numeric label of a line ("7.4.5."), if any
pub fn section_label(line: &str) -> Option<String> {
    SECTION_NUMBER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Remove lines that hold only a page number
pub fn strip_page_numbers(text: &str) -> String {
    text.split('\n')
        .filter(|line| !PAGE_NUMBER_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_regulation_splits_after_sentence_end() {
        let text = "Bank mijozga kredit shartlari haqida yozma\n\
                    ma'lumot berishi shart.\n\
                    Kredit muddati kamida 90 kalendar kun bo'lishi lozim;\n\
                    foiz stavkasi shartnomada ko'rsatiladi va o'zgarmaydi.";
        let chunks = Segmenter::new(SplitPolicy::regulation()).segment(text);

        assert_eq!(
            chunks,
            vec![
                "Bank mijozga kredit shartlari haqida yozma ma'lumot berishi shart.",
                "Kredit muddati kamida 90 kalendar kun bo'lishi lozim;",
                "foiz stavkasi shartnomada ko'rsatiladi va o'zgarmaydi.",
            ]
        );
    }

    #[test]
    fn test_section_header_is_dropped_and_splits() {
        let text = "birinchi qism matni bu yerda davom etadi\n\
                    1.2.3. Definitions\n\
                    ikkinchi qism matni bu yerda davom etadi";
        let segments = Segmenter::new(SplitPolicy::regulation()).segment_with_headings(text);

        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| !s.text.contains("Definitions")));
        assert_eq!(segments[0].heading, None);
        assert_eq!(segments[1].heading.as_deref(), Some("1.2.3."));
    }

    #[test]
    fn test_header_clears_forced_split() {
        let policy = SplitPolicy::regulation().with_min_words(1);
        let text = "oxirgi gap.\n2. Yangi bo'lim\ndavomi\nyana davomi";
        let chunks = Segmenter::new(policy).segment(text);
        assert_eq!(chunks, vec!["oxirgi gap.", "davomi yana davomi"]);
    }

    #[test]
    fn test_policy_splits_on_indentation_and_capitals() {
        let policy = SplitPolicy::policy().with_min_words(1);
        let text = "Birinchi paragraf\ndavom etadi.\n  ikkinchi paragraf\nuchinchi emas\nTo'rtinchi";
        let chunks = Segmenter::new(policy).segment(text);
        assert_eq!(
            chunks,
            vec![
                "Birinchi paragraf davom etadi.",
                "ikkinchi paragraf uchinchi emas",
                "To'rtinchi",
            ]
        );
    }

    #[test]
    fn test_policy_ignores_sentence_end() {
        let policy = SplitPolicy::policy().with_min_words(1);
        let chunks = Segmenter::new(policy).segment("bir gap.\nikkinchi gap");
        assert_eq!(chunks, vec!["bir gap. ikkinchi gap"]);
    }

    #[test]
    fn test_contract_splits_on_numbered_lines() {
        let policy = SplitPolicy::contract().with_min_words(1);
        let chunks = Segmenter::new(policy).segment("kredit beriladi\n7.4.5. kredit muddati 90 kun");
        assert_eq!(chunks, vec!["kredit beriladi", "7.4.5. kredit muddati 90 kun"]);
    }

    #[test]
    fn test_short_fragments_are_discarded() {
        let chunks = Segmenter::new(SplitPolicy::regulation()).segment("Juda qisqa.\nHam qisqa;");
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_blank_lines_carry_no_split() {
        let policy = SplitPolicy::regulation().with_min_words(1);
        let chunks = Segmenter::new(policy).segment("bir\n\n\n   \nikki");
        assert_eq!(chunks, vec!["bir ikki"]);
    }

    #[test]
    fn test_strip_page_numbers() {
        let stripped = strip_page_numbers("matn 12 kun\n 12 \nkeyingi\n3");
        assert_eq!(stripped, "matn 12 kun\nkeyingi");
    }

    #[test]
    fn test_resegmenting_output_is_stable() {
        let segmenter = Segmenter::new(SplitPolicy::regulation());
        let text = "Bank mijozga kredit shartlari haqida\nyozma ma'lumot berishi shart.\n\
                    Kredit muddati kamida 90 kalendar kun bo'lishi lozim.";
        let first = segmenter.segment(text);
        let second = segmenter.segment(&first.join("\n"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_space_joined_paragraph_keeps_chunk_count() {
        let segmenter = Segmenter::new(SplitPolicy::regulation());
        let text = "Bank mijozga kredit shartlari haqida\nyozma ravishda ma'lumot berishi\nva bu haqda reestrga yozuv kiritishi shart.";
        let first = segmenter.segment(text);
        let second = segmenter.segment(&first.join(" "));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), first.len());
        assert_eq!(second, first);
    }

    fn body_line() -> impl Strategy<Value = String> {
        (
            prop::collection::vec("[a-z]{1,8}", 1..6),
            prop::sample::select(vec!["", ".", ";"]),
            prop::sample::select(vec!["", "  "]),
        )
            .prop_map(|(words, end, indent)| format!("{}{}{}", indent, words.join(" "), end))
    }

    fn header_line() -> impl Strategy<Value = String> {
        (1u32..20, 1u32..20, "[A-Z][a-z]{2,8}")
            .prop_map(|(major, minor, title)| format!("{}.{}. {}", major, minor, title))
    }

    fn document() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop_oneof![4 => body_line(), 1 => header_line()], 0..40)
    }

    fn any_policy() -> impl Strategy<Value = SplitPolicy> {
        (
            prop::sample::select(vec![
                SplitPolicy::regulation(),
                SplitPolicy::policy(),
                SplitPolicy::contract(),
            ]),
            0usize..12,
        )
            .prop_map(|(policy, min_words)| policy.with_min_words(min_words))
    }

    proptest! {
        #[test]
        fn chunks_respect_min_words(lines in document(), policy in any_policy()) {
            let chunks = Segmenter::new(policy).segment(&lines.join("\n"));
            for chunk in chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.split_whitespace().count() >= policy.min_words);
            }
        }

        #[test]
        fn space_joined_output_keeps_chunk_count(
            lines in prop::collection::vec(prop::collection::vec("[a-z]{1,8}", 1..6), 1..20),
            min_words in 0usize..12,
        ) {
            let text = lines.iter().map(|words| words.join(" ")).collect::<Vec<_>>().join("\n");
            let segmenter = Segmenter::new(SplitPolicy::regulation().with_min_words(min_words));
            let first = segmenter.segment(&text);
            let second = segmenter.segment(&first.join(" "));
            prop_assert_eq!(first.len(), second.len());
        }

        #[test]
        fn header_lines_never_reach_chunks(lines in document(), policy in any_policy()) {
            let chunks = Segmenter::new(policy).segment(&lines.join("\n"));
            let headers: Vec<&String> = lines.iter().filter(|l| SECTION_HEADER.is_match(l)).collect();
            for chunk in &chunks {
                for header in &headers {
                    prop_assert!(!chunk.contains(header.as_str()));
                }
            }
        }
    }
}
