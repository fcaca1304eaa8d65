//! Chunk record building: segmentation plus per-chunk metadata

use std::path::Path;

use shared_types::{Chunk, CorpusKind, Script};

use crate::hotspots::HotspotTagger;
use crate::segmenter::{section_label, strip_page_numbers, Segmenter, SplitPolicy};
use crate::transliterate::{detect_script, transliterate};

pub struct ChunkBuilder<'a> {
    corpus: CorpusKind,
    segmenter: Segmenter,
    tagger: &'a HotspotTagger,
}

impl<'a> ChunkBuilder<'a> {
    pub fn new(corpus: CorpusKind, policy: SplitPolicy, tagger: &'a HotspotTagger) -> Self {
        Self {
            corpus,
            segmenter: Segmenter::new(policy),
            tagger,
        }
    }

    /// Stable chunk id for position `index` of `document`
    pub fn chunk_id(&self, document: &str, index: usize) -> String {
        match self.corpus {
            CorpusKind::Regulations => format!("reg_{}_{}", document_stem(document), index),
            CorpusKind::Policies => format!("{}__chunk_{}", document_stem(document), index),
            CorpusKind::Uploaded => format!("uploaded_chunk_{}", index),
        }
    }

    /// Build the ordered chunks of one document from its extracted text
    pub fn build(&self, document: &str, text: &str) -> Vec<Chunk> {
        let segments = self
            .segmenter
            .segment_with_headings(&strip_page_numbers(text));
        let total = segments.len();

        segments
            .into_iter()
            .enumerate()
            .map(|(index, segment)| {
                let script = detect_script(&segment.text);
                let text_variant = match self.corpus {
                    CorpusKind::Uploaded => None,
                    _ => Some(transliterate(&segment.text, other_script(script))),
                };
                let section_number = section_label(&segment.text)
                    .or_else(|| segment.heading.clone())
                    .unwrap_or_else(|| "unknown".to_string());

                Chunk {
                    id: self.chunk_id(document, index),
                    source_document: document.to_string(),
                    index,
                    total_in_document: total,
                    word_count: segment.word_count(),
                    compliance_flags: self.tagger.tag(&segment.text),
                    section_number,
                    script,
                    text_variant,
                    text: segment.text,
                }
            })
            .collect()
    }
}

fn other_script(script: Script) -> Script {
    match script {
        Script::Latin => Script::Cyrillic,
        Script::Cyrillic => Script::Latin,
    }
}

fn document_stem(document: &str) -> String {
    Path::new(document)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| document.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REGULATION: &str = "1. Umumiy qoidalar\n\
        Bank mijozga kredit shartlari haqida yozma ma'lumot berishi shart.\n\
        7\n\
        2.1. Kredit muddati\n\
        Kredit muddati kamida 90 kalendar kun bo'lishi lozim;\n\
        3.1.2. foiz stavkasi shartnomada ko'rsatiladi va o'zgarmaydi.";

    #[test]
    fn test_regulation_chunks_carry_metadata() {
        let tagger = HotspotTagger::default();
        let builder = ChunkBuilder::new(CorpusKind::Regulations, SplitPolicy::regulation(), &tagger);
        let chunks = builder.build("docs/Nizom 2024.pdf", REGULATION);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].id, "reg_Nizom 2024_0");
        assert_eq!(chunks[0].section_number, "1.");
        assert_eq!(chunks[1].section_number, "2.1.");
        assert_eq!(chunks[2].section_number, "3.1.2.");
        assert!(chunks[2].compliance_flags.contains("interest_rate"));
        assert!(chunks.iter().all(|c| c.total_in_document == 3));
        assert!(chunks.iter().all(|c| c.script == Script::Latin));
        assert!(chunks.iter().all(|c| !c.text.contains(" 7 ")));
        assert_eq!(
            chunks[1].text_variant.as_deref(),
            Some("Кредит муддати камида 90 календар кун бўлиши лозим;")
        );
    }

    #[test]
    fn test_policy_and_upload_ids() {
        let tagger = HotspotTagger::default();
        let policy = ChunkBuilder::new(CorpusKind::Policies, SplitPolicy::policy(), &tagger);
        let upload = ChunkBuilder::new(CorpusKind::Uploaded, SplitPolicy::contract(), &tagger);

        assert_eq!(policy.chunk_id("anorbank_credit.pdf", 4), "anorbank_credit__chunk_4");
        assert_eq!(upload.chunk_id("whatever.pdf", 2), "uploaded_chunk_2");
    }

    #[test]
    fn test_uploaded_chunks_have_no_variant() {
        let tagger = HotspotTagger::default();
        let builder = ChunkBuilder::new(
            CorpusKind::Uploaded,
            SplitPolicy::contract().with_min_words(3),
            &tagger,
        );
        let chunks = builder.build("contract.pdf", "Kredit muddati 90 kun\n");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text_variant, None);
        assert_eq!(chunks[0].section_number, "unknown");
        assert_eq!(chunks[0].position(), "1/1");
    }
}
