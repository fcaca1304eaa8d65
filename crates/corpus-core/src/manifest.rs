//! Reference document manifests
//!
//! A CSV file listing the documents of a reference corpus, one row per file,
//! with the columns `Filename`, `Version_Date`, `Status`, `Language`, `Script`
//! and `Folder`, plus an optional `Full_Path`. Only `Active` rows are ingested
//! and every row carries its own language.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use shared_types::Language;
use tracing::{debug, info};

use crate::error::{CorpusError, Result};

pub const ACTIVE_STATUS: &str = "Active";

#[derive(Debug, Deserialize)]
struct ManifestRow {
    #[serde(rename = "Filename")]
    filename: String,
    #[serde(rename = "Version_Date", default)]
    version_date: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Language")]
    language: String,
    #[serde(rename = "Script", default)]
    script: String,
    #[serde(rename = "Folder", default)]
    folder: String,
    #[serde(rename = "Full_Path", default)]
    full_path: Option<String>,
}

/// One document row of a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub filename: String,
    pub version_date: String,
    pub status: String,
    pub language: Language,
    pub script: String,
    pub folder: String,
    pub full_path: Option<PathBuf>,
}

impl ManifestEntry {
    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }

    /// Version metadata stored with every chunk of this document
    pub fn chunk_metadata(&self) -> BTreeMap<String, String> {
        let mut metadata = BTreeMap::new();
        metadata.insert("document_date".to_string(), self.version_date.clone());
        metadata.insert("document_status".to_string(), self.status.clone());
        metadata.insert("document_folder".to_string(), self.folder.clone());
        metadata.insert("document_script".to_string(), self.script.clone());
        metadata
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentManifest {
    entries: Vec<ManifestEntry>,
    /// Relative `Folder`/`Filename` paths resolve against this directory
    base_dir: PathBuf,
}

impl DocumentManifest {
    /// Read a manifest file; documents resolve relative to the file's directory
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let manifest = Self::from_reader(file, base_dir)?;
        info!(
            manifest = %path.display(),
            documents = manifest.entries.len(),
            active = manifest.active().count(),
            "Loaded document manifest"
        );
        Ok(manifest)
    }

    pub fn from_reader<R: Read>(reader: R, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (index, row) in csv_reader.deserialize::<ManifestRow>().enumerate() {
            // Header is line 1
            let line = index + 2;
            let row = row.map_err(|e| CorpusError::Manifest(format!("line {}: {}", line, e)))?;
            let language = row.language.parse::<Language>().map_err(|e| {
                CorpusError::Manifest(format!("line {} ({}): {}", line, row.filename, e))
            })?;
            debug!(line, document = %row.filename, status = %row.status, "Manifest row");

            entries.push(ManifestEntry {
                filename: row.filename,
                version_date: row.version_date,
                status: row.status,
                language,
                script: row.script,
                folder: row.folder,
                full_path: row.full_path.filter(|p| !p.is_empty()).map(PathBuf::from),
            });
        }

        Ok(Self {
            entries,
            base_dir: base_dir.into(),
        })
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn active(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.iter().filter(|e| e.is_active())
    }

    /// `Full_Path` when given, else `<base_dir>/<Folder>/<Filename>`
    pub fn document_path(&self, entry: &ManifestEntry) -> PathBuf {
        match &entry.full_path {
            Some(path) => path.clone(),
            None => self.base_dir.join(&entry.folder).join(&entry.filename),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = "\
Filename,Version_Date,Status,Language,Script,Folder
kredit_siyosati.pdf,2024-03-01,Active,Uzbek,Latin,kreditlar
eski_siyosat.pdf,2019-01-15,Archived,Uzbek,Latin,arxiv
политика_залога.pdf,2023-11-20,Active,Русский,Cyrillic,zalog
";

    #[test]
    fn test_reads_rows_and_filters_active() {
        let manifest = DocumentManifest::from_reader(MANIFEST.as_bytes(), "/data/policies").unwrap();

        assert_eq!(manifest.entries().len(), 3);
        let active: Vec<&str> = manifest.active().map(|e| e.filename.as_str()).collect();
        assert_eq!(active, vec!["kredit_siyosati.pdf", "политика_залога.pdf"]);

        let russian = &manifest.entries()[2];
        assert_eq!(russian.language, Language::Russian);
        assert_eq!(
            manifest.document_path(russian),
            PathBuf::from("/data/policies/zalog/политика_залога.pdf")
        );
    }

    #[test]
    fn test_chunk_metadata_carries_version() {
        let manifest = DocumentManifest::from_reader(MANIFEST.as_bytes(), ".").unwrap();
        let metadata = manifest.entries()[0].chunk_metadata();

        assert_eq!(metadata["document_date"], "2024-03-01");
        assert_eq!(metadata["document_status"], "Active");
        assert_eq!(metadata["document_folder"], "kreditlar");
        assert_eq!(metadata["document_script"], "Latin");
    }

    #[test]
    fn test_full_path_overrides_folder() {
        let csv = "Filename,Status,Language,Folder,Full_Path\n\
                   a.pdf,Active,uzbek,x,/srv/docs/a.pdf\n\
                   b.pdf,Active,uzbek,y,\n";
        let manifest = DocumentManifest::from_reader(csv.as_bytes(), "/base").unwrap();

        assert_eq!(manifest.document_path(&manifest.entries()[0]), PathBuf::from("/srv/docs/a.pdf"));
        assert_eq!(manifest.document_path(&manifest.entries()[1]), PathBuf::from("/base/y/b.pdf"));
        assert_eq!(manifest.entries()[1].version_date, "");
    }

    #[test]
    fn test_unknown_language_names_the_row() {
        let csv = "Filename,Status,Language\nok.pdf,Active,Uzbek\nbad.pdf,Active,English\n";
        let err = DocumentManifest::from_reader(csv.as_bytes(), ".").unwrap_err();

        assert!(matches!(err, CorpusError::Manifest(_)));
        let message = err.to_string();
        assert!(message.contains("line 3"), "{}", message);
        assert!(message.contains("bad.pdf"), "{}", message);
    }

    #[test]
    fn test_missing_required_column_is_an_error() {
        let csv = "Filename,Language\na.pdf,Uzbek\n";
        assert!(matches!(
            DocumentManifest::from_reader(csv.as_bytes(), "."),
            Err(CorpusError::Manifest(_))
        ));
    }

    #[test]
    fn test_from_path_resolves_against_manifest_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.csv");
        std::fs::write(&path, MANIFEST).unwrap();

        let manifest = DocumentManifest::from_path(&path).unwrap();
        let first = &manifest.entries()[0];
        assert_eq!(
            manifest.document_path(first),
            dir.path().join("kreditlar").join("kredit_siyosati.pdf")
        );

        let moved = manifest.with_base_dir("/elsewhere");
        assert_eq!(
            moved.document_path(&moved.entries()[0]),
            PathBuf::from("/elsewhere/kreditlar/kredit_siyosati.pdf")
        );
    }
}
