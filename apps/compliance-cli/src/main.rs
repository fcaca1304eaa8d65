//! Compliance CLI
//!
//! - `segment`: chunk one document and print the chunks as JSON
//! - `ingest`: load reference documents into the regulation or policy collection,
//!   either listed on the command line or from a CSV manifest
//! - `check`: check a contract and write the compliance and correction reports
//! - `stats`: chunking statistics over a set of documents
//! - `collections`: list stored collections

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use compliance_engine::{ComplianceEngine, EngineConfig};
use corpus_core::{CheckOutcome, CompliancePipeline, CorpusConfig, DistanceMetric, DocumentManifest};
use shared_pdf::PdfTextExtractor;
use shared_types::{CorpusKind, Language};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "compliance", version, about = "Document compliance checks against regulation and policy corpora")]
struct Cli {
    /// Collection snapshot directory (overrides COMPLIANCE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Candidates retrieved per chunk (overrides COMPLIANCE_TOP_K)
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Distance metric: l2 or cosine (overrides COMPLIANCE_DISTANCE)
    #[arg(long, global = true)]
    distance: Option<DistanceMetric>,

    /// Use the offline hashing embedder instead of the HTTP backend
    #[arg(long, global = true)]
    offline: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Segment {
        input: PathBuf,
        #[arg(long, value_enum, default_value_t = CorpusArg::Uploaded)]
        corpus: CorpusArg,
    },
    Ingest {
        /// Reference files, or directories whose PDFs are all ingested
        #[arg(required_unless_present = "manifest")]
        inputs: Vec<PathBuf>,
        #[arg(long, value_enum)]
        corpus: ReferenceCorpus,
        /// uzbek or russian; selects the embedded script
        #[arg(long, default_value = "uzbek")]
        language: Language,
        /// CSV manifest (Filename, Version_Date, Status, Language, Script, Folder);
        /// only Active rows are ingested, each in its own language
        #[arg(long, conflicts_with = "inputs")]
        manifest: Option<PathBuf>,
        /// Directory the manifest's Folder/Filename paths resolve against
        /// (default: the manifest's own directory)
        #[arg(long, requires = "manifest")]
        documents_dir: Option<PathBuf>,
    },
    Check {
        input: PathBuf,
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    Stats {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long, value_enum, default_value_t = CorpusArg::Regulations)]
        corpus: CorpusArg,
    },
    Collections,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum CorpusArg {
    Regulations,
    Policies,
    Uploaded,
}

impl From<CorpusArg> for CorpusKind {
    fn from(arg: CorpusArg) -> Self {
        match arg {
            CorpusArg::Regulations => CorpusKind::Regulations,
            CorpusArg::Policies => CorpusKind::Policies,
            CorpusArg::Uploaded => CorpusKind::Uploaded,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReferenceCorpus {
    Regulations,
    Policies,
}

impl From<ReferenceCorpus> for CorpusKind {
    fn from(arg: ReferenceCorpus) -> Self {
        match arg {
            ReferenceCorpus::Regulations => CorpusKind::Regulations,
            ReferenceCorpus::Policies => CorpusKind::Policies,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Segment { ref input, corpus } => segment(input, corpus.into()),
        Commands::Stats { ref inputs, corpus } => stats(inputs, corpus.into()),
        Commands::Ingest {
            ref inputs,
            corpus,
            language,
            ref manifest,
            ref documents_dir,
        } => {
            let pipeline = open_pipeline(&cli).await?;
            match manifest {
                Some(manifest) => {
                    ingest_manifest(&pipeline, manifest, documents_dir.as_deref(), corpus.into()).await
                }
                None => ingest(&pipeline, inputs, corpus.into(), language).await,
            }
        }
        Commands::Check {
            ref input,
            ref output_dir,
        } => {
            let pipeline = open_pipeline(&cli).await?;
            check(&pipeline, input, output_dir).await
        }
        Commands::Collections => {
            let pipeline = open_pipeline(&cli).await?;
            for collection in pipeline.store().list_collections().await {
                println!("{:<24} {:>8} entries", collection.name, collection.count);
            }
            Ok(())
        }
    }
}

async fn open_pipeline(cli: &Cli) -> Result<CompliancePipeline> {
    let mut config = CorpusConfig::from_env()?;
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(top_k) = cli.top_k {
        config.top_k = top_k;
    }
    if let Some(distance) = cli.distance {
        config.distance = distance;
    }

    let pipeline = if cli.offline {
        CompliancePipeline::open_offline(EngineConfig::default(), config).await?
    } else {
        CompliancePipeline::open(EngineConfig::default(), config).await?
    };
    Ok(pipeline)
}

/// Text of a PDF (via the extractor) or of any other file read as UTF-8
fn read_document(path: &Path) -> Result<String> {
    if is_pdf(path) {
        let extracted = PdfTextExtractor::extract_path(path)
            .with_context(|| format!("failed to extract {}", path.display()))?;
        return Ok(extracted.full_text());
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Expand directories into their PDFs, sorted by name
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut pdfs: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("failed to list {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_pdf(path))
                .collect();
            pdfs.sort();
            if pdfs.is_empty() {
                warn!(dir = %input.display(), "No PDF files found");
            }
            files.extend(pdfs);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn segment(input: &Path, corpus: CorpusKind) -> Result<()> {
    let engine = ComplianceEngine::default();
    let text = read_document(input)?;
    let chunks = engine.build_chunks(&document_name(input), &text, corpus)?;
    println!("{}", serde_json::to_string_pretty(&chunks)?);
    Ok(())
}

fn stats(inputs: &[PathBuf], corpus: CorpusKind) -> Result<()> {
    let engine = ComplianceEngine::default();
    let mut chunks = Vec::new();

    for path in collect_inputs(inputs)? {
        let text = read_document(&path)?;
        match engine.build_chunks(&document_name(&path), &text, corpus) {
            Ok(document_chunks) => chunks.extend(document_chunks),
            Err(e) => warn!(document = %path.display(), error = %e, "Skipping document"),
        }
    }

    println!("{}", serde_json::to_string_pretty(&engine.statistics(&chunks))?);
    Ok(())
}

async fn ingest(
    pipeline: &CompliancePipeline,
    inputs: &[PathBuf],
    corpus: CorpusKind,
    language: Language,
) -> Result<()> {
    let files = collect_inputs(inputs)?;
    if files.is_empty() {
        bail!("no documents to ingest");
    }

    let mut total_chunks = 0;
    for path in &files {
        let summary = pipeline
            .ingest_file(path, corpus, language)
            .await
            .with_context(|| format!("failed to ingest {}", path.display()))?;
        println!("{:<40} {:>5} chunks", summary.document, summary.chunks);
        total_chunks += summary.chunks;
    }

    let stored = pipeline.store().count(corpus.collection_name()).await?;
    info!(corpus = %corpus, documents = files.len(), chunks = total_chunks, stored, "Ingestion complete");
    println!("{} now holds {} chunks", corpus.collection_name(), stored);
    Ok(())
}

async fn ingest_manifest(
    pipeline: &CompliancePipeline,
    manifest_path: &Path,
    documents_dir: Option<&Path>,
    corpus: CorpusKind,
) -> Result<()> {
    let mut manifest = DocumentManifest::from_path(manifest_path)
        .with_context(|| format!("failed to read manifest {}", manifest_path.display()))?;
    if let Some(dir) = documents_dir {
        manifest = manifest.with_base_dir(dir);
    }

    let outcome = pipeline.ingest_manifest(&manifest, corpus).await;
    for summary in &outcome.ingested {
        println!(
            "{:<40} {:>5} chunks ({})",
            summary.document, summary.chunks, summary.language
        );
    }
    for failed in &outcome.failed {
        println!("{:<40} FAILED: {}", failed.document, failed.error);
    }
    println!(
        "{} ingested, {} failed, {} inactive skipped",
        outcome.ingested.len(),
        outcome.failed.len(),
        outcome.inactive
    );

    let stored = pipeline.store().count(corpus.collection_name()).await.unwrap_or(0);
    println!("{} now holds {} chunks", corpus.collection_name(), stored);

    if outcome.ingested.is_empty() && !outcome.failed.is_empty() {
        bail!("no manifest document could be ingested");
    }
    Ok(())
}

async fn check(pipeline: &CompliancePipeline, input: &Path, output_dir: &Path) -> Result<()> {
    let document = document_name(input);
    let outcome = if is_pdf(input) {
        pipeline.check_pdf(input).await?
    } else {
        let text = read_document(input)?;
        pipeline.check_text(&document, &text).await?
    };

    let (compliance_path, correction_path) = write_reports(&outcome, input, output_dir)?;
    print_summary(&outcome);
    println!();
    println!("Compliance report: {}", compliance_path.display());
    println!("Correction report: {}", correction_path.display());
    Ok(())
}

fn write_reports(outcome: &CheckOutcome, input: &Path, output_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());

    let compliance_path = output_dir.join(format!("{}_compliance_report.json", stem));
    let correction_path = output_dir.join(format!("{}_correction_report.json", stem));
    fs::write(&compliance_path, serde_json::to_string_pretty(&outcome.report)?)?;
    fs::write(&correction_path, serde_json::to_string_pretty(&outcome.corrections)?)?;

    Ok((compliance_path, correction_path))
}

fn print_summary(outcome: &CheckOutcome) {
    let report = &outcome.report;
    let corrections = &outcome.corrections;

    println!("Document:   {}", report.document);
    println!("Chunks:     {}", outcome.chunks.len());
    println!(
        "Status:     {} ({:.2})",
        report.overall_status, report.overall_compliance_score
    );
    for (label, section) in [
        ("Regulations", &report.regulation_compliance),
        ("Policies", &report.policy_compliance),
    ] {
        match &section.error {
            Some(error) => println!("{:<11} unavailable: {}", format!("{}:", label), error),
            None => println!(
                "{:<11} {:.2} ({} violations)",
                format!("{}:", label),
                section.score,
                section.total_violations
            ),
        }
    }
    println!(
        "Corrections: {} (critical {}, high {}, medium {})",
        corrections.total_corrections_needed,
        corrections.summary.critical_count,
        corrections.summary.high_count,
        corrections.summary.medium_count
    );
    for item in corrections.all_corrections() {
        println!("  [{}] section {}: {}", item.severity, item.section, item.action_required);
    }
}
