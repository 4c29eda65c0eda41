//! # CLI Module
//!
//! Command-line interface for the photo curation engine.
//!
//! Feature extraction happens elsewhere; `analyze` takes its output as a
//! JSON array of photo records and does the grouping, filtering and
//! ranking.
//!
//! ## Usage
//! ```bash
//! # Group and rank pre-analysed photos
//! photo-curate analyze records.json
//!
//! # Looser duplicates, hash-only similarity
//! photo-curate analyze records.json --duplicate-threshold 0.8 --no-embeddings
//!
//! # JSON output
//! photo-curate analyze records.json --output json
//!
//! # Perceptual hashes of image files
//! photo-curate hash ~/Photos/IMG_0001.jpg --algorithm perceptual
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use photo_curation::core::duplicates::EuclideanMetric;
use photo_curation::core::hasher::{compute_hash, HashAlgorithmKind};
use photo_curation::core::model::{Group, PhotoRecord};
use photo_curation::core::pipeline::{CancellationToken, ScanResult, ScanSession};
use photo_curation::core::ranker::{BestPhotoRanker, GroupRanking, RankingPreset};
use photo_curation::core::similar::SimilarConfig;
use photo_curation::error::{InputError, Result};
use photo_curation::events::{AnalysisEvent, Event, EventChannel, PipelineEvent};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::thread;

/// Photo Curation - find duplicates, group look-alikes, keep the best
#[derive(Parser, Debug)]
#[command(name = "photo-curate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Group and rank pre-analysed photo records
    Analyze {
        /// JSON file with an array of photo records
        records: PathBuf,

        /// Fingerprint distance for duplicates (0.1-1.0)
        #[arg(long, default_value = "0.5")]
        duplicate_threshold: f32,

        /// Hash distance for similar photos (1-32 of 64 bits)
        #[arg(long, default_value = "8")]
        hash_threshold: u32,

        /// Minimum embedding cosine similarity (0-1)
        #[arg(long, default_value = "0.85")]
        embedding_threshold: f32,

        /// Group similar photos on hashes alone
        #[arg(long)]
        no_embeddings: bool,

        /// Ranking weights
        #[arg(short, long, default_value = "balanced")]
        preset: Preset,

        /// Composite quality below which a photo is reported (0-1)
        #[arg(long, default_value = "0.3")]
        low_quality_threshold: f64,

        /// Photos per batch
        #[arg(long, default_value = "50")]
        batch_size: usize,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print perceptual hashes of image files
    Hash {
        /// Images to hash
        #[arg(required = true)]
        images: Vec<PathBuf>,

        /// Hash algorithm; every algorithm when omitted
        #[arg(short, long)]
        algorithm: Option<Algorithm>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    /// Average Hash - Fastest
    Average,
    /// Difference Hash - Good balance
    Difference,
    /// Perceptual Hash - Most robust to edits
    Perceptual,
}

impl From<Algorithm> for HashAlgorithmKind {
    fn from(algo: Algorithm) -> Self {
        match algo {
            Algorithm::Average => HashAlgorithmKind::Average,
            Algorithm::Difference => HashAlgorithmKind::Difference,
            Algorithm::Perceptual => HashAlgorithmKind::Perceptual,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Quality first, every criterion counts
    Balanced,
    /// Aesthetic quality dominates
    QualityFocused,
    /// Largest photo wins
    ResolutionFocused,
    /// Newest photo wins
    RecencyFocused,
}

impl From<Preset> for RankingPreset {
    fn from(preset: Preset) -> Self {
        match preset {
            Preset::Balanced => RankingPreset::Balanced,
            Preset::QualityFocused => RankingPreset::QualityFocused,
            Preset::ResolutionFocused => RankingPreset::ResolutionFocused,
            Preset::RecencyFocused => RankingPreset::RecencyFocused,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (deletion candidates only)
    Minimal,
}

/// Options for one `analyze` run
struct AnalyzeOptions {
    duplicate_threshold: f32,
    similar: SimilarConfig,
    preset: RankingPreset,
    low_quality_threshold: f64,
    batch_size: usize,
    output: OutputFormat,
    verbose: bool,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            records,
            duplicate_threshold,
            hash_threshold,
            embedding_threshold,
            no_embeddings,
            preset,
            low_quality_threshold,
            batch_size,
            output,
            verbose,
        } => run_analyze(
            &records,
            AnalyzeOptions {
                duplicate_threshold,
                similar: SimilarConfig::new()
                    .with_hash_threshold(hash_threshold)
                    .with_embedding_threshold(embedding_threshold)
                    .with_embeddings(!no_embeddings),
                preset: preset.into(),
                low_quality_threshold,
                batch_size,
                output,
                verbose,
            },
        ),
        Commands::Hash { images, algorithm } => run_hash(&images, algorithm.map(Into::into)),
    }
}

/// Read a JSON array of photo records
fn load_records(path: &Path) -> std::result::Result<Vec<PhotoRecord>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|e| InputError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn run_analyze(path: &Path, options: AnalyzeOptions) -> Result<()> {
    let term = Term::stderr();
    let records = load_records(path)?;

    // Print header
    if matches!(options.output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Photo Curation").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let session = ScanSession::builder()
        .duplicate_threshold(options.duplicate_threshold)
        .similar(options.similar)
        .low_quality_threshold(options.low_quality_threshold)
        .batch_size(options.batch_size)
        .build();

    // Set up event handling
    let (sender, receiver) = EventChannel::new();

    // Progress bar for pretty output
    let progress = if matches!(options.output, OutputFormat::Pretty) {
        let pb = ProgressBar::new(records.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = options.verbose;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Analysis(AnalysisEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Analysis(AnalysisEvent::PhotoDegraded { photo_id, message }) => {
                    if verbose {
                        pb.println(format!("  {} {}: {}", style("!").yellow(), photo_id, message));
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Cancelled { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = session.run_records(&records, EuclideanMetric, &sender, &CancellationToken::new());

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();

    let ranker = BestPhotoRanker::with_preset(options.preset);
    let ranked = result.ranked_groups(&ranker);

    match options.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result, &ranked, options.verbose),
        OutputFormat::Json => print_json_results(&result, &ranked),
        OutputFormat::Minimal => print_minimal_results(&ranked),
    }

    Ok(())
}

fn run_hash(images: &[PathBuf], algorithm: Option<HashAlgorithmKind>) -> Result<()> {
    let algorithms = match algorithm {
        Some(kind) => vec![kind],
        None => vec![
            HashAlgorithmKind::Perceptual,
            HashAlgorithmKind::Average,
            HashAlgorithmKind::Difference,
        ],
    };

    for path in images {
        let image = image::open(path).map_err(|e| InputError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        for kind in &algorithms {
            let hash = compute_hash(&image, *kind)?;
            println!("{}\t{}\t{}", hash.to_hex(), kind, path.display());
        }
    }
    Ok(())
}

fn print_pretty_results(
    term: &Term,
    result: &ScanResult,
    ranked: &[(Group, GroupRanking)],
    verbose: bool,
) {
    let summary = &result.summary;
    term.write_line("").ok();
    term.write_line(&format!("{} Analysis Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    // Summary
    term.write_line(&format!(
        "  {} photos analysed in {:.1}s",
        style(summary.photos_analyzed).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} duplicate groups, {} similar groups",
        style(summary.duplicate_groups).cyan(),
        style(summary.similar_groups).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} low-quality photos",
        style(summary.low_quality_photos).yellow()
    ))
    .ok();
    if summary.photos_degraded > 0 {
        term.write_line(&format!(
            "  {} photos with incomplete analysis",
            style(summary.photos_degraded).dim()
        ))
        .ok();
    }
    term.write_line("").ok();

    if ranked.is_empty() {
        term.write_line(&format!("  {} No duplicates or look-alikes found!", style("🎉").green()))
            .ok();
    } else {
        term.write_line(&format!("{}", style("Groups:").bold().underlined()))
            .ok();
        term.write_line("").ok();

        for (i, (group, ranking)) in ranked.iter().enumerate() {
            term.write_line(&format!(
                "  {} {} ({} photos)",
                style(format!("Group {}:", i + 1)).bold(),
                style(group.kind).yellow(),
                group.len()
            ))
            .ok();

            for photo in &ranking.ranked {
                let marker = if photo.id == ranking.keeper_id {
                    style("★").green().to_string()
                } else {
                    style("○").dim().to_string()
                };
                term.write_line(&format!("    {} {} ({:.2})", marker, photo.id, photo.total))
                    .ok();
            }

            if verbose {
                term.write_line(&format!(
                    "    {} {}",
                    style("Why:").dim(),
                    style(ranking.explanation.human_readable()).dim()
                ))
                .ok();
            }

            term.write_line("").ok();
        }
    }

    if !result.low_quality_ids.is_empty() {
        term.write_line(&format!("{}", style("Low quality:").bold().underlined()))
            .ok();
        for id in &result.low_quality_ids {
            term.write_line(&format!("    {} {}", style("▼").red(), id)).ok();
        }
        term.write_line("").ok();
    }

    // Footer
    term.write_line(&format!(
        "{}",
        style("Remember: Nothing was deleted. Review carefully before taking action.").dim()
    ))
    .ok();
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a photo_curation::events::ScanSummary,
    groups: Vec<JsonGroup<'a>>,
    low_quality: &'a [photo_curation::core::model::PhotoId],
}

#[derive(Serialize)]
struct JsonGroup<'a> {
    group: &'a Group,
    ranking: &'a GroupRanking,
}

fn print_json_results(result: &ScanResult, ranked: &[(Group, GroupRanking)]) {
    let report = JsonReport {
        summary: &result.summary,
        groups: ranked
            .iter()
            .map(|(group, ranking)| JsonGroup { group, ranking })
            .collect(),
        low_quality: &result.low_quality_ids,
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize report: {}", e),
    }
}

/// One line per photo that is not its group's keeper
fn print_minimal_results(ranked: &[(Group, GroupRanking)]) {
    for (_, ranking) in ranked {
        for photo in ranking.ranked.iter().skip(1) {
            println!("{}", photo.id);
        }
    }
}
