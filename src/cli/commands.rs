//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::augment::{augment_file, BatchReport, Catalog, DirectoryWalker};
use crate::cli::{Cli, Commands, ConfigOverrides};
use crate::config::AugmentConfig;
use crate::storage::{DatasetSync, LocalObjectStore, ObjectStore};

/// Run the parsed command
///
/// Only the augment commands load settings, so a broken config file does
/// not get in the way of catalog or storage commands.
pub fn handle_command(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let overrides = &cli.overrides;

    match cli.command {
        Commands::AugmentFile { source, output_dir } => {
            let config = resolve_config(config_path, overrides)?;
            augment_single(&config, &source, &output_dir)
        }
        Commands::AugmentDir {
            input_root,
            output_root,
            report,
        } => {
            let config = resolve_config(config_path, overrides)?;
            augment_dir(&config, &input_root, &output_root, report.as_deref())
        }
        Commands::Catalog => show_catalog(),
        Commands::Pull { bucket, local_dir } => pull(&bucket, &local_dir),
        Commands::Push { bucket, local_dir } => push(&bucket, &local_dir),
        Commands::ListRemote { bucket } => list_remote(&bucket),
        Commands::PullModel { bucket, local_dir } => pull_model(&bucket, &local_dir),
    }
}

/// Build the effective config: file (or defaults), then CLI overrides.
pub fn resolve_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<AugmentConfig> {
    let mut config = match path {
        Some(path) => AugmentConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AugmentConfig::default(),
    };

    if let Some(rate) = overrides.sample_rate {
        config.sample_rate = rate;
    }
    if let Some(per_file) = overrides.augmentations_per_file {
        config.augmentations_per_file = per_file;
    }
    if let Some(seed) = overrides.seed {
        config.seed = Some(seed);
    }
    if let Some(jobs) = overrides.jobs {
        config.jobs = jobs;
    }

    config.validate()?;
    Ok(config)
}

/// Augment one file into `output_dir`.
pub fn augment_single(config: &AugmentConfig, source: &Path, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let catalog = Catalog::standard();
    let mut rng = config.rng();
    let outcome = augment_file(source, output_dir, &config.options(), &catalog, &mut rng);

    if outcome.load_failed() {
        bail!("Could not load {}", source.display());
    }

    println!("Created {} files from {}", outcome.len(), source.display());
    for path in &outcome.written {
        println!("  {}", path.display());
    }
    for failure in &outcome.failures {
        println!("  skipped: {}", failure);
    }

    Ok(())
}

/// Report file layout: the batch report plus run metadata.
#[derive(Serialize)]
struct ReportFile<'a> {
    generated_at: String,
    config: &'a AugmentConfig,
    #[serde(flatten)]
    report: &'a BatchReport,
}

/// Augment a class-labelled directory tree.
pub fn augment_dir(
    config: &AugmentConfig,
    input_root: &Path,
    output_root: &Path,
    report_path: Option<&Path>,
) -> Result<()> {
    info!(
        input = %input_root.display(),
        output = %output_root.display(),
        per_file = config.augmentations_per_file,
        "Augmenting directory"
    );

    let catalog = Catalog::standard();
    let mut rng = config.rng();
    let report = DirectoryWalker::new(&catalog, config.options())
        .with_jobs(config.jobs)
        .run(input_root, output_root, &mut rng)
        .with_context(|| format!("Failed to augment {}", input_root.display()))?;

    print_report(&report);

    if let Some(path) = report_path {
        let file = ReportFile {
            generated_at: Utc::now().to_rfc3339(),
            config,
            report: &report,
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn print_report(report: &BatchReport) {
    println!("Augmentation results:");
    println!("{:-<60}", "");
    for (class, stats) in &report.classes {
        println!(
            "{:<30} {:>6} -> {:>6} ({:.1}x)",
            class, stats.original_files, stats.augmented_files, stats.increase_factor
        );
    }
    println!("{:-<60}", "");

    let totals = report.totals();
    println!(
        "{:<30} {:>6} -> {:>6} ({:.1}x)",
        "total", totals.original_files, totals.augmented_files, totals.increase_factor
    );
    if !report.failures.is_empty() {
        println!("{} recoverable failures (see log)", report.failures.len());
    }
}

/// Print the standard catalog.
pub fn show_catalog() -> Result<()> {
    let catalog = Catalog::standard();
    println!("Transform catalog ({} entries):", catalog.len());
    for spec in catalog.iter() {
        println!("  {:<20} {}", spec.name, serde_json::to_string(&spec.kind)?);
    }
    Ok(())
}

/// Download raw recordings.
pub fn pull(bucket: &Path, local_dir: &Path) -> Result<()> {
    let store = LocalObjectStore::new(bucket);
    let count = DatasetSync::new(&store)
        .download_raw_audio(local_dir)
        .with_context(|| format!("Download from {} failed", store.describe()))?;
    println!("Downloaded {} recordings to {}", count, local_dir.display());
    Ok(())
}

/// Upload an augmented corpus.
pub fn push(bucket: &Path, local_dir: &Path) -> Result<()> {
    let store = LocalObjectStore::new(bucket);
    let summary = DatasetSync::new(&store)
        .upload_augmented(local_dir)
        .with_context(|| format!("Upload to {} failed", store.describe()))?;
    println!(
        "Uploaded {} files ({} failed) to {}",
        summary.transferred,
        summary.failed,
        store.describe()
    );
    if summary.failed > 0 {
        bail!("{} uploads failed", summary.failed);
    }
    Ok(())
}

/// List augmented keys.
pub fn list_remote(bucket: &Path) -> Result<()> {
    let store = LocalObjectStore::new(bucket);
    let keys = DatasetSync::new(&store).list_augmented()?;
    for key in &keys {
        println!("{}", key);
    }
    println!("{} augmented files", keys.len());
    Ok(())
}

/// Download model artifacts.
pub fn pull_model(bucket: &Path, local_dir: &Path) -> Result<()> {
    let store = LocalObjectStore::new(bucket);
    let count = DatasetSync::new(&store)
        .download_model(local_dir)
        .context("Required model artifact unavailable")?;
    println!("Downloaded {} model files to {}", count, local_dir.display());
    Ok(())
}
