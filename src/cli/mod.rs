//! CLI Module
//!
//! Command-line interface for the augmentation engine and dataset sync.

pub mod commands;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// EcoSight Augment - expand labelled audio datasets with perturbed variants
#[derive(Parser, Debug)]
#[command(name = "augment-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML file with augmentation settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ConfigOverrides,

    #[command(subcommand)]
    pub command: Commands,
}

/// Command-line values that override the config file
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Sample rate sources are resampled to
    #[arg(long, global = true, env = "AUGMENT_SAMPLE_RATE")]
    pub sample_rate: Option<u32>,

    /// Augmented variants requested per source file (max 11)
    #[arg(long = "per-file", global = true, env = "AUGMENT_PER_FILE")]
    pub augmentations_per_file: Option<usize>,

    /// Seed for reproducible selections and noise
    #[arg(long, global = true, env = "AUGMENT_SEED")]
    pub seed: Option<u64>,

    /// Worker threads per class directory
    #[arg(short, long, global = true, env = "AUGMENT_JOBS")]
    pub jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Augment a single audio file
    #[command(name = "augment-file")]
    AugmentFile {
        /// Source recording (.wav or .mp3)
        source: PathBuf,

        /// Directory the outputs are written to
        output_dir: PathBuf,
    },

    /// Augment every class directory under an input root
    #[command(name = "augment-dir")]
    AugmentDir {
        /// Root whose subdirectories are class labels
        input_root: PathBuf,

        /// Root the augmented class directories are written to
        output_root: PathBuf,

        /// Write the batch report as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// List the standard transform catalog
    #[command(name = "catalog")]
    Catalog,

    /// Download raw recordings from the bucket
    #[command(name = "pull")]
    Pull {
        /// Bucket directory
        #[arg(short, long, env = "AUGMENT_BUCKET")]
        bucket: PathBuf,

        /// Local directory for the class-labelled recordings
        local_dir: PathBuf,
    },

    /// Upload an augmented corpus to the bucket
    #[command(name = "push")]
    Push {
        /// Bucket directory
        #[arg(short, long, env = "AUGMENT_BUCKET")]
        bucket: PathBuf,

        /// Local augmented corpus root
        local_dir: PathBuf,
    },

    /// List augmented files in the bucket
    #[command(name = "list-remote")]
    ListRemote {
        /// Bucket directory
        #[arg(short, long, env = "AUGMENT_BUCKET")]
        bucket: PathBuf,
    },

    /// Download trained model artifacts from the bucket
    #[command(name = "pull-model")]
    PullModel {
        /// Bucket directory
        #[arg(short, long, env = "AUGMENT_BUCKET")]
        bucket: PathBuf,

        /// Local directory for model files
        local_dir: PathBuf,
    },
}
