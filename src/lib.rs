//! EcoSight Augment - Audio Augmentation Engine
//!
//! Expands a small labelled corpus of short recordings into a larger
//! training corpus. Each source file keeps its class directory and gains
//! a set of perturbed variants.
//!
//! # Architecture
//!
//! - `dsp`: pure waveform transforms (stretch, pitch, noise, shift, volume)
//! - `augment`: the named catalog, per-file planner and augmenter, and the
//!   class directory walker with per-class stats
//! - `engine`: waveform type and audio file I/O
//! - `storage`: object store connector used by dataset sync tooling

pub mod augment;
pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod storage;

pub use augment::{
    augment_directory, augment_file, AugmentOptions, AugmentationOutcome, BatchReport, Catalog,
    ClassStats, DirectoryWalker,
};
pub use config::AugmentConfig;
pub use engine::Waveform;
pub use error::{AugmentError, Result};
