//! Run configuration
//!
//! Values come from an optional TOML file; CLI flags override them.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::augment::AugmentOptions;
use crate::engine::DEFAULT_SAMPLE_RATE;
use crate::error::{AugmentError, Result};

/// Default number of variants requested per source file
pub const DEFAULT_AUGMENTATIONS_PER_FILE: usize = 5;

/// Augmentation settings
///
/// ```toml
/// sample_rate = 22050
/// augmentations_per_file = 5
/// seed = 42
/// jobs = 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AugmentConfig {
    /// Rate sources are resampled to on load
    pub sample_rate: u32,
    /// Requested variants per source; capped at the catalog size
    pub augmentations_per_file: usize,
    /// Seed for selection and randomized transforms; entropy if unset
    pub seed: Option<u64>,
    /// Worker threads per class directory
    pub jobs: usize,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            augmentations_per_file: DEFAULT_AUGMENTATIONS_PER_FILE,
            seed: None,
            jobs: 1,
        }
    }
}

impl AugmentConfig {
    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| AugmentError::Config {
            reason: format!("parse TOML failed: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AugmentError::io(path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AugmentError::Config {
                reason: "sample_rate must be greater than 0".to_string(),
            });
        }
        if self.jobs == 0 {
            return Err(AugmentError::Config {
                reason: "jobs must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn options(&self) -> AugmentOptions {
        AugmentOptions {
            sample_rate: self.sample_rate,
            augmentations_per_file: self.augmentations_per_file,
        }
    }

    /// Random source for a run: seeded if configured, OS entropy otherwise
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
