//! Per-class statistics and batch reports

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AugmentError;

/// Growth of one class directory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassStats {
    /// Source files found in the class directory
    pub original_files: usize,
    /// Output files written, original copies included
    pub augmented_files: usize,
    /// `augmented_files / original_files`, or 0 with no originals
    pub increase_factor: f64,
}

impl ClassStats {
    pub fn new(original_files: usize, augmented_files: usize) -> Self {
        let increase_factor = if original_files > 0 {
            augmented_files as f64 / original_files as f64
        } else {
            0.0
        };
        Self {
            original_files,
            augmented_files,
            increase_factor,
        }
    }
}

/// A failure flattened for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub code: String,
    pub message: String,
}

impl From<&AugmentError> for FailureRecord {
    fn from(err: &AugmentError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result of a directory walk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Stats per class label, sorted by label
    pub classes: BTreeMap<String, ClassStats>,
    /// Every recoverable failure met during the walk
    pub failures: Vec<FailureRecord>,
}

impl BatchReport {
    /// Stats summed across all classes
    pub fn totals(&self) -> ClassStats {
        let (originals, augmented) = self
            .classes
            .values()
            .fold((0, 0), |(o, a), s| (o + s.original_files, a + s.augmented_files));
        ClassStats::new(originals, augmented)
    }

    /// Failures with the given error code
    pub fn failures_with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a FailureRecord> {
        self.failures.iter().filter(move |f| f.code == code)
    }
}
