//! Augmentation pipeline
//!
//! Catalog → Planner → File Augmenter → Directory Walker, leaves first.

pub mod catalog;
pub mod file;
pub mod planner;
pub mod report;
pub mod walker;

pub use catalog::{Catalog, TransformKind, TransformSpec};
pub use file::{augment_file, output_path, AugmentOptions, AugmentationOutcome, ORIGINAL_SUFFIX};
pub use planner::select;
pub use report::{BatchReport, ClassStats, FailureRecord};
pub use walker::{augment_directory, DirectoryWalker};
