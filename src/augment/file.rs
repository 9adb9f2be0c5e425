//! File Augmenter
//!
//! Loads one source recording, writes its untransformed copy, then writes
//! one variant per selected transform. A failed variant never stops the
//! others; a failed load produces no output at all.

use std::path::{Path, PathBuf};

use rand::RngCore;
use tracing::{error, info, warn};

use crate::augment::catalog::{Catalog, TransformSpec};
use crate::augment::planner;
use crate::engine::{load_audio, write_wav, Waveform, OUTPUT_EXTENSION};
use crate::error::AugmentError;

/// Suffix of the untransformed copy
pub const ORIGINAL_SUFFIX: &str = "original";

/// Options shared by the single-file and directory entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AugmentOptions {
    /// Rate sources are resampled to on load
    pub sample_rate: u32,
    /// Requested variants per source; capped at the catalog size
    pub augmentations_per_file: usize,
}

/// What one source file produced
#[derive(Debug, Default)]
pub struct AugmentationOutcome {
    pub source: PathBuf,
    /// Paths actually written, original copy first
    pub written: Vec<PathBuf>,
    /// Failures, in the order they happened
    pub failures: Vec<AugmentError>,
}

impl AugmentationOutcome {
    fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// True if the source could not be loaded
    pub fn load_failed(&self) -> bool {
        self.failures
            .iter()
            .any(|e| matches!(e, AugmentError::Load { .. }))
    }
}

/// Output path for `stem` with the given suffix
pub fn output_path(dest_dir: &Path, stem: &str, suffix: &str) -> PathBuf {
    dest_dir.join(format!("{}_{}.{}", stem, suffix, OUTPUT_EXTENSION))
}

/// Augment one source file into `dest_dir`
pub fn augment_file(
    source: &Path,
    dest_dir: &Path,
    options: &AugmentOptions,
    catalog: &Catalog,
    rng: &mut dyn RngCore,
) -> AugmentationOutcome {
    let mut outcome = AugmentationOutcome::new(source);

    let audio = match load_audio(source, options.sample_rate) {
        Ok(audio) => audio,
        Err(e) => {
            error!(path = %source.display(), error = %e, "Error augmenting file");
            outcome.failures.push(e);
            return outcome;
        }
    };

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());

    let original_path = output_path(dest_dir, &stem, ORIGINAL_SUFFIX);
    match write_wav(&audio, &original_path) {
        Ok(()) => outcome.written.push(original_path),
        Err(e) => {
            error!(path = %source.display(), error = %e, "Failed to write original copy");
            outcome.failures.push(e);
        }
    }

    for spec in planner::select(catalog, options.augmentations_per_file, rng) {
        let variant_path = output_path(dest_dir, &stem, &spec.name);
        match write_variant(&audio, spec, source, &variant_path, rng) {
            Ok(()) => outcome.written.push(variant_path),
            Err(e) => {
                warn!(
                    transform = %spec.name,
                    file = %source.display(),
                    error = %e,
                    "Error applying augmentation"
                );
                outcome.failures.push(e);
            }
        }
    }

    info!(
        file = %source.display(),
        created = outcome.written.len(),
        "Augmented file"
    );
    outcome
}

/// Apply one transform to the loaded audio and write the result
fn write_variant(
    audio: &Waveform,
    spec: &TransformSpec,
    source: &Path,
    path: &Path,
    rng: &mut dyn RngCore,
) -> Result<(), AugmentError> {
    let transform_err = |reason: String| AugmentError::Transform {
        transform: spec.name.clone(),
        path: source.to_path_buf(),
        reason,
    };

    let variant = spec.apply(audio, rng).map_err(|e| transform_err(e.to_string()))?;
    if variant.is_empty() {
        return Err(transform_err("produced no samples".to_string()));
    }
    if !variant.is_finite() {
        return Err(transform_err("produced non-finite samples".to_string()));
    }

    write_wav(&variant, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::augment::catalog::{TransformKind, TransformSpec};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn options(per_file: usize) -> AugmentOptions {
        AugmentOptions {
            sample_rate: 22050,
            augmentations_per_file: per_file,
        }
    }

    fn write_source(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        write_wav(&Waveform::sine(500.0, 0.3, 0.4, 22050), &path).unwrap();
        path
    }

    #[test]
    fn test_original_first_then_variants() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = write_source(src.path(), "bark_01.wav");
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = augment_file(&source, out.path(), &options(3), &Catalog::standard(), &mut rng);

        assert_eq!(outcome.len(), 4);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.written[0], out.path().join("bark_01_original.wav"));
        for path in &outcome.written {
            assert!(path.exists(), "{} missing", path.display());
        }
    }

    #[test]
    fn test_variant_names_follow_selection() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = write_source(src.path(), "chirp.wav");
        let catalog = Catalog::standard();

        let mut rng = StdRng::seed_from_u64(8);
        let outcome = augment_file(&source, out.path(), &options(4), &catalog, &mut rng);

        let mut replay = StdRng::seed_from_u64(8);
        let expected: Vec<PathBuf> = planner::select(&catalog, 4, &mut replay)
            .iter()
            .map(|s| output_path(out.path(), "chirp", &s.name))
            .collect();
        assert_eq!(&outcome.written[1..], expected.as_slice());
    }

    #[test]
    fn test_zero_requested_keeps_original() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = write_source(src.path(), "a.wav");
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = augment_file(&source, out.path(), &options(0), &Catalog::standard(), &mut rng);
        assert_eq!(outcome.written, vec![out.path().join("a_original.wav")]);
    }

    #[test]
    fn test_load_failure_writes_nothing() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = src.path().join("corrupt.wav");
        std::fs::write(&source, b"junk").unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let outcome = augment_file(&source, out.path(), &options(5), &Catalog::standard(), &mut rng);

        assert!(outcome.is_empty());
        assert!(outcome.load_failed());
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failing_transform_is_isolated() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = write_source(src.path(), "owl.wav");
        let catalog = Catalog::from_specs(vec![
            TransformSpec::new("louder", TransformKind::Volume { factor: 1.5 }),
            TransformSpec::new("broken", TransformKind::Stretch { rate: -1.0 }),
            TransformSpec::new("quieter", TransformKind::Volume { factor: 0.5 }),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        let outcome = augment_file(&source, out.path(), &options(3), &catalog, &mut rng);

        assert_eq!(outcome.len(), 3);
        assert_eq!(outcome.failures.len(), 1);
        match &outcome.failures[0] {
            AugmentError::Transform { transform, .. } => assert_eq!(transform, "broken"),
            other => panic!("Expected Transform failure, got: {:?}", other),
        }
        assert!(!out.path().join("owl_broken.wav").exists());
    }

    #[test]
    fn test_non_finite_output_is_transform_failure() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = write_source(src.path(), "owl.wav");
        let catalog = Catalog::from_specs(vec![TransformSpec::new(
            "blowup",
            TransformKind::Volume { factor: f32::INFINITY },
        )])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        let outcome = augment_file(&source, out.path(), &options(1), &catalog, &mut rng);

        assert_eq!(outcome.len(), 1);
        assert_eq!(outcome.failures[0].error_code(), "TRANSFORM_FAILURE");
    }

    #[test]
    fn test_write_failure_is_isolated() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = write_source(src.path(), "frog.wav");
        // A directory squatting on the output name makes that write fail
        std::fs::create_dir(out.path().join("frog_louder.wav")).unwrap();
        let catalog = Catalog::from_specs(vec![
            TransformSpec::new("louder", TransformKind::Volume { factor: 1.5 }),
            TransformSpec::new("quieter", TransformKind::Volume { factor: 0.5 }),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        let outcome = augment_file(&source, out.path(), &options(2), &catalog, &mut rng);

        assert_eq!(outcome.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].error_code(), "WRITE_FAILURE");
    }

    #[test]
    fn test_failed_original_write_still_attempts_variants() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let source = write_source(src.path(), "frog.wav");
        std::fs::create_dir(out.path().join("frog_original.wav")).unwrap();
        let catalog = Catalog::from_specs(vec![TransformSpec::new(
            "louder",
            TransformKind::Volume { factor: 1.5 },
        )])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(4);

        let outcome = augment_file(&source, out.path(), &options(1), &catalog, &mut rng);

        assert_eq!(outcome.written, vec![out.path().join("frog_louder.wav")]);
        assert_eq!(outcome.failures[0].error_code(), "WRITE_FAILURE");
    }
}
