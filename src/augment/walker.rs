//! Directory Walker / Stats Aggregator
//!
//! Mirrors `input/<class>/<file>` into `output/<class>/` and counts what
//! each class grew to. Classes are visited in sorted order. Within a class,
//! every file gets its own RNG drawn from the master RNG before any work
//! starts, so a seeded run produces the same files with any worker count.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{info, warn};

use crate::augment::catalog::Catalog;
use crate::augment::file::{augment_file, AugmentOptions, AugmentationOutcome};
use crate::augment::report::{BatchReport, ClassStats, FailureRecord};
use crate::engine::is_supported_source;
use crate::error::{AugmentError, Result};

/// Walks class directories and augments every recognized source file
pub struct DirectoryWalker<'a> {
    catalog: &'a Catalog,
    options: AugmentOptions,
    jobs: usize,
}

impl<'a> DirectoryWalker<'a> {
    pub fn new(catalog: &'a Catalog, options: AugmentOptions) -> Self {
        Self {
            catalog,
            options,
            jobs: 1,
        }
    }

    /// Process the files of one class on up to `jobs` threads
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Augment every class directory under `input_root` into `output_root`
    ///
    /// # Errors
    /// * `Io` - the output root cannot be created or the input root cannot
    ///   be listed. A class that cannot be listed or mirrored is reported
    ///   and skipped.
    pub fn run(
        &self,
        input_root: &Path,
        output_root: &Path,
        rng: &mut dyn RngCore,
    ) -> Result<BatchReport> {
        fs::create_dir_all(output_root).map_err(|e| AugmentError::io(output_root, e))?;

        let mut report = BatchReport::default();

        for class_dir in list_class_dirs(input_root)? {
            let class_name = match class_dir.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            info!(class = %class_name, "Processing class");

            let output_class_dir = output_root.join(&class_name);
            if let Err(e) = fs::create_dir_all(&output_class_dir) {
                let err = AugmentError::io(&output_class_dir, e);
                warn!(class = %class_name, error = %err, "Skipping class");
                report.failures.push(FailureRecord::from(&err));
                continue;
            }

            let audio_files = match list_audio_files(&class_dir) {
                Ok(files) => files,
                Err(err) => {
                    warn!(class = %class_name, error = %err, "Skipping class");
                    report.failures.push(FailureRecord::from(&err));
                    continue;
                }
            };
            for stem in shared_stems(&audio_files) {
                warn!(
                    class = %class_name,
                    stem = %stem,
                    "Several sources share a stem; later outputs overwrite earlier ones"
                );
            }
            if audio_files.is_empty() {
                let err = AugmentError::EmptyClass {
                    class: class_name.clone(),
                    path: class_dir.clone(),
                };
                warn!(class = %class_name, "{}", err);
                report.failures.push(FailureRecord::from(&err));
                continue;
            }

            let outcomes = self.augment_class(&audio_files, &output_class_dir, rng);

            let total_created: usize = outcomes.iter().map(AugmentationOutcome::len).sum();
            for outcome in &outcomes {
                report
                    .failures
                    .extend(outcome.failures.iter().map(FailureRecord::from));
            }

            let stats = ClassStats::new(audio_files.len(), total_created);
            info!(
                "Class {}: {} -> {} files ({:.1}x)",
                class_name, stats.original_files, stats.augmented_files, stats.increase_factor
            );
            report.classes.insert(class_name, stats);
        }

        Ok(report)
    }

    /// Run the file augmenter over one class, outcomes in file order
    fn augment_class(
        &self,
        files: &[PathBuf],
        dest: &Path,
        rng: &mut dyn RngCore,
    ) -> Vec<AugmentationOutcome> {
        let seeds: Vec<u64> = files.iter().map(|_| rng.next_u64()).collect();

        if self.jobs <= 1 || files.len() <= 1 {
            return files
                .iter()
                .zip(seeds)
                .map(|(file, seed)| self.augment_one(file, dest, seed))
                .collect();
        }

        let workers = self.jobs.min(files.len());
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            for worker in 0..workers {
                let tx = tx.clone();
                let work: Vec<(usize, &PathBuf, u64)> = files
                    .iter()
                    .zip(seeds.iter().copied())
                    .enumerate()
                    .skip(worker)
                    .step_by(workers)
                    .map(|(idx, (file, seed))| (idx, file, seed))
                    .collect();

                scope.spawn(move || {
                    for (idx, file, seed) in work {
                        // The receiver outlives the scope
                        let _ = tx.send((idx, self.augment_one(file, dest, seed)));
                    }
                });
            }
        });
        drop(tx);

        let mut results: Vec<(usize, AugmentationOutcome)> = rx.into_iter().collect();
        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, outcome)| outcome).collect()
    }

    fn augment_one(&self, file: &Path, dest: &Path, seed: u64) -> AugmentationOutcome {
        let mut file_rng = StdRng::seed_from_u64(seed);
        augment_file(file, dest, &self.options, self.catalog, &mut file_rng)
    }
}

/// Augment a directory tree sequentially with the given catalog
pub fn augment_directory(
    input_root: &Path,
    output_root: &Path,
    options: &AugmentOptions,
    catalog: &Catalog,
    rng: &mut dyn RngCore,
) -> Result<BatchReport> {
    DirectoryWalker::new(catalog, *options).run(input_root, output_root, rng)
}

/// Immediate subdirectories of `root`, sorted by name
fn list_class_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(root).map_err(|e| AugmentError::io(root, e))? {
        let entry = entry.map_err(|e| AugmentError::io(root, e))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Recognized audio files directly inside `dir`, sorted by name
fn list_audio_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| AugmentError::io(dir, e))? {
        let entry = entry.map_err(|e| AugmentError::io(dir, e))?;
        let path = entry.path();
        if path.is_file() && is_supported_source(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Stems used by more than one source file, sorted
fn shared_stems(files: &[PathBuf]) -> Vec<String> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for file in files {
        if let Some(stem) = file.file_stem() {
            *counts.entry(stem.to_string_lossy().into_owned()).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(stem, _)| stem)
        .collect()
}
