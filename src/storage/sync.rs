//! Dataset sync
//!
//! Moves the training corpus between local disk and an object store:
//! raw recordings down before augmentation, augmented outputs up after,
//! and trained model artifacts down for serving.

use std::path::Path;

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::engine::{has_extension, is_supported_source, OUTPUT_EXTENSION};
use crate::storage::{ObjectStore, StorageError, StorageResult};

/// Prefix holding raw class-labelled recordings
pub const RAW_AUDIO_PREFIX: &str = "extracted_audio/";

/// Prefix holding the augmented corpus
pub const AUGMENTED_PREFIX: &str = "augmented_audio/";

/// Prefix holding trained model artifacts
pub const MODEL_PREFIX: &str = "models/";

/// Model artifacts fetched by [`DatasetSync::download_model`]
pub const MODEL_FILES: [&str; 5] = [
    "yamnet_classifier_v2.keras",
    "class_names.json",
    "model_metadata.json",
    "performance_metrics.json",
    "training_history.pkl",
];

/// The one artifact a model download cannot do without
pub const REQUIRED_MODEL_FILE: &str = "yamnet_classifier_v2.keras";

/// Counts from a bulk transfer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub transferred: usize,
    pub failed: usize,
}

/// Dataset transfers over a borrowed object store
pub struct DatasetSync<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ObjectStore + ?Sized> DatasetSync<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Download raw `.wav`/`.mp3` recordings into `local_dir/<class>/...`
    pub fn download_raw_audio(&self, local_dir: &Path) -> StorageResult<usize> {
        create_local_dir(local_dir)?;
        info!(
            store = %self.store.describe(),
            prefix = RAW_AUDIO_PREFIX,
            "Downloading extracted audio"
        );

        let mut count = 0;
        for key in self.store.list(RAW_AUDIO_PREFIX)? {
            if key.ends_with('/') || !is_supported_source(Path::new(&key)) {
                continue;
            }

            let relative = key.strip_prefix(RAW_AUDIO_PREFIX).unwrap_or(&key);
            let target_dir = match Path::new(relative).parent() {
                Some(parent) => local_dir.join(parent),
                None => local_dir.to_path_buf(),
            };
            debug!(key = %key, dest = %target_dir.display(), "Downloading");
            self.store.download(&key, &target_dir)?;
            count += 1;
        }

        info!(count, "Downloaded extracted audio files");
        Ok(count)
    }

    /// Upload every `.wav` under `local_dir` to `augmented_audio/<relative>`
    ///
    /// Individual upload failures are logged and counted, not fatal.
    pub fn upload_augmented(&self, local_dir: &Path) -> StorageResult<SyncSummary> {
        if !local_dir.is_dir() {
            return Err(StorageError::Local {
                path: local_dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
            });
        }

        let wav_files: Vec<_> = WalkDir::new(local_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| has_extension(entry.path(), OUTPUT_EXTENSION))
            .collect();
        info!(count = wav_files.len(), "Found audio files to upload");

        let mut summary = SyncSummary::default();
        for entry in wav_files {
            let Ok(relative) = entry.path().strip_prefix(local_dir) else {
                continue;
            };
            let key = format!(
                "{}{}",
                AUGMENTED_PREFIX,
                relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/")
            );

            match self.store.upload(entry.path(), &key) {
                Ok(()) => summary.transferred += 1,
                Err(e) => {
                    error!(key = %key, error = %e, "Upload failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            uploaded = summary.transferred,
            failed = summary.failed,
            "Uploaded augmented corpus"
        );
        Ok(summary)
    }

    /// Keys of augmented `.wav` files
    pub fn list_augmented(&self) -> StorageResult<Vec<String>> {
        Ok(self
            .store
            .list(AUGMENTED_PREFIX)?
            .into_iter()
            .filter(|key| has_extension(Path::new(key), OUTPUT_EXTENSION))
            .collect())
    }

    /// Fetch model artifacts into `local_dir`
    ///
    /// Missing optional artifacts are warnings. Any failure on the
    /// classifier weights fails the whole download.
    pub fn download_model(&self, local_dir: &Path) -> StorageResult<usize> {
        create_local_dir(local_dir)?;
        info!(dir = %local_dir.display(), "Downloading model files");

        let mut count = 0;
        for file_name in MODEL_FILES {
            let key = format!("{}{}", MODEL_PREFIX, file_name);
            let required = file_name == REQUIRED_MODEL_FILE;

            match self.store.download(&key, local_dir) {
                Ok(_) => {
                    info!(file = file_name, "Downloaded model artifact");
                    count += 1;
                }
                Err(e) if e.is_not_found() => {
                    warn!(key = %key, "File not found in object store");
                    if required {
                        return Err(e);
                    }
                }
                Err(e) => {
                    error!(key = %key, error = %e, "Error downloading model artifact");
                    if required {
                        return Err(e);
                    }
                }
            }
        }

        info!(count, "Model download complete");
        Ok(count)
    }
}

fn create_local_dir(dir: &Path) -> StorageResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| StorageError::Local {
        path: dir.to_path_buf(),
        source: e,
    })
}
