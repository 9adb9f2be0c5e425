//! Object store connector
//!
//! The augmentation core never touches remote storage. Dataset tooling uses
//! an explicitly constructed [`ObjectStore`] to pull raw recordings before
//! a run and publish the augmented corpus after it.

mod local;
mod sync;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use local::LocalObjectStore;
pub use sync::{
    DatasetSync, SyncSummary, AUGMENTED_PREFIX, MODEL_FILES, MODEL_PREFIX, RAW_AUDIO_PREFIX,
    REQUIRED_MODEL_FILE,
};

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Failures reported by an object store
///
/// Callers only ever distinguish "object not found" from everything else.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {key}")]
    NotFound { key: String },

    #[error("Storage operation on {key} failed: {reason}")]
    Other {
        key: String,
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Local path error at {path}: {source}")]
    Local {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::NotFound { .. } => "STORAGE_NOT_FOUND",
            StorageError::Other { .. } => "STORAGE_ERROR",
            StorageError::Local { .. } => "LOCAL_IO_ERROR",
        }
    }
}

/// Keyed object namespace with upload, download and list
pub trait ObjectStore {
    /// Store the local file at `key`
    fn upload(&self, local_path: &Path, key: &str) -> StorageResult<()>;

    /// Fetch one key, or every key under a prefix, into `local_dir`
    ///
    /// A single key lands as `local_dir/<file name>`; prefix downloads keep
    /// the key path below the prefix. Returns the number of objects fetched.
    fn download(&self, prefix_or_key: &str, local_dir: &Path) -> StorageResult<usize>;

    /// Keys under `prefix`, sorted
    fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Human-readable location for logs
    fn describe(&self) -> String;
}
