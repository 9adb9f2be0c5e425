//! Filesystem-backed object store
//!
//! A bucket is a directory; keys are `/`-separated paths relative to it.
//! Useful for staging datasets on shared disks and for exercising sync
//! tooling without a network.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::storage::{ObjectStore, StorageError, StorageResult};

/// Object store rooted at a local directory
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`; the directory is created on first upload
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to its file path, rejecting keys that escape the root
    fn key_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(StorageError::Other {
                key: key.to_string(),
                reason: "key must be a relative path without '..'".to_string(),
                source: None,
            });
        }
        Ok(self.root.join(relative))
    }

    fn copy(&self, from: &Path, to: &Path, key: &str) -> StorageResult<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::Local {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        fs::copy(from, to).map_err(|e| match e.kind() {
            ErrorKind::NotFound if !from.exists() => StorageError::NotFound {
                key: key.to_string(),
            },
            _ => StorageError::Other {
                key: key.to_string(),
                reason: format!("copy to {} failed", to.display()),
                source: Some(e),
            },
        })?;
        Ok(())
    }
}

impl ObjectStore for LocalObjectStore {
    fn upload(&self, local_path: &Path, key: &str) -> StorageResult<()> {
        if !local_path.is_file() {
            return Err(StorageError::Local {
                path: local_path.to_path_buf(),
                source: std::io::Error::new(ErrorKind::NotFound, "local file not found"),
            });
        }
        let target = self.key_path(key)?;
        self.copy(local_path, &target, key)?;
        tracing::debug!(key, bucket = %self.root.display(), "Uploaded object");
        Ok(())
    }

    fn download(&self, prefix_or_key: &str, local_dir: &Path) -> StorageResult<usize> {
        let trimmed = prefix_or_key.trim_end_matches('/');
        if !trimmed.is_empty() {
            let exact = self.key_path(trimmed)?;
            if exact.is_file() {
                let file_name = exact.file_name().ok_or_else(|| StorageError::NotFound {
                    key: prefix_or_key.to_string(),
                })?;
                self.copy(&exact, &local_dir.join(file_name), prefix_or_key)?;
                return Ok(1);
            }
        }

        let keys = self.list(prefix_or_key)?;
        if keys.is_empty() {
            return Err(StorageError::NotFound {
                key: prefix_or_key.to_string(),
            });
        }

        for key in &keys {
            let relative = key
                .strip_prefix(prefix_or_key)
                .unwrap_or(key)
                .trim_start_matches('/');
            let source = self.key_path(key)?;
            self.copy(&source, &local_dir.join(relative), key)?;
        }
        Ok(keys.len())
    }

    fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry.map_err(|e| StorageError::Other {
                key: prefix.to_string(),
                reason: e.to_string(),
                source: None,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn describe(&self) -> String {
        format!("file://{}", self.root.display())
    }
}
