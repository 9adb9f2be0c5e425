//! Error handling for the augmentation engine
//!
//! Failures are split by scope: a load failure loses a whole source file,
//! a transform or write failure loses a single output, an empty class is
//! only reported. Each variant carries an error code so reports and tests
//! can tell them apart.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for augmentation operations
pub type Result<T> = std::result::Result<T, AugmentError>;

/// Main error type for augmentation operations
#[derive(Error, Debug)]
pub enum AugmentError {
    // Source Errors
    #[error("Failed to load {path}: {reason}")]
    Load {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Per-variant Errors
    #[error("Transform '{transform}' failed on {path}: {reason}")]
    Transform {
        transform: String,
        path: PathBuf,
        reason: String,
    },

    #[error("Failed to write {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    // Batch Errors
    #[error("No audio files found in class directory {path}")]
    EmptyClass { class: String, path: PathBuf },

    // Signal Errors
    #[error("Invalid transform parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("Resampling failed: {reason}")]
    Resample { reason: String },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("Duplicate transform name in catalog: {name}")]
    DuplicateTransform { name: String },

    // I/O Errors
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AugmentError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            AugmentError::Load { .. } => "LOAD_FAILURE",
            AugmentError::Transform { .. } => "TRANSFORM_FAILURE",
            AugmentError::Write { .. } => "WRITE_FAILURE",
            AugmentError::EmptyClass { .. } => "EMPTY_CLASS",
            AugmentError::InvalidParameter { .. } => "INVALID_PARAMETER",
            AugmentError::Resample { .. } => "RESAMPLE_ERROR",
            AugmentError::Config { .. } => "CONFIG_ERROR",
            AugmentError::DuplicateTransform { .. } => "DUPLICATE_TRANSFORM",
            AugmentError::Io { .. } => "IO_ERROR",
            AugmentError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if the batch can continue after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AugmentError::Load { .. }
                | AugmentError::Transform { .. }
                | AugmentError::Write { .. }
                | AugmentError::EmptyClass { .. }
        )
    }

    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AugmentError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        AugmentError::Load {
            path: path.into(),
            reason: reason.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AugmentError::load("dog.wav", "truncated header");
        assert_eq!(err.error_code(), "LOAD_FAILURE");

        let err = AugmentError::EmptyClass {
            class: "rain".to_string(),
            path: PathBuf::from("raw/rain"),
        };
        assert_eq!(err.error_code(), "EMPTY_CLASS");
    }

    #[test]
    fn test_recoverable_scope() {
        let variant = AugmentError::Transform {
            transform: "pitch_up".to_string(),
            path: PathBuf::from("a.wav"),
            reason: "non-finite output".to_string(),
        };
        assert!(variant.is_recoverable());

        let fatal = AugmentError::io(
            "out",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!fatal.is_recoverable());
    }

    #[test]
    fn test_message_names_transform_and_file() {
        let err = AugmentError::Transform {
            transform: "time_shift".to_string(),
            path: PathBuf::from("bark_01.wav"),
            reason: "empty".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("time_shift"));
        assert!(msg.contains("bark_01.wav"));
    }
}
