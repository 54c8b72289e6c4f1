use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the slot predictor
#[derive(Error, Debug)]
pub enum SlotwiseError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Dataset errors (missing or malformed preference table)
    #[error("Dataset error: {0}")]
    Dataset(String),

    // Model artifact errors
    #[error("Model artifact not found: {}", .0.display())]
    ArtifactMissing(PathBuf),

    #[error("Model artifact is corrupt: {0}")]
    ArtifactCorrupt(String),

    #[error("Model artifact is incompatible: {0}")]
    ArtifactIncompatible(String),

    // Persistence errors
    #[error("Write failed for {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Training errors
    #[error("Training failed: {0}")]
    Training(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SlotwiseError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SlotwiseError::Write {
            path: path.into(),
            source,
        }
    }

    /// True for the one condition the predictor recovers from by training.
    pub fn is_artifact_missing(&self) -> bool {
        matches!(self, SlotwiseError::ArtifactMissing(_))
    }
}

/// Result type alias for SlotwiseError
pub type Result<T> = std::result::Result<T, SlotwiseError>;
