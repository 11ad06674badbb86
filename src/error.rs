//! Error types for the credit risk service

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, RiskError>;

/// Main error type for artifact loading, preprocessing and inference
#[derive(Error, Debug)]
pub enum RiskError {
    #[error("Failed to read artifact {}: {source}", path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {}: {source}", path.display())]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Feature column '{0}' must hold a scalar value")]
    NonScalarFeature(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Inference error: {0}")]
    InferenceError(String),
}
