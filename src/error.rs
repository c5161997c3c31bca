//! Error types for the Neuroscan service

use thiserror::Error;

/// Result type alias for Neuroscan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Main error type for the Neuroscan service
#[derive(Error, Debug)]
pub enum ScanError {
    /// The classifier failed to load at startup; predictions are refused
    /// but the service stays up.
    #[error("Model is not loaded on the server")]
    ModelUnavailable,

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Report generation error: {0}")]
    Report(String),

    #[error("Label map error: {0}")]
    LabelMap(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
