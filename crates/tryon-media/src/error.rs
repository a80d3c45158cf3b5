//! Error types for overlay operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for overlay operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while building a composite.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),

    #[error("Pose detection failed: {0}")]
    Detection(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a detection failure error.
    pub fn detection(message: impl Into<String>) -> Self {
        Self::Detection(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error came from bad caller input rather than the service.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidBase64(_) | Self::Decode(_))
    }
}

impl From<tryon_ml_client::MlError> for MediaError {
    fn from(err: tryon_ml_client::MlError) -> Self {
        Self::Detection(err.to_string())
    }
}
