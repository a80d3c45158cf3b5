//! Error types for remote model calls.

use std::time::Duration;

use thiserror::Error;

/// Result type for remote model calls.
pub type MlResult<T> = Result<T, MlError>;

/// Errors that can occur while talking to a remote model.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("Invalid client configuration: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Request(reqwest::Error),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("No image returned from model")]
    NoImage,
}

impl MlError {
    /// Classify a transport error, separating timeouts.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout.as_secs())
        } else {
            Self::Request(err)
        }
    }

    /// Whether the upstream answered but without a usable image.
    pub fn is_no_image(&self) -> bool {
        matches!(self, Self::NoImage)
    }
}
