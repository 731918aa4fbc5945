//! Upload error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors that stop the upload stage before any item is attempted.
///
/// Per-item problems are not errors; they are reported as
/// [`UploadOutcome`](crate::UploadOutcome) values.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to configure upload client: {0}")]
    ConfigError(String),

    #[error("No access token: {0}")]
    MissingCredentials(String),

    #[error("Upload directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Nothing to upload in {0}")]
    NothingToUpload(PathBuf),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UploadError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn missing_credentials(msg: impl Into<String>) -> Self {
        Self::MissingCredentials(msg.into())
    }
}
