//! Transcription error types.

use std::path::PathBuf;
use thiserror::Error;

use shorts_media::MediaError;

pub type TranscribeResult<T> = Result<T, TranscribeError>;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("{0} not found in PATH")]
    ToolNotFound(String),

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("Speech model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Missing API key: {0}")]
    MissingApiKey(&'static str),

    #[error("Transcription service error: {0}")]
    Service(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranscribeError {
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Errors caused by local setup rather than the input.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            TranscribeError::ToolNotFound(_)
                | TranscribeError::ModelNotFound(_)
                | TranscribeError::MissingApiKey(_)
        ) || matches!(self, TranscribeError::Media(e) if e.is_missing_tool())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TranscribeError::Service(_) | TranscribeError::Timeout(_) | TranscribeError::Network(_)
        )
    }
}
