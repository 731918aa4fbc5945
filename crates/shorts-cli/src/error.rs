//! Pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Source not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No transcript available for {0}")]
    EmptyTranscript(String),

    #[error("Video has no usable duration: {0}")]
    DegeneratePartition(PathBuf),

    #[error("No shorts were produced from {0}")]
    NothingRendered(PathBuf),

    #[error("Media error: {0}")]
    Media(#[from] shorts_media::MediaError),

    #[error("Transcription error: {0}")]
    Transcribe(#[from] shorts_transcribe::TranscribeError),

    #[error("Upload error: {0}")]
    Upload(#[from] shorts_upload::UploadError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Bad arguments or a missing source; nothing was processed.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidInput(_) | PipelineError::SourceNotFound(_) | PipelineError::ConfigError(_)
        )
    }

    /// The source produced nothing worth rendering.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            PipelineError::EmptyTranscript(_)
                | PipelineError::DegeneratePartition(_)
                | PipelineError::NothingRendered(_)
        )
    }

    /// The run was interrupted rather than failing.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Media(shorts_media::MediaError::Cancelled))
    }
}
