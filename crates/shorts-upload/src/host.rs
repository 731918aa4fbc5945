//! The video hosting capability.

use async_trait::async_trait;
use std::fmt;
use std::path::Path;

use shorts_models::UploadMetadata;

/// Result of uploading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded { video_id: String },
    /// The host refused because of quota or upload limits. Ends the session.
    RateLimited(String),
    /// Any other failure. The session continues with the next file.
    Failed(String),
}

impl UploadOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, UploadOutcome::Uploaded { .. })
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadOutcome::Uploaded { video_id } => write!(f, "uploaded ({})", video_id),
            UploadOutcome::RateLimited(reason) => write!(f, "rate limited: {}", reason),
            UploadOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// A platform that accepts finished shorts.
#[async_trait]
pub trait VideoHost: Send + Sync {
    fn name(&self) -> &'static str;

    async fn upload(&self, path: &Path, meta: &UploadMetadata) -> UploadOutcome;
}
