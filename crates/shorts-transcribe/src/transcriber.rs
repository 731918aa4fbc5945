//! The transcription capability shared by every backend.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use shorts_models::Caption;

use crate::error::{TranscribeError, TranscribeResult};

/// What a single transcription attempt produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutcome {
    /// Captions on the source timeline.
    Found(Vec<Caption>),
    /// The backend ran but there is nothing to use (no subtitles, silence).
    NotFound,
    /// The backend could not answer this time; another backend may.
    TransientError(String),
}

impl TranscriptOutcome {
    /// Wrap a caption list, treating an empty one as [`TranscriptOutcome::NotFound`].
    pub fn from_captions(captions: Vec<Caption>) -> Self {
        if captions.is_empty() {
            Self::NotFound
        } else {
            Self::Found(captions)
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(captions) if !captions.is_empty())
    }

    pub fn into_captions(self) -> Vec<Caption> {
        match self {
            Self::Found(captions) => captions,
            _ => Vec::new(),
        }
    }
}

/// A speech-to-text source.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Transcribe the media file at `media`.
    async fn transcribe(&self, media: &Path) -> TranscribeResult<TranscriptOutcome>;
}

/// Scratch WAV path for `media`: `<dir>/<stem>.speech.wav`.
pub(crate) fn speech_wav_path(media: &Path) -> PathBuf {
    let stem = media
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio".to_string());
    media.with_file_name(format!("{}.speech.wav", stem))
}

/// Locate `binary` on PATH.
pub(crate) fn require_tool(binary: &str) -> TranscribeResult<PathBuf> {
    which::which(binary).map_err(|_| TranscribeError::ToolNotFound(binary.to_string()))
}

/// Run a speech engine CLI to completion, failing with its last stderr line.
pub(crate) async fn run_engine(binary: &Path, args: &[String]) -> TranscribeResult<()> {
    let name = binary
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| binary.display().to_string());
    debug!("Running {} {}", name, args.join(" "));

    let output = Command::new(binary)
        .kill_on_drop(true)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let last = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("Unknown error");
        return Err(TranscribeError::tool_failed(
            name,
            format!("exit {:?}: {}", output.status.code(), last.trim()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_captions() {
        assert_eq!(TranscriptOutcome::from_captions(Vec::new()), TranscriptOutcome::NotFound);
        let found = TranscriptOutcome::from_captions(vec![Caption::new(0.0, 1.0, "a")]);
        assert!(found.is_found());
        assert_eq!(found.into_captions().len(), 1);
        assert!(TranscriptOutcome::TransientError("x".into()).into_captions().is_empty());
    }

    #[test]
    fn test_speech_wav_path() {
        assert_eq!(
            speech_wav_path(Path::new("/out/talk/talk.mp4")),
            PathBuf::from("/out/talk/talk.speech.wav")
        );
    }
}
