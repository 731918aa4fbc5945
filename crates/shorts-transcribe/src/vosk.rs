//! Local transcription with the `vosk-transcriber` CLI.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use shorts_media::extract_audio;

use crate::error::{TranscribeError, TranscribeResult};
use crate::parsers::parse_srt;
use crate::transcriber::{require_tool, run_engine, speech_wav_path, Transcriber, TranscriptOutcome};
use crate::whisper::DEFAULT_MODELS_DIRECTORY;

pub const DEFAULT_VOSK_BINARY: &str = "vosk-transcriber";
pub const DEFAULT_VOSK_MODEL: &str = "vosk-model-small-en-us-0.15";

#[derive(Debug, Clone)]
pub struct VoskConfig {
    pub binary: String,
    /// Unpacked model directory
    pub model_dir: PathBuf,
}

impl Default for VoskConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_VOSK_BINARY.to_string(),
            model_dir: Path::new(DEFAULT_MODELS_DIRECTORY).join(DEFAULT_VOSK_MODEL),
        }
    }
}

impl VoskConfig {
    pub fn from_env() -> Self {
        let models_dir = std::env::var("MODELS_DIRECTORY").unwrap_or_else(|_| DEFAULT_MODELS_DIRECTORY.to_string());
        let model = std::env::var("VOSK_MODEL").unwrap_or_else(|_| DEFAULT_VOSK_MODEL.to_string());
        Self {
            binary: std::env::var("VOSK_BIN").unwrap_or_else(|_| DEFAULT_VOSK_BINARY.to_string()),
            model_dir: Path::new(&models_dir).join(model.trim().to_lowercase()),
        }
    }
}

pub struct VoskTranscriber {
    config: VoskConfig,
}

impl VoskTranscriber {
    pub fn new(config: VoskConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(VoskConfig::from_env())
    }

    pub fn args(&self, wav: &Path, srt: &Path) -> Vec<String> {
        vec![
            "--model".to_string(),
            self.config.model_dir.to_string_lossy().to_string(),
            "--input".to_string(),
            wav.to_string_lossy().to_string(),
            "--output".to_string(),
            srt.to_string_lossy().to_string(),
            "--output-type".to_string(),
            "srt".to_string(),
        ]
    }
}

#[async_trait]
impl Transcriber for VoskTranscriber {
    fn name(&self) -> &'static str {
        "vosk"
    }

    async fn transcribe(&self, media: &Path) -> TranscribeResult<TranscriptOutcome> {
        let binary = require_tool(&self.config.binary)?;
        if !self.config.model_dir.is_dir() {
            return Err(TranscribeError::ModelNotFound(self.config.model_dir.clone()));
        }

        let wav = speech_wav_path(media);
        let srt = wav.with_extension("vosk.srt");
        extract_audio(media, &wav).await?;

        info!(
            model = %self.config.model_dir.display(),
            media = %media.display(),
            "Starting Vosk transcription"
        );
        let result = run_engine(&binary, &self.args(&wav, &srt)).await;
        tokio::fs::remove_file(&wav).await.ok();
        result?;

        let content = tokio::fs::read_to_string(&srt).await?;
        tokio::fs::remove_file(&srt).await.ok();

        let captions = parse_srt(&content);
        info!(captions = captions.len(), "Vosk transcription completed");
        Ok(TranscriptOutcome::from_captions(captions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        let transcriber = VoskTranscriber::new(VoskConfig {
            model_dir: "/models/vosk-small".into(),
            ..Default::default()
        });
        let args = transcriber.args(Path::new("a.wav"), Path::new("a.srt"));
        assert_eq!(
            args,
            vec!["--model", "/models/vosk-small", "--input", "a.wav", "--output", "a.srt", "--output-type", "srt"]
        );
    }

    #[test]
    fn test_default_model_dir() {
        assert!(VoskConfig::default().model_dir.ends_with(DEFAULT_VOSK_MODEL));
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let transcriber = VoskTranscriber::new(VoskConfig {
            binary: "definitely-not-vosk".into(),
            ..Default::default()
        });
        assert!(matches!(
            transcriber.transcribe(Path::new("in.mp4")).await,
            Err(TranscribeError::ToolNotFound(_))
        ));
    }
}
