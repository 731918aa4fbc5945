//! Local transcription with the whisper.cpp CLI.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use shorts_media::extract_audio;

use crate::error::{TranscribeError, TranscribeResult};
use crate::parsers::parse_whisper_json;
use crate::transcriber::{require_tool, run_engine, speech_wav_path, Transcriber, TranscriptOutcome};

pub const DEFAULT_WHISPER_BINARY: &str = "whisper-cli";
pub const DEFAULT_WHISPER_MODEL: &str = "base";
pub const DEFAULT_MODELS_DIRECTORY: &str = "models";

/// Configuration for the whisper.cpp backend.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    /// CLI executable name or path
    pub binary: String,
    /// ggml model file
    pub model: PathBuf,
    /// Spoken language passed with `-l`
    pub language: String,
}

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_WHISPER_BINARY.to_string(),
            model: resolve_model(Path::new(DEFAULT_MODELS_DIRECTORY), DEFAULT_WHISPER_MODEL),
            language: "en".to_string(),
        }
    }
}

impl WhisperConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let models_dir = std::env::var("MODELS_DIRECTORY").unwrap_or_else(|_| DEFAULT_MODELS_DIRECTORY.to_string());
        let model = std::env::var("WHISPER_MODEL").unwrap_or_else(|_| DEFAULT_WHISPER_MODEL.to_string());

        Self {
            binary: std::env::var("WHISPER_BIN").unwrap_or_else(|_| DEFAULT_WHISPER_BINARY.to_string()),
            model: resolve_model(Path::new(&models_dir), &model),
            language: std::env::var("WHISPER_LANGUAGE").unwrap_or_else(|_| "en".to_string()),
        }
    }
}

/// Map a model name (`base`, `small.en`) to `<dir>/ggml-<name>.bin`.
/// Paths and `.bin` file names are taken as given.
pub fn resolve_model(models_dir: &Path, model: &str) -> PathBuf {
    let model = model.trim();
    if model.ends_with(".bin") || model.contains(std::path::MAIN_SEPARATOR) {
        PathBuf::from(model)
    } else {
        models_dir.join(format!("ggml-{}.bin", model.to_lowercase()))
    }
}

pub struct WhisperTranscriber {
    config: WhisperConfig,
}

impl WhisperTranscriber {
    pub fn new(config: WhisperConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(WhisperConfig::from_env())
    }

    /// Arguments for one run; output lands at `<output_stem>.json`.
    pub fn args(&self, wav: &Path, output_stem: &Path) -> Vec<String> {
        vec![
            "-m".to_string(),
            self.config.model.to_string_lossy().to_string(),
            "-f".to_string(),
            wav.to_string_lossy().to_string(),
            "-l".to_string(),
            self.config.language.clone(),
            "-oj".to_string(),
            "-of".to_string(),
            output_stem.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn name(&self) -> &'static str {
        "whisper"
    }

    async fn transcribe(&self, media: &Path) -> TranscribeResult<TranscriptOutcome> {
        let binary = require_tool(&self.config.binary)?;
        if !self.config.model.is_file() {
            return Err(TranscribeError::ModelNotFound(self.config.model.clone()));
        }

        let wav = speech_wav_path(media);
        extract_audio(media, &wav).await?;

        let output_stem = wav.with_extension("whisper");
        let json_path = output_stem.with_extension("whisper.json");

        info!(
            model = %self.config.model.display(),
            media = %media.display(),
            "Starting Whisper transcription"
        );
        let result = run_engine(&binary, &self.args(&wav, &output_stem)).await;
        tokio::fs::remove_file(&wav).await.ok();
        result?;

        let json = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            TranscribeError::tool_failed("whisper", format!("no output at {}: {}", json_path.display(), e))
        })?;
        if let Err(e) = tokio::fs::remove_file(&json_path).await {
            warn!(path = %json_path.display(), error = %e, "Failed to remove Whisper output");
        }

        let captions = parse_whisper_json(&json)?;
        info!(captions = captions.len(), "Whisper transcription completed");
        Ok(TranscriptOutcome::from_captions(captions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_model() {
        let dir = Path::new("/models");
        assert_eq!(resolve_model(dir, "base"), PathBuf::from("/models/ggml-base.bin"));
        assert_eq!(resolve_model(dir, "Small.EN"), PathBuf::from("/models/ggml-small.en.bin"));
        assert_eq!(resolve_model(dir, "custom.bin"), PathBuf::from("custom.bin"));
        assert_eq!(resolve_model(dir, "/opt/m/ggml-x.bin"), PathBuf::from("/opt/m/ggml-x.bin"));
    }

    #[test]
    fn test_args() {
        let transcriber = WhisperTranscriber::new(WhisperConfig {
            model: "/models/ggml-base.bin".into(),
            ..Default::default()
        });
        let args = transcriber.args(Path::new("/tmp/a.speech.wav"), Path::new("/tmp/a.speech.whisper"));
        assert_eq!(
            args,
            vec!["-m", "/models/ggml-base.bin", "-f", "/tmp/a.speech.wav", "-l", "en", "-oj", "-of", "/tmp/a.speech.whisper"]
        );
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let transcriber = WhisperTranscriber::new(WhisperConfig {
            binary: "definitely-not-a-whisper-binary".into(),
            ..Default::default()
        });
        let err = transcriber.transcribe(Path::new("/tmp/in.mp4")).await.unwrap_err();
        assert!(matches!(err, TranscribeError::ToolNotFound(_)));
        assert!(err.is_configuration());
    }
}
