//! AssemblyAI HTTP transcription.
//!
//! Three calls: upload the audio bytes, submit a transcript job, then poll the
//! job until it completes or errors. Word timings come back in milliseconds.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use shorts_media::extract_audio;
use shorts_models::Caption;

use crate::error::{TranscribeError, TranscribeResult};
use crate::transcriber::{speech_wav_path, Transcriber, TranscriptOutcome};

pub const DEFAULT_BASE_URL: &str = "https://api.assemblyai.com";

/// Configuration for the AssemblyAI client.
#[derive(Debug, Clone)]
pub struct AssemblyAiConfig {
    /// API root, without a trailing slash
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Delay between status checks
    pub poll_interval: Duration,
    /// Give up on a job after this long
    pub max_wait: Duration,
    pub speech_model: String,
}

impl Default for AssemblyAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(3),
            max_wait: Duration::from_secs(1800),
            speech_model: "nano".to_string(),
        }
    }
}

impl AssemblyAiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("ASSEMBLYAI_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("ASSEMBLYAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            timeout: Duration::from_secs(
                std::env::var("ASSEMBLYAI_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            ..defaults
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Serialize)]
struct TranscriptRequest<'a> {
    audio_url: &'a str,
    speech_model: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    id: String,
    status: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    words: Option<Vec<Word>>,
}

#[derive(Debug, Deserialize)]
struct Word {
    start: u64,
    end: u64,
    text: String,
}

/// Client for the AssemblyAI REST API.
pub struct AssemblyAiTranscriber {
    http: Client,
    config: AssemblyAiConfig,
}

impl AssemblyAiTranscriber {
    pub fn new(config: AssemblyAiConfig) -> TranscribeResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TranscribeError::Network)?;

        Ok(Self { http, config })
    }

    pub fn from_env() -> TranscribeResult<Self> {
        Self::new(AssemblyAiConfig::from_env())
    }

    fn api_key(&self) -> TranscribeResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or(TranscribeError::MissingApiKey("ASSEMBLYAI_API_KEY"))
    }

    async fn check(response: reqwest::Response, call: &str) -> TranscribeResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(TranscribeError::Service(format!("{} returned {}: {}", call, status, body)))
    }

    async fn upload(&self, audio: &Path) -> TranscribeResult<String> {
        let bytes = tokio::fs::read(audio).await?;
        debug!(bytes = bytes.len(), "Uploading audio to AssemblyAI");

        let response = self
            .http
            .post(format!("{}/v2/upload", self.config.base_url))
            .header("authorization", self.api_key()?)
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        let upload: UploadResponse = Self::check(response, "upload").await?.json().await?;
        Ok(upload.upload_url)
    }

    async fn submit(&self, audio_url: &str) -> TranscribeResult<TranscriptResponse> {
        let response = self
            .http
            .post(format!("{}/v2/transcript", self.config.base_url))
            .header("authorization", self.api_key()?)
            .json(&TranscriptRequest {
                audio_url,
                speech_model: &self.config.speech_model,
            })
            .send()
            .await?;
        Ok(Self::check(response, "transcript").await?.json().await?)
    }

    async fn status(&self, id: &str) -> TranscribeResult<TranscriptResponse> {
        let response = self
            .http
            .get(format!("{}/v2/transcript/{}", self.config.base_url, id))
            .header("authorization", self.api_key()?)
            .send()
            .await?;
        Ok(Self::check(response, "transcript status").await?.json().await?)
    }

    /// Transcribe an audio file that is already in an upload-friendly format.
    pub async fn transcribe_audio(&self, audio: &Path) -> TranscribeResult<TranscriptOutcome> {
        self.api_key()?;

        let audio_url = self.upload(audio).await?;
        let mut job = self.submit(&audio_url).await?;
        info!(transcript_id = %job.id, "AssemblyAI transcript submitted");

        let started = Instant::now();
        loop {
            match job.status.as_str() {
                "completed" => {
                    let captions: Vec<Caption> = job
                        .words
                        .unwrap_or_default()
                        .into_iter()
                        .map(|w| Caption::new(w.start as f64 / 1000.0, w.end as f64 / 1000.0, w.text))
                        .collect();
                    info!(captions = captions.len(), "AssemblyAI transcription completed");
                    return Ok(TranscriptOutcome::from_captions(captions));
                }
                "error" => {
                    let message = job.error.unwrap_or_else(|| "unknown error".to_string());
                    warn!(transcript_id = %job.id, error = %message, "AssemblyAI transcription failed");
                    return Ok(TranscriptOutcome::TransientError(message));
                }
                other => debug!(transcript_id = %job.id, status = %other, "Waiting for AssemblyAI"),
            }

            if started.elapsed() >= self.config.max_wait {
                return Err(TranscribeError::Timeout(self.config.max_wait.as_secs()));
            }
            tokio::time::sleep(self.config.poll_interval).await;
            job = self.status(&job.id).await?;
        }
    }
}

#[async_trait]
impl Transcriber for AssemblyAiTranscriber {
    fn name(&self) -> &'static str {
        "assemblyai"
    }

    async fn transcribe(&self, media: &Path) -> TranscribeResult<TranscriptOutcome> {
        self.api_key()?;

        let wav = speech_wav_path(media);
        extract_audio(media, &wav).await?;
        let result = self.transcribe_audio(&wav).await;
        tokio::fs::remove_file(&wav).await.ok();
        result
    }
}
