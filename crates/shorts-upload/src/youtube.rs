//! YouTube Data API v3 resumable upload.
//!
//! Two requests per video: a metadata POST that opens an upload session and
//! returns its URL in `Location`, then a PUT of the file bytes to that URL.
//! Access tokens are taken as given; obtaining or refreshing them is left to
//! external tooling.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use shorts_models::UploadMetadata;

use crate::error::{UploadError, UploadResult};
use crate::host::{UploadOutcome, VideoHost};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Error reasons that mean "stop uploading for today".
const RATE_LIMIT_MARKERS: &[&str] = &["uploadLimitExceeded", "rateLimitExceeded", "quotaExceeded"];

/// YouTube rejects longer titles.
const MAX_TITLE_CHARS: usize = 100;

/// Configuration for the YouTube uploader.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub base_url: String,
    /// Bearer token; wins over `token_file`
    pub access_token: Option<String>,
    /// JSON file with an `access_token` (or `token`) field
    pub token_file: PathBuf,
    pub timeout: Duration,
    /// Video category id sent with the snippet
    pub category_id: Option<String>,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            token_file: PathBuf::from("token.json"),
            timeout: Duration::from_secs(600),
            category_id: None,
        }
    }
}

impl YouTubeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("YOUTUBE_API_BASE_URL").unwrap_or(defaults.base_url),
            access_token: std::env::var("YOUTUBE_ACCESS_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            token_file: std::env::var("YOUTUBE_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.token_file),
            timeout: Duration::from_secs(
                std::env::var("YOUTUBE_UPLOAD_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(600),
            ),
            category_id: std::env::var("YOUTUBE_CATEGORY_ID").ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenFile {
    #[serde(alias = "token")]
    access_token: String,
}

/// Read the bearer token from a token file.
pub async fn read_token_file(path: &Path) -> UploadResult<String> {
    let data = tokio::fs::read(path).await.map_err(|e| {
        UploadError::missing_credentials(format!("cannot read {}: {}", path.display(), e))
    })?;
    let token: TokenFile = serde_json::from_slice(&data)?;
    if token.access_token.trim().is_empty() {
        return Err(UploadError::missing_credentials(format!(
            "{} has an empty access token",
            path.display()
        )));
    }
    Ok(token.access_token)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Snippet<'a> {
    title: String,
    description: &'a str,
    tags: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    privacy_status: &'static str,
    self_declared_made_for_kids: bool,
}

#[derive(Debug, Serialize)]
struct VideoResource<'a> {
    snippet: Snippet<'a>,
    status: Status,
}

#[derive(Debug, Deserialize)]
struct VideoResponse {
    id: String,
}

/// Map a non-2xx response to an outcome.
pub fn classify_failure(status: StatusCode, body: &str) -> UploadOutcome {
    let limited = matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS);
    if limited {
        if let Some(marker) = RATE_LIMIT_MARKERS.iter().find(|m| body.contains(**m)) {
            return UploadOutcome::RateLimited(marker.to_string());
        }
    }
    UploadOutcome::Failed(format!("{}: {}", status, body.trim()))
}

fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}

pub struct YouTubeUploader {
    http: Client,
    config: YouTubeConfig,
    token: String,
}

impl YouTubeUploader {
    pub fn new(config: YouTubeConfig, token: impl Into<String>) -> UploadResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(UploadError::Network)?;

        Ok(Self {
            http,
            config,
            token: token.into(),
        })
    }

    /// Build from config, resolving the token from the config or its file.
    pub async fn from_config(config: YouTubeConfig) -> UploadResult<Self> {
        let token = match &config.access_token {
            Some(token) => token.clone(),
            None => read_token_file(&config.token_file).await?,
        };
        Self::new(config, token)
    }

    pub async fn from_env() -> UploadResult<Self> {
        Self::from_config(YouTubeConfig::from_env()).await
    }

    fn resource<'a>(&'a self, meta: &'a UploadMetadata) -> VideoResource<'a> {
        VideoResource {
            snippet: Snippet {
                title: truncate_title(&meta.title),
                description: &meta.description,
                tags: &meta.tags,
                category_id: self.config.category_id.as_deref(),
            },
            status: Status {
                privacy_status: meta.privacy.as_str(),
                self_declared_made_for_kids: meta.made_for_kids,
            },
        }
    }

    /// Open an upload session and return its URL.
    async fn start_session(&self, meta: &UploadMetadata, content_length: usize) -> Result<String, UploadOutcome> {
        let url = format!(
            "{}/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status",
            self.config.base_url
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", content_length.to_string())
            .json(&self.resource(meta))
            .send()
            .await
            .map_err(|e| UploadOutcome::Failed(format!("session request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| UploadOutcome::Failed("upload session has no Location header".to_string()))
    }

    async fn send_bytes(&self, session_url: &str, bytes: Vec<u8>) -> UploadOutcome {
        let response = match self
            .http
            .put(session_url)
            .bearer_auth(&self.token)
            .header("Content-Type", "video/mp4")
            .body(bytes)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return UploadOutcome::Failed(format!("upload request failed: {}", e)),
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return classify_failure(status, &body);
        }

        match response.json::<VideoResponse>().await {
            Ok(video) => UploadOutcome::Uploaded { video_id: video.id },
            Err(e) => UploadOutcome::Failed(format!("unexpected upload response: {}", e)),
        }
    }
}

#[async_trait]
impl VideoHost for YouTubeUploader {
    fn name(&self) -> &'static str {
        "youtube"
    }

    async fn upload(&self, path: &Path, meta: &UploadMetadata) -> UploadOutcome {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => return UploadOutcome::Failed(format!("cannot read {}: {}", path.display(), e)),
        };
        debug!(path = %path.display(), size = bytes.len(), title = %meta.title, "Starting YouTube upload");

        let session_url = match self.start_session(meta, bytes.len()).await {
            Ok(url) => url,
            Err(outcome) => {
                warn!(path = %path.display(), outcome = %outcome, "YouTube refused upload session");
                return outcome;
            }
        };

        let outcome = self.send_bytes(&session_url, bytes).await;
        match &outcome {
            UploadOutcome::Uploaded { video_id } => {
                info!(path = %path.display(), video_id = %video_id, "Upload successful")
            }
            other => warn!(path = %path.display(), outcome = %other, "Upload failed"),
        }
        outcome
    }
}
