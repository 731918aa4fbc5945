//! Uploader-provided YouTube subtitles via yt-dlp.
//!
//! Only human-written English subtitles are requested (`--write-sub` without
//! `--write-auto-sub`). Anything that is not a YouTube video has no official
//! transcript.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use shorts_media::{check_ytdlp, DownloadOptions};
use shorts_models::extract_youtube_id;

use crate::error::TranscribeResult;
use crate::parsers::parse_vtt;
use crate::transcriber::{Transcriber, TranscriptOutcome};

pub struct OfficialTranscript {
    source: String,
    workdir: PathBuf,
    language: String,
    download: DownloadOptions,
}

impl OfficialTranscript {
    /// `source` is the URL the video came from; subtitle files are written
    /// to `workdir` and removed after parsing.
    pub fn new(source: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            workdir: workdir.into(),
            language: "en".to_string(),
            download: DownloadOptions::default(),
        }
    }

    pub fn with_download_options(mut self, options: DownloadOptions) -> Self {
        self.download = options;
        self
    }

    pub fn args(&self, video_id: &str) -> Vec<String> {
        let template = self.workdir.join(video_id);
        let mut args = vec![
            "--write-sub".to_string(),
            "--sub-lang".to_string(),
            self.language.clone(),
            "--skip-download".to_string(),
            "--sub-format".to_string(),
            "vtt".to_string(),
            "--no-playlist".to_string(),
            "-o".to_string(),
            template.to_string_lossy().to_string(),
        ];
        args.extend(self.download.cookie_args());
        args.push(self.source.clone());
        args
    }

    /// VTT files written for `video_id`, English first.
    async fn subtitle_files(&self, video_id: &str) -> TranscribeResult<Vec<PathBuf>> {
        let mut found = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.workdir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with(video_id) && name.ends_with(".vtt") {
                found.push(path);
            }
        }
        found.sort_by_key(|p| !p.to_string_lossy().contains(&format!(".{}", self.language)));
        Ok(found)
    }
}

#[async_trait]
impl Transcriber for OfficialTranscript {
    fn name(&self) -> &'static str {
        "official"
    }

    async fn transcribe(&self, _media: &Path) -> TranscribeResult<TranscriptOutcome> {
        let Ok(video_id) = extract_youtube_id(&self.source) else {
            debug!(source = %self.source, "Not a YouTube source, no official transcript");
            return Ok(TranscriptOutcome::NotFound);
        };
        check_ytdlp()?;
        tokio::fs::create_dir_all(&self.workdir).await?;

        info!(video_id = %video_id, "Fetching official transcript with yt-dlp");
        let output = Command::new("yt-dlp")
            .kill_on_drop(true)
            .args(self.args(&video_id))
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last = stderr
                .lines()
                .rev()
                .find(|l| !l.trim().is_empty())
                .unwrap_or("Unknown error")
                .trim()
                .to_string();
            warn!(video_id = %video_id, error = %last, "yt-dlp failed to fetch subtitles");
            return Ok(TranscriptOutcome::TransientError(last));
        }

        let files = self.subtitle_files(&video_id).await?;
        let Some(vtt) = files.first() else {
            info!(video_id = %video_id, "No official transcript found");
            return Ok(TranscriptOutcome::NotFound);
        };

        let content = tokio::fs::read_to_string(vtt).await?;
        let captions = parse_vtt(&content);
        for file in &files {
            tokio::fs::remove_file(file).await.ok();
        }

        info!(video_id = %video_id, captions = captions.len(), "Using official YouTube transcript");
        Ok(TranscriptOutcome::from_captions(captions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_args_request_human_subtitles_only() {
        let official = OfficialTranscript::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "/tmp/subs");
        let args = official.args("dQw4w9WgXcQ");
        assert!(args.contains(&"--write-sub".to_string()));
        assert!(!args.contains(&"--write-auto-sub".to_string()));
        assert!(args.windows(2).any(|w| w[0] == "-o" && w[1] == "/tmp/subs/dQw4w9WgXcQ"));
        assert_eq!(args.last().unwrap(), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[tokio::test]
    async fn test_non_youtube_source_is_not_found() {
        let official = OfficialTranscript::new("/videos/local.mp4", "/tmp/subs");
        let outcome = official.transcribe(Path::new("/videos/local.mp4")).await.unwrap();
        assert_eq!(outcome, TranscriptOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_subtitle_files_prefer_english() {
        let dir = TempDir::new().unwrap();
        for name in ["abc.de.vtt", "abc.en.vtt", "other.en.vtt", "abc.txt"] {
            tokio::fs::write(dir.path().join(name), b"WEBVTT").await.unwrap();
        }
        let official = OfficialTranscript::new("https://youtu.be/abc", dir.path());
        let files = official.subtitle_files("abc").await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("abc.en.vtt"));
    }
}
