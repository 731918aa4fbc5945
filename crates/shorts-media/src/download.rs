//! Video download using yt-dlp.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::command::check_ytdlp;
use crate::error::{MediaError, MediaResult};

/// Format selector: best MP4 video plus M4A audio, falling back to any MP4.
pub const DEFAULT_FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// yt-dlp options shared by all downloads.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub format: String,
    /// Netscape cookies file for authenticated downloads
    pub cookies_file: Option<PathBuf>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            cookies_file: None,
        }
    }
}

impl DownloadOptions {
    fn base_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--restrict-filenames".to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
            "-f".to_string(),
            self.format.clone(),
        ];
        args.extend(self.cookie_args());
        args
    }

    /// `--cookies <file>` when a cookies file is configured and present.
    pub fn cookie_args(&self) -> Vec<String> {
        match &self.cookies_file {
            Some(cookies) if cookies.exists() => {
                vec!["--cookies".to_string(), cookies.to_string_lossy().to_string()]
            }
            Some(cookies) => {
                warn!(path = %cookies.display(), "Cookies file not found, continuing without it");
                Vec::new()
            }
            None => Vec::new(),
        }
    }
}

/// Download `url` into `<output_dir>/<title>/<title>.mp4`.
///
/// Returns the final file path as reported by yt-dlp. An already downloaded
/// file is reused by yt-dlp itself.
pub async fn download_video(url: &str, output_dir: impl AsRef<Path>, options: &DownloadOptions) -> MediaResult<PathBuf> {
    let output_dir = output_dir.as_ref();
    check_ytdlp()?;
    tokio::fs::create_dir_all(output_dir).await?;

    let template = output_dir.join("%(title)s").join("%(title)s.%(ext)s");
    let mut args = options.base_args();
    args.extend([
        "--print".to_string(),
        "after_move:filepath".to_string(),
        "-o".to_string(),
        template.to_string_lossy().to_string(),
        url.to_string(),
    ]);

    info!(url = %url, output_dir = %output_dir.display(), "Downloading video");
    let stdout = run_ytdlp(&args, url).await?;

    let path = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| MediaError::download_failed("yt-dlp did not report an output file"))?;

    if !path.exists() {
        return Err(MediaError::download_failed(format!(
            "reported output file {} does not exist",
            path.display()
        )));
    }

    log_downloaded(&path);
    Ok(path)
}

/// Download `url` to exactly `output_path`, reusing a non-empty existing file.
pub async fn download_to(url: &str, output_path: impl AsRef<Path>, options: &DownloadOptions) -> MediaResult<()> {
    let output_path = output_path.as_ref();

    if let Ok(metadata) = tokio::fs::metadata(output_path).await {
        if metadata.len() > 0 {
            info!("Using existing video file: {}", output_path.display());
            return Ok(());
        }
        tokio::fs::remove_file(output_path).await?;
    }

    check_ytdlp()?;
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut args = options.base_args();
    args.extend([
        "-o".to_string(),
        output_path.to_string_lossy().to_string(),
        url.to_string(),
    ]);

    info!(url = %url, output = %output_path.display(), "Downloading video");
    run_ytdlp(&args, url).await?;

    if !output_path.exists() {
        return Err(MediaError::download_failed("Output file not created"));
    }
    log_downloaded(output_path);
    Ok(())
}

async fn run_ytdlp(args: &[String], url: &str) -> MediaResult<String> {
    debug!("Running yt-dlp {}", args.join(" "));

    let output = Command::new("yt-dlp")
        .kill_on_drop(true)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("yt-dlp stderr: {}", stderr);

        if is_rate_limited(&stderr) {
            warn!(url = %url, "Video host rate limit detected");
        }

        let error_msg = stderr
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("Unknown error");
        return Err(MediaError::download_failed(format!("yt-dlp failed: {}", error_msg)));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn is_rate_limited(stderr: &str) -> bool {
    stderr.contains("429")
        || stderr.contains("Too Many Requests")
        || stderr.contains("rate limit")
        || stderr.contains("Sign in to confirm")
}

fn log_downloaded(path: &Path) {
    let size = path.metadata().map(|m| m.len()).unwrap_or(0);
    info!(
        output = %path.display(),
        size_mb = size as f64 / (1024.0 * 1024.0),
        "Downloaded video successfully"
    );
}
