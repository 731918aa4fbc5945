//! Run configuration.
//!
//! Built once from the environment, then overridden by command line flags,
//! and passed by reference to every stage.

use std::path::PathBuf;
use std::str::FromStr;

use shorts_media::DownloadOptions;
use shorts_models::segment::{DEFAULT_MAX_LEN, DEFAULT_MIN_LEN, DEFAULT_SCENE_THRESHOLD};
use shorts_models::{BackgroundGame, EncodingConfig, PrivacyStatus, SegmentationConfig, TranscriberKind};
use shorts_upload::PacerMode;

use crate::cli::Cli;
use crate::error::{PipelineError, PipelineResult};

/// Default delay between uploads in seconds.
pub const DEFAULT_UPLOAD_DELAY_SECS: u64 = 10;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root for downloads and rendered shorts
    pub output_dir: PathBuf,
    pub segmentation: SegmentationConfig,
    pub transcriber: TranscriberKind,
    /// Fixed background game, random when unset
    pub game: Option<BackgroundGame>,
    /// Render without background footage
    pub no_background: bool,
    /// Stream-copy the segments instead of composing shorts
    pub cut_only: bool,
    pub encoding: EncodingConfig,
    /// Where downloaded footage is stored
    pub footage_dir: PathBuf,
    /// JSON map of downloaded footage paths
    pub footage_cache: PathBuf,
    /// Optional JSON catalog replacing the built-in one
    pub footage_catalog: Option<PathBuf>,
    pub transcript_cache_dir: PathBuf,
    /// Directory holding uploaded.log and failed.log
    pub ledger_dir: PathBuf,
    /// Netscape cookies file passed to yt-dlp
    pub cookies_file: Option<PathBuf>,
    pub upload: bool,
    pub delete_after_upload: bool,
    pub privacy: PrivacyStatus,
    pub pacer: PacerMode,
    /// Per-render FFmpeg timeout in seconds
    pub render_timeout: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            segmentation: SegmentationConfig::default(),
            transcriber: TranscriberKind::default(),
            game: None,
            no_background: false,
            cut_only: false,
            encoding: EncodingConfig::default(),
            footage_dir: PathBuf::from("footage"),
            footage_cache: PathBuf::from("footage/cache.json"),
            footage_catalog: None,
            transcript_cache_dir: PathBuf::from(".cache/transcripts"),
            ledger_dir: PathBuf::from("logs"),
            cookies_file: None,
            upload: true,
            delete_after_upload: false,
            privacy: PrivacyStatus::Public,
            pacer: PacerMode::Fixed(std::time::Duration::from_secs(DEFAULT_UPLOAD_DELAY_SECS)),
            render_timeout: None,
        }
    }
}

fn parse<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|s| s.trim().parse().ok())
}

fn flag(value: Option<String>) -> Option<bool> {
    value.map(|s| matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl AppConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable source.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let segmentation = SegmentationConfig::default()
            .with_bounds(
                parse(get("SHORTS_MIN_LEN")).unwrap_or(DEFAULT_MIN_LEN),
                parse(get("SHORTS_MAX_LEN")).unwrap_or(DEFAULT_MAX_LEN),
            )
            .with_threshold(parse(get("SHORTS_SCENE_THRESHOLD")).unwrap_or(DEFAULT_SCENE_THRESHOLD));

        let window = parse(get("UPLOAD_DELAY_MIN_SECS")).zip(parse(get("UPLOAD_DELAY_MAX_SECS")));
        let pacer = PacerMode::from_secs(
            parse(get("UPLOAD_DELAY_SECS")).unwrap_or(DEFAULT_UPLOAD_DELAY_SECS),
            window,
        );

        let mut encoding = EncodingConfig::default();
        if let Some(crf) = parse(get("SHORTS_CRF")) {
            encoding = encoding.with_crf(crf);
        }
        if let Some(preset) = get("SHORTS_PRESET").filter(|p| !p.trim().is_empty()) {
            encoding.preset = preset.trim().to_string();
        }

        Self {
            output_dir: get("OUTPUT_DIRECTORY").map(PathBuf::from).unwrap_or(defaults.output_dir),
            segmentation,
            transcriber: parse(get("TRANSCRIBER")).unwrap_or(defaults.transcriber),
            game: parse(get("SHORTS_GAME")),
            no_background: flag(get("SHORTS_NO_BACKGROUND")).unwrap_or(false),
            cut_only: false,
            encoding,
            footage_dir: get("SHORTS_FOOTAGE_DIR").map(PathBuf::from).unwrap_or(defaults.footage_dir),
            footage_cache: get("SHORTS_FOOTAGE_CACHE")
                .map(PathBuf::from)
                .unwrap_or(defaults.footage_cache),
            footage_catalog: get("SHORTS_FOOTAGE_CATALOG").map(PathBuf::from),
            transcript_cache_dir: get("SHORTS_TRANSCRIPT_CACHE")
                .map(PathBuf::from)
                .unwrap_or(defaults.transcript_cache_dir),
            ledger_dir: get("SHORTS_LEDGER_DIR").map(PathBuf::from).unwrap_or(defaults.ledger_dir),
            cookies_file: get("SHORTS_COOKIES_FILE").map(PathBuf::from),
            upload: defaults.upload,
            delete_after_upload: flag(get("SHORTS_DELETE_AFTER_UPLOAD")).unwrap_or(false),
            privacy: parse(get("SHORTS_PRIVACY")).unwrap_or(defaults.privacy),
            pacer,
            render_timeout: parse(get("SHORTS_RENDER_TIMEOUT_SECS")),
        }
    }

    /// Apply command line overrides.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(min_len) = cli.min_len {
            self.segmentation.min_len = min_len;
        }
        if let Some(max_len) = cli.max_len {
            self.segmentation.max_len = max_len;
        }
        if let Some(threshold) = cli.threshold {
            self.segmentation.threshold = threshold;
        }
        if let Some(kind) = cli.transcriber {
            self.transcriber = kind;
        }
        if cli.game.is_some() {
            self.game = cli.game;
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(privacy) = cli.privacy {
            self.privacy = privacy;
        }
        if cli.no_upload {
            self.upload = false;
        }
        if cli.cut_only {
            self.cut_only = true;
            self.upload = false;
        }
        if cli.delete_after_upload {
            self.delete_after_upload = true;
        }
        self
    }

    /// Reject bounds the segmentation pass cannot honor.
    pub fn validate(&self) -> PipelineResult<()> {
        let SegmentationConfig {
            min_len,
            max_len,
            threshold,
            ..
        } = self.segmentation;

        if !(max_len.is_finite() && max_len > 0.0) {
            return Err(PipelineError::config_error(format!("max length must be positive, got {}", max_len)));
        }
        if !(min_len.is_finite() && min_len >= 0.0) || min_len > max_len {
            return Err(PipelineError::config_error(format!(
                "min length must be between 0 and {}, got {}",
                max_len, min_len
            )));
        }
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PipelineError::config_error(format!(
                "scene threshold must be between 0 and 1, got {}",
                threshold
            )));
        }
        Ok(())
    }

    pub fn download_options(&self) -> DownloadOptions {
        DownloadOptions {
            cookies_file: self.cookies_file.clone(),
            ..DownloadOptions::default()
        }
    }
}
