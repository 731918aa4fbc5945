//! FFmpeg, FFprobe and yt-dlp wrappers for the shorts pipeline.
//!
//! This crate provides:
//! - Scene-change detection and duration probing
//! - Segment-duration normalization of detected boundaries
//! - Caption remapping into segment-local time and SRT output
//! - Vertical short composition over background gameplay footage
//! - Footage catalog, footage cache and yt-dlp downloads
//! - Type-safe FFmpeg command building with progress and cancellation

pub mod audio;
pub mod captions;
pub mod clip;
pub mod command;
pub mod download;
pub mod error;
pub mod footage;
pub mod fs_utils;
pub mod probe;
pub mod progress;
pub mod render;
pub mod scene_detect;
pub mod segmentation;
pub mod subtitles;

pub use audio::extract_audio;
pub use captions::{remap_captions, remap_for_segment};
pub use clip::{cut_partition, extract_segment};
pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, wait_cancelled, FfmpegCommand, FfmpegRunner};
pub use download::{download_to, download_video, DownloadOptions};
pub use error::{MediaError, MediaResult};
pub use footage::{FootageCache, FootageCatalog, FootageResolver, FootageSource};
pub use probe::{probe_duration, probe_video, VideoInfo};
pub use progress::FfmpegProgress;
pub use render::{render_short, short_output_path, BackgroundClip, RenderRequest};
pub use scene_detect::{detect_partition, BoundaryDetector};
pub use segmentation::{merge_short_scenes, normalize_boundaries, split_long_scenes, SegmentNormalizer};
pub use subtitles::{write_srt, SubtitleStyle};
