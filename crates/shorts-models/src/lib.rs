//! Shared data models for the shorts pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Timeline segments, partitions and segmentation parameters
//! - Transcript captions on the global and segment-local timelines
//! - Transcriber and background footage selection
//! - Encoding configuration and canvas layout
//! - Upload metadata

pub mod caption;
pub mod encoding;
pub mod footage;
pub mod segment;
pub mod timestamp;
pub mod transcriber;
pub mod upload;
pub mod utils;

// Re-export common types
pub use caption::{Caption, LocalCaption};
pub use encoding::{EncodingConfig, RenderLayout};
pub use footage::{BackgroundGame, GameParseError};
pub use segment::{Partition, Segment, SegmentationConfig};
pub use timestamp::{approx_eq, format_seconds, format_srt_timestamp, parse_timestamp, TimestampError};
pub use transcriber::{TranscriberKind, TranscriberParseError};
pub use upload::{PrivacyStatus, UploadMetadata};
pub use utils::{extract_youtube_id, is_url, YoutubeIdError, YoutubeIdResult};
