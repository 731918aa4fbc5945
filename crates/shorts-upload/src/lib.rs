//! Publishing rendered shorts.
//!
//! This crate provides:
//! - The [`VideoHost`] capability and its YouTube implementation
//! - A persistent upload ledger so re-runs skip published files
//! - Upload pacing between successive uploads
//! - The upload session loop with rate-limit handling

pub mod error;
pub mod host;
pub mod ledger;
pub mod pacer;
pub mod uploader;
pub mod youtube;

pub use error::{UploadError, UploadResult};
pub use host::{UploadOutcome, VideoHost};
pub use ledger::UploadLedger;
pub use pacer::{PacerMode, UploadPacer};
pub use uploader::{items_for_dir, upload_all, video_name_for, UploadItem, UploadOptions, UploadReport};
pub use youtube::{YouTubeConfig, YouTubeUploader};
