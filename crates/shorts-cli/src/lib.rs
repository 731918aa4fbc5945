//! The `shorts` pipeline coordinator.
//!
//! This crate provides:
//! - Command line parsing and environment configuration
//! - The processing run: download, transcript, segmentation, render, upload
//! - Upload-only resumption over rendered output
//! - Run-scoped structured logging

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;

pub use cli::Cli;
pub use config::AppConfig;
pub use error::{PipelineError, PipelineResult};
pub use logging::RunLogger;
pub use pipeline::{renderable_segments, work_dir_for, Pipeline, RunSummary};
