//! Shot-boundary detection with FFmpeg's scene score.
//!
//! Runs `select='gt(scene,T)',metadata=print` over the video and collects the
//! `pts_time` of every frame whose scene-change score exceeds the threshold.
//! Tool failures are logged and reported as "no boundaries", so a broken
//! detector degrades to fixed-length splitting instead of aborting the run.

use regex::Regex;
use std::path::Path;
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::{error, info, warn};

use shorts_models::{Partition, SegmentationConfig};

use crate::command::check_ffmpeg;
use crate::probe::probe_duration;
use crate::segmentation::SegmentNormalizer;

fn pts_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"pts_time:(\d+(?:\.\d+)?)").expect("valid pts_time regex"))
}

/// Build the `-filter_complex` expression for a detection run.
pub fn scene_filter(threshold: f64, window: Option<(f64, f64)>) -> String {
    match window {
        Some((start, end)) => format!(
            "[0:v]select='between(t,{start},{end})',select='gt(scene,{threshold})',metadata=print:file=-"
        ),
        None => format!("select='gt(scene,{threshold})',metadata=print:file=-"),
    }
}

/// Extract every `pts_time:<seconds>` value from detector output.
pub fn parse_pts_times(output: &str) -> Vec<f64> {
    pts_time_regex()
        .captures_iter(output)
        .filter_map(|cap| cap.get(1)?.as_str().parse().ok())
        .collect()
}

/// Scene-change detector over a video file.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryDetector {
    threshold: f64,
    window: Option<(f64, f64)>,
}

impl BoundaryDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            window: None,
        }
    }

    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self {
            threshold: config.threshold,
            window: config.window,
        }
    }

    /// Restrict detection to `[start, end]` seconds.
    pub fn with_window(mut self, start: f64, end: f64) -> Self {
        self.window = Some((start, end));
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Raw boundary list in output order. Empty on any tool failure.
    pub async fn detect(&self, input: impl AsRef<Path>) -> Vec<f64> {
        let input = input.as_ref();
        if check_ffmpeg().is_err() {
            error!("FFmpeg not found in PATH, scene detection skipped");
            return Vec::new();
        }

        let filter = scene_filter(self.threshold, self.window);
        let output = Command::new("ffmpeg")
            .kill_on_drop(true)
            .arg("-hide_banner")
            .arg("-i")
            .arg(input)
            .args(["-filter_complex", &filter, "-f", "null", "-"])
            .stdin(Stdio::null())
            .output()
            .await;

        let output = match output {
            Ok(out) if out.status.success() => out,
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
                error!(
                    input = %input.display(),
                    exit_code = ?out.status.code(),
                    stderr = %tail.into_iter().rev().collect::<Vec<_>>().join(" | "),
                    "Scene detection failed"
                );
                return Vec::new();
            }
            Err(e) => {
                error!(input = %input.display(), error = %e, "Failed to run scene detection");
                return Vec::new();
            }
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push('\n');
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        let timestamps = parse_pts_times(&text);
        if timestamps.is_empty() {
            warn!(input = %input.display(), threshold = self.threshold, "No scene changes detected");
        } else {
            info!(
                input = %input.display(),
                count = timestamps.len(),
                threshold = self.threshold,
                "Scene changes detected"
            );
        }
        timestamps
    }
}

/// Detect, probe and normalize in one step.
pub async fn detect_partition(input: impl AsRef<Path>, config: &SegmentationConfig) -> Partition {
    let input = input.as_ref();
    let raw = BoundaryDetector::from_config(config).detect(input).await;
    let duration = probe_duration(input).await;
    let partition = SegmentNormalizer::from_config(config).normalize(&raw, duration);

    info!(
        input = %input.display(),
        duration,
        detected = raw.len(),
        segments = partition.segment_count(),
        "Partition built"
    );
    partition
}
