//! Plain segment cutting without composition.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use shorts_models::timestamp::format_filename_timestamp;
use shorts_models::{Partition, Segment};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::render::MIN_RENDER_DURATION;

/// Extract a segment from a video file without re-encoding.
pub async fn extract_segment<P: AsRef<Path>>(
    input: P,
    output: P,
    start_secs: f64,
    duration: f64,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    info!(
        "Extracting segment: {} -> {} (start: {:.2}s, duration: {:.2}s)",
        input.display(),
        output.display(),
        start_secs,
        duration
    );

    let cmd = FfmpegCommand::new(input, output)
        .seek(start_secs)
        .duration(duration)
        .codec_copy()
        .output_arg("-avoid_negative_ts")
        .output_arg("make_zero");

    FfmpegRunner::new().run(&cmd).await
}

/// `<stem>-[HH-MM-SS.mmm]-[HH-MM-SS.mmm].mp4` next to the other cuts.
pub fn cut_output_path(dir: &Path, stem: &str, segment: &Segment) -> PathBuf {
    dir.join(format!(
        "{}-[{}]-[{}].mp4",
        stem,
        format_filename_timestamp(segment.start),
        format_filename_timestamp(segment.end)
    ))
}

/// Cut every segment of `partition` out of `input` into `output_dir`.
///
/// Segments shorter than the render minimum are skipped. Returns the paths
/// written, in timeline order.
pub async fn cut_partition(input: &Path, partition: &Partition, output_dir: &Path) -> MediaResult<Vec<PathBuf>> {
    tokio::fs::create_dir_all(output_dir).await?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "clip".to_string());

    let mut outputs = Vec::new();
    for segment in partition.segments() {
        if segment.duration() < MIN_RENDER_DURATION {
            warn!(segment = %segment.label(), "Skipping near-empty segment");
            continue;
        }
        let output = cut_output_path(output_dir, &stem, &segment);
        extract_segment(input, output.as_path(), segment.start, segment.duration()).await?;
        outputs.push(output);
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_output_path() {
        let seg = Segment::new(61.5, 125.0).unwrap();
        let path = cut_output_path(Path::new("/out"), "talk", &seg);
        assert_eq!(
            path,
            PathBuf::from("/out/talk-[00-01-01.500]-[00-02-05.000].mp4")
        );
    }
}
