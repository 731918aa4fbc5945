//! Parsing of FFmpeg `-progress pipe:2` output.

use serde::{Deserialize, Serialize};

/// Snapshot of an FFmpeg encode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Encoding speed (1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether encoding is complete
    pub is_complete: bool,
}

impl FfmpegProgress {
    /// Fold one `key=value` line into the snapshot.
    ///
    /// Returns a copy of the snapshot when the line closes a progress block
    /// (`progress=continue` or `progress=end`), `None` otherwise. Lines that
    /// are not progress keys are ignored.
    pub fn apply_line(&mut self, line: &str) -> Option<FfmpegProgress> {
        let (key, value) = line.trim().split_once('=')?;
        match key {
            // out_time_ms is actually microseconds in every FFmpeg release
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<i64>() {
                    self.out_time_ms = us / 1000;
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    self.frame = frame;
                }
            }
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    self.speed = speed;
                }
            }
            "progress" => {
                self.is_complete = value == "end";
                return Some(self.clone());
            }
            _ => {}
        }
        None
    }

    /// Whether a stderr line belongs to the progress stream.
    pub fn is_progress_line(line: &str) -> bool {
        matches!(
            line.split_once('=').map(|(k, _)| k),
            Some(
                "frame" | "fps" | "stream_0_0_q" | "bitrate" | "total_size" | "out_time_us"
                    | "out_time_ms" | "out_time" | "dup_frames" | "drop_frames" | "speed"
                    | "progress"
            )
        )
    }

    /// Progress percentage against a target duration in seconds.
    pub fn percentage(&self, total_secs: f64) -> f64 {
        if total_secs <= 0.0 {
            return 0.0;
        }
        ((self.out_time_ms as f64 / 1000.0) / total_secs * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_block() {
        let mut progress = FfmpegProgress::default();
        assert!(progress.apply_line("frame=120").is_none());
        assert!(progress.apply_line("out_time_us=5000000").is_none());
        assert!(progress.apply_line("speed=1.5x").is_none());
        let snapshot = progress.apply_line("progress=continue").unwrap();

        assert_eq!(snapshot.frame, 120);
        assert_eq!(snapshot.out_time_ms, 5000);
        assert!((snapshot.speed - 1.5).abs() < 0.01);
        assert!(!snapshot.is_complete);

        assert!(progress.apply_line("progress=end").unwrap().is_complete);
    }

    #[test]
    fn test_ignores_noise() {
        let mut progress = FfmpegProgress::default();
        assert!(progress.apply_line("speed=N/A").is_none());
        assert!(progress.apply_line("[libx264 @ 0x1] frame I:1").is_none());
        assert_eq!(progress.speed, 0.0);
        assert!(FfmpegProgress::is_progress_line("bitrate=1000kbits/s"));
        assert!(!FfmpegProgress::is_progress_line("Error opening input"));
    }

    #[test]
    fn test_percentage() {
        let progress = FfmpegProgress {
            out_time_ms: 15_000,
            ..Default::default()
        };
        assert!((progress.percentage(30.0) - 50.0).abs() < 0.01);
        assert_eq!(progress.percentage(10.0), 100.0);
        assert_eq!(progress.percentage(0.0), 0.0);
    }
}
