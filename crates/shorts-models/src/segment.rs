//! Timeline segments and partitions.

use serde::{Deserialize, Serialize};

use crate::timestamp::{approx_eq, format_seconds};

/// Default minimum segment length in seconds.
pub const DEFAULT_MIN_LEN: f64 = 20.0;
/// Default maximum segment length in seconds.
pub const DEFAULT_MAX_LEN: f64 = 60.0;
/// Default scene-change sensitivity for the boundary detector.
pub const DEFAULT_SCENE_THRESHOLD: f64 = 0.8;

/// Half-open time range `[start, end)` on the source timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

impl Segment {
    /// Create a segment. Returns `None` unless `end > start`.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Human readable `HH:MM:SS.mmm-HH:MM:SS.mmm` label.
    pub fn label(&self) -> String {
        format!("{}-{}", format_seconds(self.start), format_seconds(self.end))
    }
}

/// Ordered list of boundaries covering `[0, duration]` without gaps or
/// overlaps. Consecutive boundaries form the segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    boundaries: Vec<f64>,
}

impl Partition {
    /// Wrap an already-normalized boundary list.
    pub fn from_boundaries(boundaries: Vec<f64>) -> Self {
        Self { boundaries }
    }

    /// The degenerate single-point partition for an empty or zero-length
    /// source.
    pub fn degenerate() -> Self {
        Self {
            boundaries: vec![0.0, 0.0],
        }
    }

    /// Raw boundary list.
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Total covered duration.
    pub fn duration(&self) -> f64 {
        match (self.boundaries.first(), self.boundaries.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// True when the partition contains no renderable segment.
    pub fn is_degenerate(&self) -> bool {
        self.segments().next().is_none()
    }

    /// Segments in timeline order. Zero-length pairs are skipped.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.boundaries
            .windows(2)
            .filter_map(|pair| Segment::new(pair[0], pair[1]))
    }

    /// Number of renderable segments.
    pub fn segment_count(&self) -> usize {
        self.segments().count()
    }

    /// Check the structural invariants against a source duration: starts at
    /// zero, ends at `duration`, strictly increasing.
    pub fn is_valid_for(&self, duration: f64) -> bool {
        let Some((&first, &last)) = self.boundaries.first().zip(self.boundaries.last()) else {
            return false;
        };
        first == 0.0
            && approx_eq(last, duration)
            && self.boundaries.windows(2).all(|pair| pair[1] > pair[0])
    }
}

/// Parameters of the segmentation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Soft lower bound on segment length
    pub min_len: f64,
    /// Hard upper bound on segment length
    pub max_len: f64,
    /// Scene-change sensitivity passed to the detector
    pub threshold: f64,
    /// Optional `(start, end)` window restricting detection
    pub window: Option<(f64, f64)>,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
            threshold: DEFAULT_SCENE_THRESHOLD,
            window: None,
        }
    }
}

impl SegmentationConfig {
    /// Set the duration bounds.
    pub fn with_bounds(mut self, min_len: f64, max_len: f64) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    /// Set the detector threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Restrict detection to a window.
    pub fn with_window(mut self, start: f64, end: f64) -> Self {
        self.window = Some((start, end));
        self
    }

    /// Whether a segment duration is publishable under these bounds.
    pub fn accepts(&self, duration: f64) -> bool {
        duration >= self.min_len && duration <= self.max_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_requires_positive_length() {
        assert!(Segment::new(1.0, 1.0).is_none());
        assert!(Segment::new(2.0, 1.0).is_none());
        let seg = Segment::new(10.0, 20.0).unwrap();
        assert_eq!(seg.duration(), 10.0);
    }

    #[test]
    fn test_partition_segments() {
        let partition = Partition::from_boundaries(vec![0.0, 60.0, 120.0, 130.0]);
        let segments: Vec<_> = partition.segments().collect();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[2], Segment { start: 120.0, end: 130.0 });
        assert_eq!(partition.duration(), 130.0);
        assert!(partition.is_valid_for(130.0));
        assert!(!partition.is_degenerate());
    }

    #[test]
    fn test_degenerate_partition() {
        let partition = Partition::degenerate();
        assert!(partition.is_degenerate());
        assert_eq!(partition.segment_count(), 0);
        assert_eq!(partition.boundaries(), &[0.0, 0.0]);
    }

    #[test]
    fn test_config_accepts() {
        let config = SegmentationConfig::default();
        assert!(config.accepts(20.0));
        assert!(config.accepts(60.0));
        assert!(!config.accepts(19.9));
        assert!(!config.accepts(60.1));
    }
}
