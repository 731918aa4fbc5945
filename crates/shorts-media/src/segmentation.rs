//! Segment-duration normalization.
//!
//! Turns the noisy output of the scene detector into a [`Partition`] of
//! `[0, duration]` in three passes:
//!
//! 1. [`normalize_boundaries`]: sort, dedupe, pin the endpoints.
//! 2. [`merge_short_scenes`]: greedily drop boundaries that would create
//!    segments shorter than `min_len`.
//! 3. [`split_long_scenes`]: cut every segment longer than `max_len` into
//!    `max_len` pieces plus a remainder.
//!
//! The upper bound is hard, the lower bound is soft: a split remainder or the
//! single-segment fallback may be shorter than `min_len`. A short tail merged
//! into its predecessor can exceed `max_len`; the split pass then cuts it
//! again. All functions here are pure and never fail.

use tracing::debug;

use shorts_models::timestamp::{approx_eq, BOUNDARY_TOLERANCE, DEDUP_EPSILON};
use shorts_models::{Partition, SegmentationConfig};

/// Sort, deduplicate and anchor raw detector output to `[0, duration]`.
///
/// NaN, negative and past-the-end values are discarded. The result always has
/// at least two elements; for an empty input and a zero duration it is the
/// degenerate `[0.0, 0.0]`.
pub fn normalize_boundaries(raw: &[f64], duration: f64) -> Vec<f64> {
    let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };

    let mut boundaries: Vec<f64> = raw
        .iter()
        .copied()
        .filter(|b| b.is_finite() && *b >= 0.0 && *b <= duration + BOUNDARY_TOLERANCE)
        .collect();
    boundaries.sort_by(f64::total_cmp);
    boundaries.dedup_by(|b, a| (*b - *a).abs() < DEDUP_EPSILON);

    if boundaries.first().is_some_and(|b| approx_eq(*b, 0.0)) {
        boundaries[0] = 0.0;
    } else {
        boundaries.insert(0, 0.0);
    }

    // `boundaries` is non-empty after the insert above
    if let Some(&last) = boundaries.last() {
        if !approx_eq(last, duration) {
            boundaries.push(duration);
        }
    }

    if boundaries.len() == 1 {
        boundaries = vec![0.0, duration];
    }

    boundaries
}

/// Merge consecutive boundaries so each segment is at least `min_len` long.
///
/// Greedy left to right. A short leftover at the end is folded into the last
/// committed segment. First and last elements are preserved and the output is
/// never longer than the input.
///
/// ```
/// use shorts_media::segmentation::merge_short_scenes;
/// let merged = merge_short_scenes(&[0.0, 2.0, 5.0, 11.0, 14.0, 20.0], 6.0);
/// assert_eq!(merged, vec![0.0, 11.0, 20.0]);
/// ```
pub fn merge_short_scenes(boundaries: &[f64], min_len: f64) -> Vec<f64> {
    let (Some(&first), Some(&last)) = (boundaries.first(), boundaries.last()) else {
        return Vec::new();
    };
    if boundaries.len() == 1 {
        return vec![first];
    }

    let mut merged = vec![first];
    let mut chunk_start = first;
    for &b in &boundaries[1..] {
        if b - chunk_start >= min_len {
            merged.push(b);
            chunk_start = b;
        }
    }

    if merged.len() == 1 {
        merged.push(last);
        return merged;
    }

    let committed = merged[merged.len() - 1];
    if last - committed < min_len {
        let idx = merged.len() - 1;
        merged[idx] = last;
    } else {
        merged.push(last);
    }

    merged
}

/// Split every segment longer than `max_len` into `max_len` chunks followed
/// by the remainder.
///
/// ```
/// use shorts_media::segmentation::split_long_scenes;
/// assert_eq!(split_long_scenes(&[0.0, 130.0], 60.0), vec![0.0, 60.0, 120.0, 130.0]);
/// ```
pub fn split_long_scenes(boundaries: &[f64], max_len: f64) -> Vec<f64> {
    let Some(&first) = boundaries.first() else {
        return Vec::new();
    };
    if !(max_len.is_finite() && max_len > 0.0) {
        return boundaries.to_vec();
    }

    let mut result = Vec::with_capacity(boundaries.len());
    result.push(first);
    for pair in boundaries.windows(2) {
        let (mut start, end) = (pair[0], pair[1]);
        while end - start > max_len {
            start += max_len;
            result.push(start);
        }
        result.push(end);
    }

    result
}

/// Runs the three normalization passes with fixed bounds.
#[derive(Debug, Clone, Copy)]
pub struct SegmentNormalizer {
    min_len: f64,
    max_len: f64,
}

impl SegmentNormalizer {
    pub fn new(min_len: f64, max_len: f64) -> Self {
        Self { min_len, max_len }
    }

    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self::new(config.min_len, config.max_len)
    }

    pub fn min_len(&self) -> f64 {
        self.min_len
    }

    pub fn max_len(&self) -> f64 {
        self.max_len
    }

    /// Build the partition for a source of `duration` seconds.
    pub fn normalize(&self, raw: &[f64], duration: f64) -> Partition {
        let boundaries = normalize_boundaries(raw, duration);
        debug!(raw = raw.len(), normalized = ?boundaries, "Boundaries normalized");

        if boundaries.iter().all(|b| *b == 0.0) {
            return Partition::degenerate();
        }

        let merged = merge_short_scenes(&boundaries, self.min_len);
        debug!(min_len = self.min_len, merged = ?merged, "Short scenes merged");

        let split = split_long_scenes(&merged, self.max_len);
        debug!(max_len = self.max_len, split = ?split, "Long scenes split");

        Partition::from_boundaries(split)
    }
}

impl Default for SegmentNormalizer {
    fn default() -> Self {
        Self::from_config(&SegmentationConfig::default())
    }
}
