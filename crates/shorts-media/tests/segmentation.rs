//! Invariants of boundary normalization and caption remapping.

use proptest::prelude::*;

use shorts_media::captions::remap_captions;
use shorts_media::segmentation::{
    merge_short_scenes, normalize_boundaries, split_long_scenes, SegmentNormalizer,
};
use shorts_models::Caption;

const EPS: f64 = 1e-9;

fn strictly_increasing(list: &[f64]) -> bool {
    list.windows(2).all(|w| w[1] > w[0])
}

#[test]
fn single_detection_at_end_gives_one_segment() {
    let partition = SegmentNormalizer::new(20.0, 60.0).normalize(&[45.0], 45.0);
    assert_eq!(partition.boundaries(), &[0.0, 45.0]);
    assert_eq!(partition.segment_count(), 1);
}

#[test]
fn noisy_detector_output() {
    let raw = [
        30.2, 3.1, 3.1, 95.0, 12.0, 61.7, 61.7005, 140.5, 141.0, 300.0, 1.2,
    ];
    let partition = SegmentNormalizer::new(20.0, 60.0).normalize(&raw, 310.0);
    assert_eq!(
        partition.boundaries(),
        &[0.0, 30.2, 61.7, 95.0, 140.5, 200.5, 260.5, 310.0]
    );
    assert!(partition.is_valid_for(310.0));
}

#[test]
fn long_undetected_video_is_chopped() {
    let partition = SegmentNormalizer::new(20.0, 60.0).normalize(&[], 185.0);
    assert_eq!(partition.boundaries(), &[0.0, 60.0, 120.0, 180.0, 185.0]);
}

#[test]
fn caption_window_example() {
    let captions = vec![
        Caption::new(8.0, 12.0, "hi"),
        Caption::new(19.0, 25.0, "there"),
        Caption::new(0.0, 5.0, "early"),
    ];
    let local = remap_captions(&captions, 10.0, 20.0);
    assert_eq!(local.len(), 2);
    assert_eq!((local[0].start, local[0].end), (0.0, 2.0));
    assert_eq!((local[1].start, local[1].end), (9.0, 10.0));
}

/// Normalized boundary lists on a quarter-second grid, so that chunk
/// arithmetic in the split pass stays exact.
fn sorted_boundaries() -> impl Strategy<Value = (Vec<f64>, f64)> {
    (4u32..12_000).prop_flat_map(|quarters| {
        let duration = f64::from(quarters) / 4.0;
        (
            prop::collection::vec(0..quarters, 0..40).prop_map(move |inner| {
                let raw: Vec<f64> = inner.into_iter().map(|q| f64::from(q) / 4.0).collect();
                normalize_boundaries(&raw, duration)
            }),
            Just(duration),
        )
    })
}

proptest! {
    #[test]
    fn prop_merge_keeps_endpoints((boundaries, _duration) in sorted_boundaries(), min_len in 0.5..90.0f64) {
        let merged = merge_short_scenes(&boundaries, min_len);
        prop_assert_eq!(merged.first(), boundaries.first());
        prop_assert_eq!(merged.last(), boundaries.last());
        prop_assert!(merged.len() <= boundaries.len());
        prop_assert!(strictly_increasing(&merged));
    }

    #[test]
    fn prop_split_is_idempotent((boundaries, _duration) in sorted_boundaries(), max_len in 1u32..120) {
        let max_len = f64::from(max_len);
        let once = split_long_scenes(&boundaries, max_len);
        let twice = split_long_scenes(&once, max_len);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_pipeline_covers_and_bounds(
        raw in prop::collection::vec(-10.0..4000.0f64, 0..60),
        duration in 1.0..3000.0f64,
        min_len in 1.0..60.0f64,
        max_len in 1.0..200.0f64,
    ) {
        let partition = SegmentNormalizer::new(min_len, max_len).normalize(&raw, duration);
        let b = partition.boundaries();

        prop_assert_eq!(b[0], 0.0);
        prop_assert!((b[b.len() - 1] - duration).abs() <= 0.01);
        prop_assert!(strictly_increasing(b));
        for pair in b.windows(2) {
            prop_assert!(pair[1] - pair[0] <= max_len + EPS);
        }
    }

    #[test]
    fn prop_remap_preserves_order_and_length(
        spans in prop::collection::vec((0.0..200.0f64, 0.0..30.0f64), 0..30),
        window_start in 0.0..150.0f64,
        window_len in 0.1..60.0f64,
    ) {
        let captions: Vec<Caption> = spans
            .iter()
            .enumerate()
            .map(|(i, (start, len))| Caption::new(*start, start + len, i.to_string()))
            .collect();
        let window_end = window_start + window_len;
        let local = remap_captions(&captions, window_start, window_end);

        let mut last_index = None;
        for caption in &local {
            prop_assert!(caption.end > caption.start);
            prop_assert!(caption.start >= 0.0 && caption.end <= window_len + EPS);
            let index: usize = caption.text.parse().unwrap();
            if let Some(prev) = last_index {
                prop_assert!(index > prev);
            }
            last_index = Some(index);
        }
    }
}
