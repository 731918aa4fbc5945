//! Caption remapping from the source timeline into segment-local time.

use shorts_models::{Caption, LocalCaption, Segment};

/// Remap captions overlapping `[window_start, window_end)` into
/// `[0, window_end - window_start]`.
///
/// Captions that only touch the window edge, or that collapse to zero length
/// after clamping, are dropped. Input order is preserved.
pub fn remap_captions(captions: &[Caption], window_start: f64, window_end: f64) -> Vec<LocalCaption> {
    let span = window_end - window_start;
    if span.is_nan() || span <= 0.0 {
        return Vec::new();
    }

    captions
        .iter()
        .filter(|c| c.end > window_start && c.start < window_end)
        .filter_map(|c| {
            let start = (c.start - window_start).clamp(0.0, span);
            let end = (c.end - window_start).clamp(0.0, span);
            (end > start).then(|| LocalCaption {
                start,
                end,
                text: c.text.clone(),
            })
        })
        .collect()
}

/// [`remap_captions`] for a partition segment.
pub fn remap_for_segment(captions: &[Caption], segment: &Segment) -> Vec<LocalCaption> {
    remap_captions(captions, segment.start, segment.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cap(start: f64, end: f64, text: &str) -> Caption {
        Caption::new(start, end, text)
    }

    #[test]
    fn test_remap_clamps_both_edges() {
        let captions = vec![cap(8.0, 12.0, "hi"), cap(19.0, 25.0, "bye"), cap(0.0, 5.0, "gone")];
        let local = remap_captions(&captions, 10.0, 20.0);

        assert_eq!(local.len(), 2);
        assert_eq!((local[0].start, local[0].end, local[0].text.as_str()), (0.0, 2.0, "hi"));
        assert_eq!((local[1].start, local[1].end, local[1].text.as_str()), (9.0, 10.0, "bye"));
    }

    #[test]
    fn test_remap_drops_edge_touching() {
        let captions = vec![cap(5.0, 10.0, "before"), cap(20.0, 22.0, "after")];
        assert!(remap_captions(&captions, 10.0, 20.0).is_empty());
    }

    #[test]
    fn test_remap_drops_zero_length() {
        let captions = vec![cap(12.0, 12.0, "flash"), cap(15.0, 14.0, "inverted")];
        assert!(remap_captions(&captions, 10.0, 20.0).is_empty());
    }

    #[test]
    fn test_remap_preserves_order() {
        let captions = vec![cap(15.0, 16.0, "b"), cap(11.0, 12.0, "a")];
        let texts: Vec<_> = remap_captions(&captions, 10.0, 20.0)
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, vec!["b", "a"]);
    }

    #[test]
    fn test_remap_for_segment() {
        let seg = Segment::new(60.0, 120.0).unwrap();
        let local = remap_for_segment(&[cap(59.0, 61.5, "x")], &seg);
        assert_eq!(local[0].start, 0.0);
        assert!((local[0].end - 1.5).abs() < 1e-9);
    }
}
