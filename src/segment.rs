//! Label-driven windowing.
//!
//! Scans the label stream with a fixed-size, fixed-stride sliding window
//! and catalogs every window whose labels are uniform.  Windows that
//! straddle a label transition are dropped, not trimmed or repaired — the
//! catalog deliberately loses data near gesture boundaries.
use anyhow::{bail, Result};

use crate::store::Recording;

/// One label-homogeneous window: half-open `[start, end)` over the time
/// axis, `end − start` equal to the catalog's window length, every label
/// in the range equal to `class`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub class: usize,
    pub start: usize,
    pub end: usize,
}

/// Per-class index of every uniform window found in a recording.
///
/// Built once by [`segment`], immutable afterwards; inner lists keep the
/// left-to-right discovery order, so starts are non-decreasing per class.
#[derive(Debug, Clone)]
pub struct Catalog {
    classes: Vec<Vec<Segment>>,
    window_length: usize,
}

impl Catalog {
    /// Number of class ids, including classes with no segments.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// The constant window length shared by every segment.
    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// Segments of one class, in discovery order.
    pub fn segments(&self, class: usize) -> &[Segment] {
        &self.classes[class]
    }

    /// Total segment count across all classes.
    pub fn total_segments(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    /// Class ids with an empty segment list.
    pub fn empty_classes(&self) -> Vec<usize> {
        self.classes
            .iter()
            .enumerate()
            .filter(|(_, segs)| segs.is_empty())
            .map(|(c, _)| c)
            .collect()
    }

    /// All segments, class-major, discovery order within each class.
    pub fn iter_flat(&self) -> impl Iterator<Item = Segment> + '_ {
        self.classes.iter().flatten().copied()
    }
}

/// Build the catalog of label-uniform windows.
///
/// `stride = max(1, floor(window_length · (1 − overlap)))`; the scan
/// starts at 0 and inspects every `begin` with `begin + window_length ≤ T`,
/// advancing by `stride` whether or not the window qualified.  The floor
/// of 1 keeps the scan advancing even when rounding drives the nominal
/// stride to zero; `overlap ≥ 1` itself is rejected outright.
pub fn segment(recording: &Recording, window_length: usize, overlap: f64) -> Result<Catalog> {
    if !(0.0..1.0).contains(&overlap) {
        bail!("overlap must be in [0, 1), got {overlap}");
    }
    if window_length == 0 {
        bail!("window_length must be positive");
    }

    let stride = ((window_length as f64) * (1.0 - overlap)).floor() as usize;
    let stride = stride.max(1);

    let labels = &recording.labels;
    let mut classes = vec![Vec::new(); recording.class_count()];

    let mut begin = 0usize;
    while begin + window_length <= labels.len() {
        let end = begin + window_length;
        let class = labels[begin];
        if labels[begin + 1..end].iter().all(|&l| l == class) {
            let class = class as usize;
            classes[class].push(Segment { class, start: begin, end });
        }
        begin += stride;
    }

    Ok(Catalog { classes, window_length })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn recording(labels: Vec<i64>) -> Recording {
        let t = labels.len();
        Recording::new(Array2::zeros((t, 2)), labels).unwrap()
    }

    #[test]
    fn mixed_windows_dropped_uniform_kept() {
        // window 4, overlap 0.5 → stride 2 over [1,1,1,1,2,2,2,2,2]:
        // begin 0 uniform(1), begin 2 mixed, begin 4 uniform(2), begin 6
        // runs to index 10 > 9 → stop.
        let rec = recording(vec![1, 1, 1, 1, 2, 2, 2, 2, 2]);
        let cat = segment(&rec, 4, 0.5).unwrap();

        assert_eq!(cat.class_count(), 3);
        assert!(cat.segments(0).is_empty());
        assert_eq!(cat.segments(1), &[Segment { class: 1, start: 0, end: 4 }]);
        assert_eq!(cat.segments(2), &[Segment { class: 2, start: 4, end: 8 }]);
    }

    #[test]
    fn window_ending_exactly_at_t_is_kept() {
        let rec = recording(vec![1, 1, 1, 1, 2, 2, 2, 2]);
        let cat = segment(&rec, 4, 0.5).unwrap();
        assert_eq!(cat.segments(2), &[Segment { class: 2, start: 4, end: 8 }]);
    }

    #[test]
    fn segments_are_uniform_and_window_sized() {
        let labels: Vec<i64> = (0..300).map(|t| ((t / 37) % 3) as i64).collect();
        let rec = recording(labels.clone());
        let cat = segment(&rec, 16, 0.25).unwrap();

        assert!(cat.total_segments() > 0);
        for seg in cat.iter_flat() {
            assert_eq!(seg.end - seg.start, 16);
            for t in seg.start..seg.end {
                assert_eq!(labels[t] as usize, seg.class, "t={t}");
            }
        }
    }

    #[test]
    fn per_class_starts_are_non_decreasing() {
        let labels: Vec<i64> = (0..500).map(|t| ((t / 50) % 2) as i64).collect();
        let rec = recording(labels);
        let cat = segment(&rec, 8, 0.5).unwrap();
        for class in 0..cat.class_count() {
            let starts: Vec<usize> = cat.segments(class).iter().map(|s| s.start).collect();
            assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn high_overlap_still_advances() {
        // floor(4 · (1 − 0.9)) = 0 → stride clamps to 1.
        let rec = recording(vec![1; 10]);
        let cat = segment(&rec, 4, 0.9).unwrap();
        assert_eq!(cat.segments(1).len(), 7);
    }

    #[test]
    fn overlap_of_one_rejected() {
        let rec = recording(vec![1; 10]);
        assert!(segment(&rec, 4, 1.0).is_err());
    }

    #[test]
    fn window_longer_than_recording_yields_empty_catalog() {
        let rec = recording(vec![1, 1, 1]);
        let cat = segment(&rec, 8, 0.0).unwrap();
        assert_eq!(cat.total_segments(), 0);
    }
}
