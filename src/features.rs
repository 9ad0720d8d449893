//! Hand-crafted per-channel EMG features.
//!
//! Each feature maps a time-major `[T, C]` window to one value per
//! channel.  The full set is enumerated in [`FEATURES`], an explicit
//! name → function table: the feature set is statically inspectable and
//! extended by adding a row, never by runtime discovery.
//!
//! ZC and SSC follow the thresholded EMG convention: the per-channel
//! threshold is `θ = |mean(channel)|` and counts are divided by the
//! window length.
use anyhow::{Context, Result};
use ndarray::{Array1, ArrayView2, Axis, Ix2};

use crate::transform::{Sample, Transform};

/// A per-channel feature: `[T, C] → [C]`.
pub type FeatureFn = fn(&ArrayView2<f32>) -> Array1<f32>;

/// The feature registry, in the order their outputs are concatenated.
pub const FEATURES: &[(&str, FeatureFn)] = &[
    ("rms", rms),
    ("mav", mav),
    ("zc", zero_crossings),
    ("ssc", slope_sign_changes),
    ("var", variance),
];

/// Root mean square: `sqrt(mean(d²))` per channel.
pub fn rms(d: &ArrayView2<f32>) -> Array1<f32> {
    let t = d.nrows().max(1) as f32;
    (d.mapv(|v| v * v).sum_axis(Axis(0)) / t).mapv(f32::sqrt)
}

/// Mean absolute value: `mean(|d|)` per channel.
pub fn mav(d: &ArrayView2<f32>) -> Array1<f32> {
    let t = d.nrows().max(1) as f32;
    d.mapv(f32::abs).sum_axis(Axis(0)) / t
}

/// Threshold crossings per channel: counts timesteps where consecutive
/// samples pass `θ` from below to above or above to below, divided by the
/// window length.
pub fn zero_crossings(d: &ArrayView2<f32>) -> Array1<f32> {
    let (t, c) = d.dim();
    let th = threshold(d);
    let mut counts = Array1::<f32>::zeros(c);
    for i in 1..t {
        for j in 0..c {
            let prev = d[[i - 1, j]];
            let curr = d[[i, j]];
            if (prev < th[j] && th[j] < curr) || (prev > th[j] && th[j] > curr) {
                counts[j] += 1.0;
            }
        }
    }
    counts / t.max(1) as f32
}

/// Slope sign changes per channel: counts timesteps where both adjacent
/// slopes exceed `θ` in magnitude and point in opposite directions,
/// divided by the window length.
pub fn slope_sign_changes(d: &ArrayView2<f32>) -> Array1<f32> {
    let (t, c) = d.dim();
    let th = threshold(d);
    let mut counts = Array1::<f32>::zeros(c);
    for i in 2..t {
        for j in 0..c {
            let diff1 = d[[i, j]] - d[[i - 1, j]];
            let diff2 = d[[i - 1, j]] - d[[i - 2, j]];
            if diff1.abs() > th[j] && diff2.abs() > th[j] && diff1 * diff2 < 0.0 {
                counts[j] += 1.0;
            }
        }
    }
    counts / t.max(1) as f32
}

/// Population variance along the time axis, per channel.
pub fn variance(d: &ArrayView2<f32>) -> Array1<f32> {
    let t = d.nrows().max(1) as f32;
    let mean = d.sum_axis(Axis(0)) / t;
    let centered = d.to_owned() - &mean;
    centered.mapv(|v| v * v).sum_axis(Axis(0)) / t
}

/// `θ = |mean(d)|` per channel.
fn threshold(d: &ArrayView2<f32>) -> Array1<f32> {
    let t = d.nrows().max(1) as f32;
    (d.sum_axis(Axis(0)) / t).mapv(f32::abs)
}

/// Transform stage that replaces the raw window with the concatenated
/// registry outputs: one flat `[F·C]` vector, feature-major, registry
/// order.  Label and statistics pass through unchanged.
pub struct FeatureExtract {
    registry: Vec<(&'static str, FeatureFn)>,
}

impl FeatureExtract {
    /// The standard registry: [`FEATURES`] in declared order.
    pub fn new() -> Self {
        Self { registry: FEATURES.to_vec() }
    }

    /// A custom registry, e.g. a subset or an extended table.
    pub fn with_registry(registry: Vec<(&'static str, FeatureFn)>) -> Self {
        Self { registry }
    }

    /// Registered feature names, in concatenation order.
    pub fn feature_names(&self) -> Vec<&'static str> {
        self.registry.iter().map(|&(name, _)| name).collect()
    }

    /// Length of the output vector for a `channels`-channel window.
    pub fn output_len(&self, channels: usize) -> usize {
        self.registry.len() * channels
    }
}

impl Default for FeatureExtract {
    fn default() -> Self {
        Self::new()
    }
}

impl Transform for FeatureExtract {
    fn apply(&self, mut sample: Sample) -> Result<Sample> {
        let data = sample
            .data
            .into_dimensionality::<Ix2>()
            .context("feature extraction expects a 2-D time-major window")?;
        let view = data.view();

        let mut flat = Vec::with_capacity(self.output_len(data.ncols()));
        for (_, feature) in &self.registry {
            flat.extend(feature(&view).into_iter());
        }
        sample.data = Array1::from(flat).into_dyn();
        Ok(sample)
    }
}
