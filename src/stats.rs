//! Recording-global channel statistics.
//!
//! Per-channel mean and standard deviation over the full time axis
//! (population std, ddof = 0) plus the global min/max of the flattened
//! matrix.  Computed once on the final recording — after the optional
//! filtering pass, before segmentation — and attached unchanged to every
//! sample the dataset serves; they never vary per window or per split.
use ndarray::Array1;

use crate::store::Recording;

/// Channel-wise normalization constants of one recording.
#[derive(Debug, Clone)]
pub struct ChannelStats {
    /// Per-channel mean over all `T` timesteps.
    pub mean: Array1<f32>,
    /// Per-channel population standard deviation.
    pub std: Array1<f32>,
    /// Smallest value anywhere in the signal matrix.
    pub min: f32,
    /// Largest value anywhere in the signal matrix.
    pub max: f32,
}

/// Compute [`ChannelStats`] in one pass per channel, accumulating in f64.
pub fn compute_stats(recording: &Recording) -> ChannelStats {
    let data = &recording.data;
    let (n_t, n_ch) = data.dim();
    let n = n_t.max(1) as f64;

    let mut mean = Array1::<f32>::zeros(n_ch);
    let mut std = Array1::<f32>::zeros(n_ch);
    for (c, col) in data.columns().into_iter().enumerate() {
        let m = col.iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = col
            .iter()
            .map(|&v| {
                let d = v as f64 - m;
                d * d
            })
            .sum::<f64>()
            / n;
        mean[c] = m as f32;
        std[c] = var.sqrt() as f32;
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in data.iter() {
        min = min.min(v);
        max = max.max(v);
    }

    ChannelStats { mean, std, min, max }
}
