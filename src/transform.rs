//! The sample transform chain.
//!
//! A [`Sample`] is the ephemeral unit handed to the consumer: the selected
//! window, its class label and the recording-global channel statistics.
//! Stateless [`Transform`] stages are applied in order by [`apply_all`];
//! each consumes and produces a `Sample`, possibly changing the array
//! shapes (the feature-extraction stage in [`crate::features`] replaces
//! the window with a flat feature vector).
use anyhow::{Context, Result};
use ndarray::{Array1, Array2, ArrayD, Axis, Ix1, Ix2};

use crate::stats::ChannelStats;

/// One served window plus the constants normalization needs.
///
/// Created per access and discarded after the consumer reads it; nothing
/// here is persisted.  `data` starts out time-major `[window_length, C]`
/// and `label` as a length-1 vector.
#[derive(Debug, Clone)]
pub struct Sample {
    pub data: ArrayD<f32>,
    pub label: ArrayD<i64>,
    pub mean: Array1<f32>,
    pub std: Array1<f32>,
}

impl Sample {
    pub fn new(window: Array2<f32>, label: i64, stats: &ChannelStats) -> Self {
        Self {
            data: window.into_dyn(),
            label: Array1::from(vec![label]).into_dyn(),
            mean: stats.mean.clone(),
            std: stats.std.clone(),
        }
    }
}

/// A stateless stage of the pipeline.
pub trait Transform {
    fn apply(&self, sample: Sample) -> Result<Sample>;
}

/// Apply every transform in order.
pub fn apply_all(transforms: &[Box<dyn Transform>], mut sample: Sample) -> Result<Sample> {
    for t in transforms {
        sample = t.apply(sample)?;
    }
    Ok(sample)
}

/// Per-channel z-score with the recording-global statistics carried in the
/// sample: `data = (data − mean) / std`, one broadcast operation over the
/// channel axis.
pub struct Normalize;

impl Transform for Normalize {
    fn apply(&self, mut sample: Sample) -> Result<Sample> {
        let data = sample
            .data
            .into_dimensionality::<Ix2>()
            .context("normalize expects a 2-D time-major window")?;
        let data = (&data - &sample.mean) / &sample.std;
        sample.data = data.into_dyn();
        Ok(sample)
    }
}

/// Linear resampling of the window to a target length on the time axis.
/// A no-op when the window already has the target length.
pub struct Resize {
    pub len: usize,
}

impl Transform for Resize {
    fn apply(&self, mut sample: Sample) -> Result<Sample> {
        let data = sample
            .data
            .into_dimensionality::<Ix2>()
            .context("resize expects a 2-D time-major window")?;
        let (t, c) = data.dim();
        if t == self.len || t == 0 {
            sample.data = data.into_dyn();
            return Ok(sample);
        }

        let mut out = Array2::<f32>::zeros((self.len, c));
        for i in 0..self.len {
            let pos = if self.len > 1 {
                i as f64 * (t - 1) as f64 / (self.len - 1) as f64
            } else {
                (t - 1) as f64 / 2.0
            };
            let lo = pos.floor() as usize;
            let hi = (lo + 1).min(t - 1);
            let frac = (pos - lo as f64) as f32;
            for ch in 0..c {
                out[[i, ch]] = data[[lo, ch]] * (1.0 - frac) + data[[hi, ch]] * frac;
            }
        }
        sample.data = out.into_dyn();
        Ok(sample)
    }
}

/// Layout conversion for the downstream consumer: `[T, C] → [C, T]`,
/// optionally with a leading singleton axis (`[1, C, T]`), and the label
/// wrapped as `[1, 1]`.  Otherwise inert.
pub struct ChannelMajor {
    pub leading_axis: bool,
}

impl Transform for ChannelMajor {
    fn apply(&self, mut sample: Sample) -> Result<Sample> {
        let data = sample
            .data
            .into_dimensionality::<Ix2>()
            .context("layout conversion expects a 2-D time-major window")?;
        let data = data.reversed_axes();
        sample.data = if self.leading_axis {
            data.insert_axis(Axis(0)).into_dyn()
        } else {
            data.into_dyn()
        };

        let label = sample
            .label
            .into_dimensionality::<Ix1>()
            .context("layout conversion expects a 1-D label")?;
        sample.label = label.insert_axis(Axis(0)).into_dyn();
        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn stats(mean: &[f32], std: &[f32]) -> ChannelStats {
        ChannelStats {
            mean: Array1::from(mean.to_vec()),
            std: Array1::from(std.to_vec()),
            min: 0.0,
            max: 1.0,
        }
    }

    #[test]
    fn normalize_then_inverse_recovers_window() {
        let window = array![[1.0_f32, 10.0], [3.0, 30.0], [5.0, 50.0]];
        let st = stats(&[2.0, 20.0], &[4.0, 8.0]);
        let sample = Sample::new(window.clone(), 1, &st);

        let out = Normalize.apply(sample).unwrap();
        let data = out.data.into_dimensionality::<Ix2>().unwrap();
        let recovered = &data * &out.std + &out.mean;
        for (&a, &b) in recovered.iter().zip(window.iter()) {
            approx::assert_abs_diff_eq!(a, b, epsilon = 1e-5_f32);
        }
    }

    #[test]
    fn normalize_is_a_per_channel_zscore() {
        let window = array![[4.0_f32, 0.0], [8.0, 0.0]];
        let st = stats(&[4.0, 0.0], &[2.0, 1.0]);
        let out = Normalize.apply(Sample::new(window, 0, &st)).unwrap();
        let data = out.data.into_dimensionality::<Ix2>().unwrap();
        assert_eq!(data[[0, 0]], 0.0);
        assert_eq!(data[[1, 0]], 2.0);
        assert_eq!(data[[1, 1]], 0.0);
    }

    #[test]
    fn resize_upsamples_a_ramp_linearly() {
        let window = array![[0.0_f32], [2.0], [4.0]];
        let st = stats(&[0.0], &[1.0]);
        let out = Resize { len: 5 }.apply(Sample::new(window, 0, &st)).unwrap();
        let data = out.data.into_dimensionality::<Ix2>().unwrap();
        assert_eq!(data.dim(), (5, 1));
        for (i, &want) in [0.0_f32, 1.0, 2.0, 3.0, 4.0].iter().enumerate() {
            approx::assert_abs_diff_eq!(data[[i, 0]], want, epsilon = 1e-6_f32);
        }
    }

    #[test]
    fn resize_same_length_is_identity() {
        let window = array![[1.0_f32, 2.0], [3.0, 4.0]];
        let st = stats(&[0.0, 0.0], &[1.0, 1.0]);
        let out = Resize { len: 2 }.apply(Sample::new(window.clone(), 0, &st)).unwrap();
        let data = out.data.into_dimensionality::<Ix2>().unwrap();
        assert_eq!(data, window);
    }

    #[test]
    fn channel_major_transposes_and_wraps_label() {
        let window = array![[1.0_f32, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let st = stats(&[0.0, 0.0], &[1.0, 1.0]);
        let out = ChannelMajor { leading_axis: false }
            .apply(Sample::new(window, 7, &st))
            .unwrap();

        assert_eq!(out.data.shape(), &[2, 3]);
        assert_eq!(out.data[[0, 2]], 5.0);
        assert_eq!(out.data[[1, 0]], 2.0);
        assert_eq!(out.label.shape(), &[1, 1]);
        assert_eq!(out.label[[0, 0]], 7);
    }

    #[test]
    fn channel_major_with_leading_axis() {
        let window = array![[1.0_f32, 2.0], [3.0, 4.0]];
        let st = stats(&[0.0, 0.0], &[1.0, 1.0]);
        let out = ChannelMajor { leading_axis: true }
            .apply(Sample::new(window, 0, &st))
            .unwrap();
        assert_eq!(out.data.shape(), &[1, 2, 2]);
        assert_eq!(out.data[[0, 1, 0]], 2.0);
    }

    #[test]
    fn chain_applies_in_order() {
        let window = array![[2.0_f32], [4.0]];
        let st = stats(&[2.0], &[2.0]);
        let chain: Vec<Box<dyn Transform>> =
            vec![Box::new(Normalize), Box::new(ChannelMajor { leading_axis: false })];
        let out = apply_all(&chain, Sample::new(window, 3, &st)).unwrap();
        assert_eq!(out.data.shape(), &[1, 2]);
        assert_eq!(out.data[[0, 0]], 0.0);
        assert_eq!(out.data[[0, 1]], 1.0);
    }
}
