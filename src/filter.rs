//! Zero-phase Butterworth filtering.
//!
//! Second-order low-pass/high-pass biquad design from a normalized cutoff
//! `wn ∈ (0, 1)` (1 = Nyquist, the `Wn` convention of
//! `scipy.signal.butter(N=2, Wn)`), applied forward and backward per
//! channel so the net phase response is zero.  Edge transients are
//! suppressed by odd-reflection padding which is stripped afterwards.
use anyhow::{bail, Result};
use ndarray::Array2;
use std::f64::consts::PI;

/// Samples of odd-reflection padding on each side, `3 · (ntaps)` for a
/// biquad — scipy's `filtfilt` default.
const PAD: usize = 9;

/// Biquad coefficients `[b0, b1, b2, 1, a1, a2]` for a second-order
/// Butterworth low-pass at normalized cutoff `wn`.
pub fn butter_lowpass(wn: f64) -> Result<[f64; 6]> {
    let k = prewarp(wn)?;
    let k2 = k * k;
    let norm = 1.0 / (1.0 + std::f64::consts::SQRT_2 * k + k2);
    let b0 = k2 * norm;
    Ok([
        b0,
        2.0 * b0,
        b0,
        1.0,
        2.0 * (k2 - 1.0) * norm,
        (1.0 - std::f64::consts::SQRT_2 * k + k2) * norm,
    ])
}

/// Biquad coefficients for a second-order Butterworth high-pass at
/// normalized cutoff `wn`.
pub fn butter_highpass(wn: f64) -> Result<[f64; 6]> {
    let k = prewarp(wn)?;
    let k2 = k * k;
    let norm = 1.0 / (1.0 + std::f64::consts::SQRT_2 * k + k2);
    Ok([
        norm,
        -2.0 * norm,
        norm,
        1.0,
        2.0 * (k2 - 1.0) * norm,
        (1.0 - std::f64::consts::SQRT_2 * k + k2) * norm,
    ])
}

/// Bilinear-transform prewarping: `k = tan(π · wn / 2)`.
fn prewarp(wn: f64) -> Result<f64> {
    if wn <= 0.0 || wn >= 1.0 {
        bail!("normalized cutoff must be in (0, 1), got {wn}");
    }
    Ok((PI * wn / 2.0).tan())
}

/// Zero-phase filter a single signal: forward pass, backward pass, with
/// odd-reflection padding of [`PAD`] samples stripped from the result.
///
/// Returns a vector of the same length as `x`.
pub fn filtfilt_1d(x: &[f32], coeffs: &[f64; 6]) -> Vec<f32> {
    let n = x.len();
    if n <= 1 {
        return x.to_vec();
    }
    let pad = PAD.min(n - 1);

    // Odd reflection: pad[i] = 2·x[edge] − x[mirror].
    let mut ext: Vec<f64> = Vec::with_capacity(n + 2 * pad);
    let first = x[0] as f64;
    for i in (1..=pad).rev() {
        ext.push(2.0 * first - x[i] as f64);
    }
    ext.extend(x.iter().map(|&v| v as f64));
    let last = x[n - 1] as f64;
    for i in 1..=pad {
        ext.push(2.0 * last - x[n - 1 - i] as f64);
    }

    let mut y = biquad(coeffs, &ext);
    y.reverse();
    let mut y = biquad(coeffs, &y);
    y.reverse();

    y[pad..pad + n].iter().map(|&v| v as f32).collect()
}

/// Zero-phase filter every channel (column) of a `[T, C]` matrix in place.
pub fn filtfilt_inplace(data: &mut Array2<f32>, coeffs: &[f64; 6]) {
    for mut col in data.columns_mut() {
        let x: Vec<f32> = col.to_vec();
        let filtered = filtfilt_1d(&x, coeffs);
        for (dst, src) in col.iter_mut().zip(filtered) {
            *dst = src;
        }
    }
}

/// Transposed direct-form-II biquad.
///
/// The state starts at steady state for `x[0]` (what `scipy.signal.filtfilt`
/// does via `lfilter_zi`), so a constant signal passes with no startup
/// transient at all.
fn biquad(coeffs: &[f64; 6], x: &[f64]) -> Vec<f64> {
    let [b0, b1, b2, _a0, a1, a2] = *coeffs;
    let gain = (b0 + b1 + b2) / (1.0 + a1 + a2);
    let x0 = x.first().copied().unwrap_or(0.0);
    let mut z2 = (b2 - a2 * gain) * x0;
    let mut z1 = (b1 - a1 * gain) * x0 + z2;

    let mut out = vec![0.0; x.len()];
    for (i, &xi) in x.iter().enumerate() {
        let y = b0 * xi + z1;
        z1 = b1 * xi - a1 * y + z2;
        z2 = b2 * xi - a2 * y;
        out[i] = y;
    }
    out
}
