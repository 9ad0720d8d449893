//! Dataset configuration.
//!
//! [`DatasetConfig`] holds every tunable parameter of the windowing and
//! sampling pipeline.  The defaults reproduce the reference training setup
//! (DB1, all three exercises, 128-sample windows at 60 % overlap).

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Which sampling policy the dataset serves.
///
/// * `Train` — balanced random draws: a virtual length is configured and
///   every access draws a class uniformly at random, then a window of that
///   class uniformly at random.
/// * `Valid` — exhaustive deterministic enumeration of every catalogued
///   window, class-major, in discovery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Valid,
}

/// Configuration for [`GestureDataset`](crate::GestureDataset).
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use emgwin::{DatasetConfig, Split};
///
/// let cfg = DatasetConfig {
///     split: Split::Valid,
///     window_length: 256,
///     overlap: 0.5,
///     ..DatasetConfig::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Database directories to load, e.g. `["DB1"]`.
    pub databases: Vec<String>,

    /// Exercise sessions to load per subject, e.g. `["E1", "E2", "E3"]`.
    ///
    /// Each experiment id carries a fixed class-id base (E1 → 0, E2 → 12,
    /// E3 → 29) so gesture classes from different sessions never collide.
    /// Label 0 (rest) is never offset.
    pub experiments: Vec<String>,

    /// Sampling policy, see [`Split`].
    pub split: Split,

    /// Virtual dataset length under [`Split::Train`].
    ///
    /// Independent of the actual number of catalogued windows; it only
    /// bounds the index range of balanced random draws.
    ///
    /// Default: `1024`.
    pub virtual_len: usize,

    /// Window length in timesteps.
    ///
    /// Default: `128`.
    pub window_length: usize,

    /// Overlap fraction between consecutive window attempts, in `[0, 1)`.
    ///
    /// The scan stride is `max(1, floor(window_length · (1 − overlap)))`.
    ///
    /// Default: `0.6`.
    pub overlap: f64,

    /// Optional zero-phase Butterworth low-pass stage applied per channel
    /// over the full recording before statistics and segmentation.
    ///
    /// Normalized cutoff in `(0, 1)` where 1 is the Nyquist frequency
    /// (the `Wn` convention of `scipy.signal.butter`).
    ///
    /// Default: `None` (no filtering).
    pub lowpass: Option<f64>,

    /// Optional target window length for the resize stage.
    ///
    /// When set, each served window is linearly resampled on the time axis
    /// to this many timesteps after normalization.
    ///
    /// Default: `None` (windows keep their native length).
    pub resize: Option<usize>,
}

impl Default for DatasetConfig {
    /// The reference training configuration:
    /// DB1 · E1–E3 · train split · 1024 virtual samples · 128-sample
    /// windows at 60 % overlap · no filter · no resize.
    fn default() -> Self {
        Self {
            databases: vec!["DB1".into()],
            experiments: vec!["E1".into(), "E2".into(), "E3".into()],
            split: Split::Train,
            virtual_len: 1024,
            window_length: 128,
            overlap: 0.6,
            lowpass: None,
            resize: None,
        }
    }
}

impl DatasetConfig {
    /// Reject configurations the pipeline cannot run with.
    ///
    /// `overlap` outside `[0, 1)` would produce a non-positive stride and a
    /// non-advancing scan; a zero window length has no valid segments; a
    /// zero virtual length makes the train split empty.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.overlap) {
            bail!("overlap must be in [0, 1), got {}", self.overlap);
        }
        if self.window_length == 0 {
            bail!("window_length must be positive");
        }
        if self.split == Split::Train && self.virtual_len == 0 {
            bail!("virtual_len must be positive for the train split");
        }
        if let Some(wn) = self.lowpass {
            if wn <= 0.0 || wn >= 1.0 {
                bail!("lowpass cutoff must be in (0, 1), got {wn}");
            }
        }
        if let Some(len) = self.resize {
            if len == 0 {
                bail!("resize length must be positive");
            }
        }
        Ok(())
    }
}
