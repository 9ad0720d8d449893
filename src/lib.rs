//! # emgwin — NinaPro EMG gesture windowing in pure Rust
//!
//! `emgwin` turns long multi-channel EMG recordings with a per-sample
//! gesture label into a catalog of fixed-length, label-homogeneous
//! windows, and serves those windows either as balanced random draws
//! (training) or as an exhaustive deterministic sequence (evaluation),
//! optionally replacing raw windows with hand-crafted per-channel
//! features.
//!
//! ## Pipeline overview
//!
//! ```text
//! root/DB1/…/s1_A1_E1.mat
//!   │
//!   ├─ mat::read_mat()        native Level-5 MAT reader (no MATLAB/SciPy)
//!   ├─ store::load()          subject discovery, class-id offsets, vstack
//!   ├─ filter (optional)      zero-phase Butterworth low-pass, per channel
//!   ├─ stats::compute_stats() per-channel μ/σ + global min/max, once
//!   ├─ segment::segment()     sliding scan → per-class window catalog
//!   ├─ select                 balanced-random  OR  exhaustive-sequential
//!   └─ transform chain        normalize → (resize) → layout / features
//!        │
//!        └─→ Sample { data, label, mean, std }
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use emgwin::{open_dataset, DatasetConfig, Split};
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::path::Path;
//!
//! let cfg = DatasetConfig {
//!     split: Split::Train,
//!     virtual_len: 1024,
//!     window_length: 128,
//!     overlap: 0.6,
//!     ..DatasetConfig::default()
//! };
//!
//! // Balanced draws depend on the generator you pass in — seed it for
//! // reproducible epochs.
//! let mut ds = open_dataset(
//!     Path::new("/data/NinaproDataset"),
//!     &cfg,
//!     StdRng::seed_from_u64(42),
//! ).unwrap();
//!
//! for i in 0..ds.len() {
//!     let sample = ds.get(i).unwrap();   // data [C, 128], label [1, 1]
//!     println!("class {}", sample.label[[0, 0]]);
//! }
//! ```
//!
//! ## Feature vectors instead of raw windows
//!
//! ```no_run
//! use emgwin::{open_dataset, DatasetConfig, FeatureExtract, Normalize, Transform};
//! use rand::{rngs::StdRng, SeedableRng};
//! use std::path::Path;
//!
//! let cfg = DatasetConfig::default();
//! let chain: Vec<Box<dyn Transform>> =
//!     vec![Box::new(Normalize), Box::new(FeatureExtract::new())];
//! let mut ds = open_dataset(Path::new("/data/NinaproDataset"), &cfg,
//!     StdRng::seed_from_u64(0)).unwrap()
//!     .with_transforms(chain);
//!
//! let sample = ds.get(0).unwrap();       // data [5 · C]: rms/mav/zc/ssc/var
//! println!("{} feature values", sample.data.len());
//! ```

pub mod config;
pub mod dataset;
pub mod features;
pub mod filter;
pub mod mat;
pub mod matwriter;
pub mod segment;
pub mod select;
pub mod stats;
pub mod store;
pub mod transform;

use anyhow::Result;
use rand::rngs::StdRng;
use std::path::Path;

// ── Crate-root re-exports ─────────────────────────────────────────────────
//
// Everything a downstream user is likely to need is available directly as
// `emgwin::Foo` without having to know the internal module layout.

// config
pub use config::{DatasetConfig, Split};

// dataset
pub use dataset::GestureDataset;

// store
pub use store::{load, Recording};

// stats
pub use stats::{compute_stats, ChannelStats};

// segment
pub use segment::{segment, Catalog, Segment};

// select
pub use select::{BalancedSelector, ExhaustiveSelector, Selector};

// transform
pub use transform::{apply_all, ChannelMajor, Normalize, Resize, Sample, Transform};

// features
pub use features::{
    mav, rms, slope_sign_changes, variance, zero_crossings,
    FeatureExtract, FeatureFn, FEATURES,
};

// filter
pub use filter::{butter_highpass, butter_lowpass, filtfilt_1d, filtfilt_inplace};

// mat
pub use mat::{parse_mat, read_mat};
pub use matwriter::{write_mat, write_mat_bytes, MatVar};

/// Load every configured session under `root` and build a
/// [`GestureDataset`] over the concatenated recording.
///
/// This is the main entry point: it runs `store::load`, applies the
/// optional low-pass stage, computes the global statistics, builds the
/// window catalog and installs the split's selection policy plus the
/// default transform chain.
///
/// The `rng` is owned by the returned dataset and only consulted under
/// [`Split::Train`]; pass a seeded [`StdRng`] for reproducible draws, and
/// give every concurrent consumer its own dataset and generator.
///
/// # Errors
///
/// Fails when the root or a session file is missing, a subject directory
/// name is malformed, the configuration is invalid (`overlap ∉ [0, 1)`,
/// zero window length), or — under the train split — some class has no
/// catalogued window.
pub fn open_dataset(
    root: &Path,
    cfg: &DatasetConfig,
    rng: StdRng,
) -> Result<GestureDataset> {
    let recording = store::load(root, &cfg.databases, &cfg.experiments)?;
    GestureDataset::new(recording, cfg, rng)
}
