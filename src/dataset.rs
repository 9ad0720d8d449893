//! Dataset assembly: recording → stats → catalog → selector → samples.
//!
//! [`GestureDataset`] chains the stage modules in the fixed order the
//! pipeline requires: the optional filtering pass first, then global
//! statistics, then segmentation, then the split's selection policy.
//! Every `get` slices the selected window out of the recording and runs
//! it through the transform chain.
use anyhow::Result;
use ndarray::s;
use rand::rngs::StdRng;

use crate::config::{DatasetConfig, Split};
use crate::segment::{segment, Catalog};
use crate::select::{BalancedSelector, ExhaustiveSelector, Selector};
use crate::stats::{compute_stats, ChannelStats};
use crate::store::Recording;
use crate::transform::{apply_all, ChannelMajor, Normalize, Resize, Sample, Transform};

/// An indexable view over the label-homogeneous windows of one recording.
///
/// Under [`Split::Train`] indexing is balanced-random (see
/// [`BalancedSelector`] for the non-determinism contract — pass a seeded
/// generator for reproducibility); under [`Split::Valid`] it enumerates
/// every window deterministically.
pub struct GestureDataset {
    recording: Recording,
    stats: ChannelStats,
    catalog: Catalog,
    selector: Selector,
    transforms: Vec<Box<dyn Transform>>,
}

impl std::fmt::Debug for GestureDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureDataset")
            .field("stats", &self.stats)
            .field("catalog", &self.catalog)
            .field("selector_len", &self.selector.len())
            .field("transforms", &self.transforms.len())
            .finish()
    }
}

impl GestureDataset {
    /// Build a dataset over `recording`.
    ///
    /// The generator is owned by this dataset; each concurrent consumer
    /// builds its own dataset with its own generator.  The default
    /// transform chain is `Normalize` → (`Resize` if configured) →
    /// `ChannelMajor`; replace it with [`Self::with_transforms`].
    pub fn new(mut recording: Recording, cfg: &DatasetConfig, rng: StdRng) -> Result<Self> {
        cfg.validate()?;

        if let Some(wn) = cfg.lowpass {
            recording.filter_lowpass(wn)?;
        }

        let stats = compute_stats(&recording);
        let catalog = segment(&recording, cfg.window_length, cfg.overlap)?;
        log::info!(
            "catalog built: {} windows across {} classes",
            catalog.total_segments(),
            catalog.class_count()
        );

        let selector = match cfg.split {
            Split::Train => {
                Selector::Balanced(BalancedSelector::new(&catalog, cfg.virtual_len, rng)?)
            }
            Split::Valid => Selector::Exhaustive(ExhaustiveSelector::new(&catalog)),
        };

        let mut transforms: Vec<Box<dyn Transform>> = vec![Box::new(Normalize)];
        if let Some(len) = cfg.resize {
            transforms.push(Box::new(Resize { len }));
        }
        transforms.push(Box::new(ChannelMajor { leading_axis: false }));

        Ok(Self { recording, stats, catalog, selector, transforms })
    }

    /// Replace the transform chain, e.g. to end in
    /// [`FeatureExtract`](crate::features::FeatureExtract).
    pub fn with_transforms(mut self, transforms: Vec<Box<dyn Transform>>) -> Self {
        self.transforms = transforms;
        self
    }

    /// Virtual length (train) or total window count (valid).
    pub fn len(&self) -> usize {
        self.selector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selector.is_empty()
    }

    /// Serve the sample for `index`: select a window, slice it out and run
    /// the transform chain.  Fails on an out-of-range index.
    pub fn get(&mut self, index: usize) -> Result<Sample> {
        let seg = self.selector.get(&self.catalog, index)?;
        let window = self.recording.data.slice(s![seg.start..seg.end, ..]).to_owned();
        let sample = Sample::new(window, seg.class as i64, &self.stats);
        apply_all(&self.transforms, sample)
    }

    /// `1 + max(label)`, invariant across splits.
    pub fn class_count(&self) -> usize {
        self.recording.class_count()
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }
}
