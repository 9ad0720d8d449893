//! Window selection policies.
//!
//! Two mutually exclusive ways of turning a [`Catalog`] into an indexable
//! sequence of windows: balanced random draws for training and exhaustive
//! deterministic enumeration for evaluation.  The policy is fixed at
//! construction; [`Selector`] dispatches between the two.
use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::Rng;

use crate::segment::{Catalog, Segment};

/// Balanced random selection over a configured virtual length.
///
/// Every draw picks a class id uniformly from `[0, class_count)` —
/// deliberately ignoring how many segments each class has, to counteract
/// label imbalance — then a segment uniformly from that class's list.
///
/// Explicit contract: `get(i)` is a function of the owned generator's
/// state, **not** of `i`; two calls with the same index may return
/// different windows.  Callers needing reproducibility must seed the
/// [`StdRng`] they pass in, and each concurrent consumer must own its own
/// selector (and generator) instance.
#[derive(Debug)]
pub struct BalancedSelector {
    length: usize,
    class_count: usize,
    rng: StdRng,
}

impl BalancedSelector {
    /// Validates up front that every class has at least one segment —
    /// a class the draw could land on with nothing to serve is a
    /// configuration error, rejected here rather than at access time.
    pub fn new(catalog: &Catalog, length: usize, rng: StdRng) -> Result<Self> {
        let empty = catalog.empty_classes();
        if !empty.is_empty() {
            bail!(
                "balanced sampling needs at least one segment per class; \
                 classes without segments: {empty:?}"
            );
        }
        Ok(Self { length, class_count: catalog.class_count(), rng })
    }

    /// The configured virtual length.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Draw a window for index `i`.  Fails if `i` is outside the virtual
    /// range.
    pub fn get(&mut self, catalog: &Catalog, index: usize) -> Result<Segment> {
        if index >= self.length {
            bail!("index {index} out of bounds for virtual length {}", self.length);
        }
        let class = self.rng.gen_range(0..self.class_count);
        let segments = catalog.segments(class);
        Ok(segments[self.rng.gen_range(0..segments.len())])
    }
}

/// Exhaustive deterministic enumeration of every catalogued window,
/// class-major (ascending class id) and in discovery order within each
/// class.  `get(i)` is a pure function of `i`.
pub struct ExhaustiveSelector {
    entries: Vec<Segment>,
}

impl ExhaustiveSelector {
    pub fn new(catalog: &Catalog) -> Self {
        Self { entries: catalog.iter_flat().collect() }
    }

    /// Total segment count across all classes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Segment> {
        match self.entries.get(index) {
            Some(&seg) => Ok(seg),
            None => bail!("index {index} out of bounds for {} windows", self.entries.len()),
        }
    }
}

/// The active selection policy of a dataset.
pub enum Selector {
    Balanced(BalancedSelector),
    Exhaustive(ExhaustiveSelector),
}

impl Selector {
    pub fn len(&self) -> usize {
        match self {
            Selector::Balanced(s) => s.len(),
            Selector::Exhaustive(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&mut self, catalog: &Catalog, index: usize) -> Result<Segment> {
        match self {
            Selector::Balanced(s) => s.get(catalog, index),
            Selector::Exhaustive(s) => s.get(index),
        }
    }
}
