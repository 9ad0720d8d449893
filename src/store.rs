//! Recording store: session discovery, label offsetting, concatenation.
//!
//! One [`Recording`] holds the vertically concatenated `[T, C]` signal of
//! every requested (database, subject, experiment) session together with
//! its per-sample gesture labels.  Gesture classes from different
//! experiments are kept disjoint by adding a fixed per-experiment base to
//! every nonzero label; label 0 (rest) is shared and never offset.
use anyhow::{bail, Context, Result};
use ndarray::{Array2, Axis};
use regex::Regex;
use std::path::Path;

use crate::filter;
use crate::mat;

/// Class-id base per experiment: E1 holds 12 gestures and E2 another 17,
/// so E2 starts at 12 and E3 at 29.
const CLASS_BASE: &[(&str, i64)] = &[("E1", 0), ("E2", 12), ("E3", 29)];

fn class_base(experiment: &str) -> Result<i64> {
    CLASS_BASE
        .iter()
        .find(|(id, _)| *id == experiment)
        .map(|&(_, base)| base)
        .with_context(|| format!("unknown experiment id '{experiment}'"))
}

/// A concatenated multi-session recording: `[T, C]` signal plus `T` labels.
///
/// Immutable after load, apart from the optional one-time filtering pass
/// ([`Recording::filter_lowpass`] / [`Recording::filter_highpass`]) applied
/// before any statistics or segmentation.
#[derive(Debug, Clone)]
pub struct Recording {
    /// Time-major signal matrix, one row per timestep.
    pub data: Array2<f32>,
    /// Per-timestep gesture label, offsets already applied; 0 = rest.
    pub labels: Vec<i64>,
}

impl Recording {
    /// Build a recording from parts, enforcing the length invariant.
    pub fn new(data: Array2<f32>, labels: Vec<i64>) -> Result<Self> {
        if data.nrows() != labels.len() {
            bail!(
                "signal has {} timesteps but label vector has {}",
                data.nrows(),
                labels.len()
            );
        }
        if let Some(&bad) = labels.iter().find(|&&l| l < 0) {
            bail!("negative gesture label {bad}");
        }
        Ok(Self { data, labels })
    }

    /// Number of timesteps `T`.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of channels `C`.
    pub fn channels(&self) -> usize {
        self.data.ncols()
    }

    /// `1 + max(label)` over the whole recording, offsets included.
    ///
    /// Invariant across splits: both sampling policies index classes in
    /// `[0, class_count)`.
    pub fn class_count(&self) -> usize {
        self.labels.iter().copied().max().unwrap_or(0) as usize + 1
    }

    /// Zero-phase Butterworth low-pass, per channel, whole time axis.
    pub fn filter_lowpass(&mut self, wn: f64) -> Result<()> {
        let coeffs = filter::butter_lowpass(wn)?;
        filter::filtfilt_inplace(&mut self.data, &coeffs);
        Ok(())
    }

    /// Zero-phase Butterworth high-pass, per channel, whole time axis.
    pub fn filter_highpass(&mut self, wn: f64) -> Result<()> {
        let coeffs = filter::butter_highpass(wn)?;
        filter::filtfilt_inplace(&mut self.data, &coeffs);
        Ok(())
    }
}

/// Load and concatenate every requested session under `root`.
///
/// Layout per database:
/// * `DB1`:   `root/DB1/<dir>/<dir>/<subject>_A1_<exp>.mat`
/// * others:  `root/<db>/<dir>/<subject>_<exp>_A1.mat`
///
/// where `<subject>` is extracted from the subject directory name with the
/// pattern `_(s\d+)`.  Subject directories are visited in sorted order so
/// the concatenation is deterministic (class offsets do not depend on it).
///
/// Any missing path, malformed directory name or unreadable session file
/// aborts the whole load; no partial recording is produced.
pub fn load(root: &Path, databases: &[String], experiments: &[String]) -> Result<Recording> {
    let subject_re = Regex::new(r"_(s\d+)").expect("subject pattern is valid");

    let mut blocks: Vec<Array2<f32>> = Vec::new();
    let mut labels: Vec<i64> = Vec::new();

    for database in databases {
        let db_root = root.join(database);
        if !db_root.is_dir() {
            bail!("database path does not exist: {}", db_root.display());
        }

        let mut subject_dirs: Vec<String> = std::fs::read_dir(&db_root)
            .with_context(|| format!("listing {}", db_root.display()))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        subject_dirs.sort();

        for dir_name in &subject_dirs {
            let subject = subject_re
                .captures(dir_name)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .with_context(|| {
                    format!("cannot extract subject id from directory name '{dir_name}'")
                })?;

            for experiment in experiments {
                let base = class_base(experiment)?;
                let path = if database == "DB1" {
                    db_root
                        .join(dir_name)
                        .join(dir_name)
                        .join(format!("{subject}_A1_{experiment}.mat"))
                } else {
                    db_root
                        .join(dir_name)
                        .join(format!("{subject}_{experiment}_A1.mat"))
                };

                let (data, session_labels) = load_session(&path, base)?;
                log::debug!(
                    "loaded {}: {} × {} samples",
                    path.display(),
                    data.nrows(),
                    data.ncols()
                );

                if let Some(first) = blocks.first() {
                    if first.ncols() != data.ncols() {
                        bail!(
                            "channel count mismatch: {} has {} channels, expected {}",
                            path.display(),
                            data.ncols(),
                            first.ncols()
                        );
                    }
                }
                blocks.push(data);
                labels.extend(session_labels);
            }
        }
    }

    if blocks.is_empty() {
        bail!("no session files found under {}", root.display());
    }

    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    let data = ndarray::concatenate(Axis(0), &views).context("stacking sessions")?;
    log::info!(
        "recording assembled: {} timesteps × {} channels, {} sessions",
        data.nrows(),
        data.ncols(),
        blocks.len()
    );
    Recording::new(data, labels)
}

/// Parse one session file: the `emg` matrix and the offset `restimulus`
/// label column.
fn load_session(path: &Path, base: i64) -> Result<(Array2<f32>, Vec<i64>)> {
    let vars = mat::read_mat(path)?;

    let emg = vars
        .get("emg")
        .with_context(|| format!("variable 'emg' missing in {}", path.display()))?;
    let stim = vars
        .get("restimulus")
        .with_context(|| format!("variable 'restimulus' missing in {}", path.display()))?;

    if stim.nrows() != emg.nrows() {
        bail!(
            "{}: 'emg' has {} timesteps but 'restimulus' has {}",
            path.display(),
            emg.nrows(),
            stim.nrows()
        );
    }

    let data = emg.mapv(|v| v as f32);
    let labels: Vec<i64> = stim
        .column(0)
        .iter()
        .map(|&v| {
            let label = v as i64;
            if label != 0 { label + base } else { 0 }
        })
        .collect();

    Ok((data, labels))
}
