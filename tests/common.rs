/// Shared helpers: synthetic NinaPro directory trees written to a
/// per-test temp directory.
use anyhow::Result;
use emgwin::{write_mat, MatVar};
use std::path::{Path, PathBuf};

/// Fresh per-test root under the system temp dir.
#[allow(unused)]
pub fn temp_root(tag: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("emgwin-{tag}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&path);
    path
}

/// Deterministic session signal: channel `c` at timestep `t` is
/// `offset + c + t / 100`, column-major as MATLAB stores it.
#[allow(unused)]
pub fn session_signal(t: usize, channels: usize, offset: f64) -> Vec<f64> {
    let mut vals = Vec::with_capacity(t * channels);
    for c in 0..channels {
        for ti in 0..t {
            vals.push(offset + c as f64 + ti as f64 * 0.01);
        }
    }
    vals
}

/// Write one DB1-convention session file:
/// `root/DB1/<dir>/<dir>/<subject>_A1_<exp>.mat`.
#[allow(unused)]
pub fn write_db1_session(
    root: &Path,
    dir: &str,
    subject: &str,
    exp: &str,
    channels: usize,
    labels: &[u8],
    offset: f64,
) -> Result<()> {
    let t = labels.len();
    let path = root
        .join("DB1")
        .join(dir)
        .join(dir)
        .join(format!("{subject}_A1_{exp}.mat"));
    write_mat(
        &path,
        &[
            MatVar::f64("emg", t, channels, &session_signal(t, channels, offset)),
            MatVar::u8("restimulus", t, 1, labels),
        ],
    )
}

/// Write one non-DB1-convention session file:
/// `root/<db>/<dir>/<subject>_<exp>_A1.mat`.
#[allow(unused)]
pub fn write_db_session(
    root: &Path,
    db: &str,
    dir: &str,
    subject: &str,
    exp: &str,
    channels: usize,
    labels: &[u8],
    offset: f64,
) -> Result<()> {
    let t = labels.len();
    let path = root
        .join(db)
        .join(dir)
        .join(format!("{subject}_{exp}_A1.mat"));
    write_mat(
        &path,
        &[
            MatVar::f64("emg", t, channels, &session_signal(t, channels, offset)),
            MatVar::u8("restimulus", t, 1, labels),
        ],
    )
}

/// A label stream with generous per-class runs: rest around two gestures.
#[allow(unused)]
pub fn gesture_labels(run: usize) -> Vec<u8> {
    let mut labels = Vec::new();
    labels.extend(std::iter::repeat(0u8).take(run));
    labels.extend(std::iter::repeat(1u8).take(run));
    labels.extend(std::iter::repeat(0u8).take(run));
    labels.extend(std::iter::repeat(2u8).take(run));
    labels.extend(std::iter::repeat(0u8).take(run));
    labels
}
