//! classdist: load a recording, segment it, and print two class
//! distributions — the raw per-class window counts of the catalog, and the
//! per-class frequency of balanced random draws.  Shows how the balanced
//! policy flattens the label imbalance of the catalog.
use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use std::path::PathBuf;

use emgwin::{DatasetConfig, GestureDataset, Split};

#[derive(Parser)]
#[command(name = "classdist", about = "EMG window catalog diagnostics")]
struct Args {
    /// Dataset root containing the database directories (e.g. DB1/).
    #[arg(long)]
    root: PathBuf,

    /// Optional JSON DatasetConfig; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Databases to load (comma-separated), e.g. "DB1".
    #[arg(long)]
    databases: Option<String>,

    /// Experiments to load (comma-separated), e.g. "E1,E2,E3".
    #[arg(long)]
    experiments: Option<String>,

    /// Window length in timesteps.
    #[arg(long)]
    window_length: Option<usize>,

    /// Overlap fraction in [0, 1).
    #[arg(long)]
    overlap: Option<f64>,

    /// Normalized low-pass cutoff in (0, 1).
    #[arg(long)]
    lowpass: Option<f64>,

    /// Number of balanced draws for the sampled histogram.
    #[arg(long, default_value_t = 4096)]
    draws: usize,

    /// Seed for the draw generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => DatasetConfig::default(),
    };
    if let Some(dbs) = &args.databases {
        cfg.databases = dbs.split(',').map(str::to_string).collect();
    }
    if let Some(exps) = &args.experiments {
        cfg.experiments = exps.split(',').map(str::to_string).collect();
    }
    if let Some(wl) = args.window_length {
        cfg.window_length = wl;
    }
    if let Some(ov) = args.overlap {
        cfg.overlap = ov;
    }
    if let Some(wn) = args.lowpass {
        cfg.lowpass = Some(wn);
    }

    let recording = emgwin::load(&args.root, &cfg.databases, &cfg.experiments)?;
    println!(
        "Loaded {} timesteps × {} channels, {} classes",
        recording.len(),
        recording.channels(),
        recording.class_count()
    );

    // ── Catalog distribution ───────────────────────────────────────────────
    let valid_cfg = DatasetConfig { split: Split::Valid, ..cfg.clone() };
    let valid = GestureDataset::new(
        recording.clone(),
        &valid_cfg,
        StdRng::seed_from_u64(args.seed),
    )?;
    let catalog = valid.catalog();
    println!("\nCatalog: {} windows", catalog.total_segments());
    let counts: Vec<usize> = (0..catalog.class_count())
        .map(|c| catalog.segments(c).len())
        .collect();
    print_histogram(&counts);

    // ── Sampled distribution ───────────────────────────────────────────────
    let train_cfg = DatasetConfig {
        split: Split::Train,
        virtual_len: args.draws,
        ..cfg
    };
    match GestureDataset::new(recording, &train_cfg, StdRng::seed_from_u64(args.seed)) {
        Ok(mut train) => {
            let mut sampled = vec![0usize; train.class_count()];
            for i in 0..train.len() {
                let sample = train.get(i)?;
                sampled[sample.label[[0, 0]] as usize] += 1;
            }
            println!("\nBalanced draws: {}", args.draws);
            print_histogram(&sampled);
        }
        Err(err) => {
            eprintln!("\nBalanced sampling unavailable: {err:#}");
        }
    }

    Ok(())
}

/// One bar per class, scaled to 50 columns.
fn print_histogram(counts: &[usize]) {
    let peak = counts.iter().copied().max().unwrap_or(0).max(1);
    for (class, &n) in counts.iter().enumerate() {
        let width = n * 50 / peak;
        println!("{class:>4} {n:>7}  {}", "#".repeat(width));
    }
}
