#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Weighted synthetic crime-record generator.
//!
//! A run is driven entirely by a [`GeneratorConfig`]: timestamps are drawn
//! inside a historical window, classified by day type, and used to pick a
//! category and region from weighted tables. Locations are jittered around
//! region anchors while avoiding exclusion zones, ages come from priority
//! bands or a two-component mixture, and fake identities are filled in
//! before per-field missingness is applied. Records go to CSV atomically.
//!
//! Every random decision reads from one explicitly passed, seeded
//! `ChaCha20Rng`, so a config plus a seed reproduces a dataset exactly.

pub mod age;
pub mod calendar;
pub mod category;
pub mod config;
pub mod generator;
pub mod identity;
pub mod missingness;
pub mod output;
pub mod placement;
pub mod profiles;
pub mod progress;
pub mod region;

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use config::{ConfigError, GeneratorConfig};
pub use generator::{Generator, Records, Sampler};

use progress::ProgressCallback;

/// Number of records between progress updates.
const PROGRESS_INTERVAL: u64 = 1_000;

/// Upper bound on the up-front record buffer. Larger runs grow on demand.
const MAX_PREALLOCATED_RECORDS: u64 = 65_536;

/// Errors that can end a generation run.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The configuration failed to parse or validate.
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// I/O error (config read, CSV write, rename).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A config file on disk is not valid TOML for the schema.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No embedded profile has the requested id.
    #[error("Unknown profile '{id}' (available: {available})")]
    UnknownProfile {
        /// The requested id.
        id: String,
        /// Comma-separated list of registered ids.
        available: String,
    },
}

/// Per-run overrides applied on top of a config.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Replaces `record_count`.
    pub count: Option<u64>,
    /// Replaces `seed`.
    pub seed: Option<u64>,
    /// Replaces `output.path`.
    pub output: Option<PathBuf>,
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Seed the run used (configured, overridden or drawn from entropy).
    pub seed: u64,
    /// Attempts requested.
    pub requested: u64,
    /// Records written.
    pub written: u64,
    /// Attempts dropped after placement exhaustion.
    pub dropped: u64,
    /// Whether the run stopped early under the `halt` policy.
    pub halted: bool,
    /// Destination file.
    pub path: PathBuf,
}

/// Reads and validates a config file from disk.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] if the file cannot be read,
/// [`GenerateError::Toml`] if it does not match the schema, or
/// [`GenerateError::Config`] if it fails validation.
pub fn load_config(path: &Path) -> Result<GeneratorConfig, GenerateError> {
    let contents = std::fs::read_to_string(path)?;
    let config: GeneratorConfig = toml::de::from_str(&contents)?;
    config.validate()?;
    log::debug!("Loaded config '{}' from {}", config.name, path.display());
    Ok(config)
}

/// Generates records for `config` and writes them to CSV.
///
/// Records are collected in memory and written once at the end, so an
/// interrupted run never leaves a partial file at the destination.
///
/// # Errors
///
/// Returns [`GenerateError`] if the config is invalid or the CSV cannot be
/// written.
pub fn run(
    config: &GeneratorConfig,
    options: &RunOptions,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> Result<GenerationReport, GenerateError> {
    let progress = progress.unwrap_or_else(progress::null_progress);
    let requested = options.count.unwrap_or(config.record_count);
    let path = options
        .output
        .clone()
        .unwrap_or_else(|| config.output.path.clone());

    let mut generator = match options.seed {
        Some(seed) => Generator::new(config, seed)?,
        None => Generator::from_config(config)?,
    };
    let seed = generator.seed();

    log::info!(
        "Generating {requested} records with profile '{}' (seed {seed})",
        config.name
    );
    progress.set_total(requested);
    progress.set_message(format!("Generating {}", config.name));

    let capacity = requested.min(MAX_PREALLOCATED_RECORDS);
    let mut records = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));
    let mut iter = generator.generate(requested);
    let mut reported = 0;
    for record in iter.by_ref() {
        records.push(record);
        let so_far = records.len() as u64;
        if so_far - reported >= PROGRESS_INTERVAL {
            progress.inc(so_far - reported);
            reported = so_far;
        }
    }
    let dropped = iter.dropped();
    let halted = iter.halted();
    // Dropped attempts count toward the bar, so it ends at the attempt total.
    progress.inc(records.len() as u64 + dropped - reported);

    if dropped > 0 {
        log::info!("Dropped {dropped} attempts after placement exhaustion");
    }
    if halted {
        log::warn!("Run halted early after {} records", records.len());
    }

    let written = output::write_csv(&path, &config.output, &records)?;
    log::info!("Wrote {written} records to {}", path.display());
    progress.finish(format!("{written} records"));

    Ok(GenerationReport {
        seed,
        requested,
        written,
        dropped,
        halted,
        path,
    })
}
