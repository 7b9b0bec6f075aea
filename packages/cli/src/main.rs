#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the synthetic crime dataset toolchain.
//!
//! Generates CSVs from embedded profiles or TOML files, validates configs,
//! and summarizes generated datasets. Without a subcommand it falls back to
//! an interactive menu.
//!
//! Uses `indicatif-log-bridge` (via [`crime_synth_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crime_synth_generator::RunOptions;

use crate::commands::ConfigSource;

#[derive(Parser)]
#[command(name = "crime_synth", about = "Synthetic crime dataset generator")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a CSV dataset
    Generate {
        /// Embedded profile id (see `profiles`)
        #[arg(long, conflicts_with = "config")]
        profile: Option<String>,
        /// Path to a TOML generator config
        #[arg(long)]
        config: Option<PathBuf>,
        /// Number of records to attempt (overrides `record_count`)
        #[arg(long)]
        count: Option<u64>,
        /// Seed for the random stream (overrides `seed`)
        #[arg(long)]
        seed: Option<u64>,
        /// Destination CSV (overrides `output.path`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List embedded profiles
    Profiles,
    /// Load and validate a config without generating
    Validate {
        /// Embedded profile id
        #[arg(long, conflicts_with = "config")]
        profile: Option<String>,
        /// Path to a TOML generator config
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print descriptive statistics for a generated CSV
    Summarize {
        /// CSV file to read
        path: PathBuf,
        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_synth_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi);
    };

    match command {
        Commands::Generate {
            profile,
            config,
            count,
            seed,
            output,
        } => {
            let source = ConfigSource::from_args(profile, config);
            let options = RunOptions {
                count,
                seed,
                output,
            };
            commands::generate(&multi, &source, &options)?;
        }
        Commands::Profiles => commands::list_profiles()?,
        Commands::Validate { profile, config } => {
            commands::validate(&ConfigSource::from_args(profile, config))?;
        }
        Commands::Summarize { path, json } => commands::summarize(&path, json)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::try_parse_from([
            "crime_synth",
            "generate",
            "--profile",
            "asa_sul_grid",
            "--count",
            "50",
            "--seed",
            "9",
        ])
        .unwrap();
        let Some(Commands::Generate {
            profile,
            config,
            count,
            seed,
            output,
        }) = cli.command
        else {
            panic!("expected generate");
        };
        assert_eq!(profile.as_deref(), Some("asa_sul_grid"));
        assert!(config.is_none());
        assert_eq!(count, Some(50));
        assert_eq!(seed, Some(9));
        assert!(output.is_none());
    }

    #[test]
    fn profile_and_config_conflict() {
        let result = Cli::try_parse_from([
            "crime_synth",
            "validate",
            "--profile",
            "asa_sul_grid",
            "--config",
            "custom.toml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn config_source_defaults_to_default_profile() {
        let source = ConfigSource::from_args(None, None);
        assert!(matches!(
            source,
            ConfigSource::Profile(id) if id == crime_synth_generator::profiles::DEFAULT_PROFILE
        ));
        let source = ConfigSource::from_args(Some("x".into()), Some("y.toml".into()));
        assert!(matches!(source, ConfigSource::File(_)));
    }

    #[test]
    fn validate_and_generate_small_run() {
        let dir = std::env::temp_dir().join(format!("crime_synth_cli_{}", std::process::id()));
        let path = dir.join("out.csv");
        let source = ConfigSource::Profile("asa_sul_hotspots".to_string());
        commands::validate(&source).unwrap();

        let multi = crime_synth_cli_utils::MultiProgress::with_draw_target(
            indicatif::ProgressDrawTarget::hidden(),
        );
        let options = RunOptions {
            count: Some(40),
            seed: Some(3),
            output: Some(path.clone()),
        };
        commands::generate(&multi, &source, &options).unwrap();
        commands::summarize(&path, true).unwrap();

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
