//! Interactive menu for the crime synth toolchain.
//!
//! Provides a menu-driven interface using `dialoguer` for running the
//! commands without memorizing CLI flags.

use std::path::PathBuf;

use crime_synth_cli_utils::MultiProgress;
use crime_synth_generator::{RunOptions, profiles};
use dialoguer::{Input, Select};

use crate::commands::{self, ConfigSource};

/// Top-level actions available in the interactive menu.
enum Action {
    Generate,
    ListProfiles,
    Validate,
    Summarize,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Generate,
        Self::ListProfiles,
        Self::Validate,
        Self::Summarize,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Generate => "Generate dataset",
            Self::ListProfiles => "List profiles",
            Self::Validate => "Validate config",
            Self::Summarize => "Summarize CSV",
        }
    }
}

/// Prompts the user to select and configure one command, then runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected command fails.
pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("Crime Synth Toolchain");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::Generate => generate(multi)?,
        Action::ListProfiles => commands::list_profiles()?,
        Action::Validate => commands::validate(&prompt_config_source()?)?,
        Action::Summarize => {
            let path: String = Input::new()
                .with_prompt("CSV file")
                .interact_text()?;
            commands::summarize(&PathBuf::from(path.trim()), false)?;
        }
    }

    Ok(())
}

fn generate(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let source = prompt_config_source()?;
    let count = prompt_optional_u64("Record count (empty for the profile's count)")?;
    let seed = prompt_optional_u64("Seed (empty for the profile's seed or a random one)")?;

    let output: String = Input::new()
        .with_prompt("Output CSV (empty for the profile's path)")
        .allow_empty(true)
        .interact_text()?;
    let output = Some(output.trim())
        .filter(|o| !o.is_empty())
        .map(PathBuf::from);

    commands::generate(
        multi,
        &source,
        &RunOptions {
            count,
            seed,
            output,
        },
    )
}

/// Lets the user pick an embedded profile or enter a TOML path.
fn prompt_config_source() -> Result<ConfigSource, Box<dyn std::error::Error>> {
    let ids = profiles::profile_ids();
    let mut labels: Vec<String> = ids
        .iter()
        .map(|id| {
            if *id == profiles::DEFAULT_PROFILE {
                format!("{id} (default)")
            } else {
                (*id).to_string()
            }
        })
        .collect();
    labels.push("Config file on disk...".to_string());

    let default = ids
        .iter()
        .position(|id| *id == profiles::DEFAULT_PROFILE)
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Profile")
        .items(&labels)
        .default(default)
        .interact()?;

    if let Some(id) = ids.get(idx) {
        return Ok(ConfigSource::Profile((*id).to_string()));
    }

    let path: String = Input::new()
        .with_prompt("Path to TOML config")
        .interact_text()?;
    Ok(ConfigSource::File(PathBuf::from(path.trim())))
}

fn prompt_optional_u64(prompt: &str) -> Result<Option<u64>, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    if input.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.trim().parse()?))
    }
}
