//! Command implementations shared by the flag-driven and interactive modes.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crime_synth_analysis::DatasetSummary;
use crime_synth_cli_utils::{IndicatifProgress, MultiProgress};
use crime_synth_generator::config::HourDistribution;
use crime_synth_generator::{GeneratorConfig, RunOptions, profiles};

/// Where a generator config comes from.
pub enum ConfigSource {
    /// An embedded profile id.
    Profile(String),
    /// A TOML file on disk.
    File(PathBuf),
}

impl ConfigSource {
    /// Picks the file when given, else the profile, else the default profile.
    pub fn from_args(profile: Option<String>, config: Option<PathBuf>) -> Self {
        match (config, profile) {
            (Some(path), _) => Self::File(path),
            (None, Some(id)) => Self::Profile(id),
            (None, None) => Self::Profile(profiles::DEFAULT_PROFILE.to_string()),
        }
    }

    /// Loads and validates the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is unknown or the config is invalid.
    pub fn load(&self) -> Result<GeneratorConfig, crime_synth_generator::GenerateError> {
        match self {
            Self::Profile(id) => profiles::load_profile(id),
            Self::File(path) => crime_synth_generator::load_config(path),
        }
    }
}

/// Generates a dataset and prints where it went.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the CSV cannot be
/// written.
pub fn generate(
    multi: &MultiProgress,
    source: &ConfigSource,
    options: &RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = source.load()?;
    let start = Instant::now();

    let progress = IndicatifProgress::records_bar(multi, "Preparing generator...");
    let report = crime_synth_generator::run(&config, options, Some(progress))?;

    let elapsed = start.elapsed();
    log::info!(
        "Generated {} of {} records in {:.1}s",
        report.written,
        report.requested,
        elapsed.as_secs_f64()
    );

    println!("Wrote {} records to {}", report.written, report.path.display());
    println!("Seed: {}", report.seed);
    if report.dropped > 0 {
        println!("Dropped: {} (placement exhausted)", report.dropped);
    }
    if report.halted {
        println!("Run halted early.");
    }

    Ok(())
}

/// Prints every embedded profile.
///
/// # Errors
///
/// Returns an error if an embedded profile fails to load.
pub fn list_profiles() -> Result<(), Box<dyn std::error::Error>> {
    println!("{:<20} {:>8}  DESCRIPTION", "ID", "RECORDS");
    println!("{}", "-".repeat(70));
    for config in profiles::all_profiles()? {
        let marker = if config.name == profiles::DEFAULT_PROFILE {
            " (default)"
        } else {
            ""
        };
        println!(
            "{:<20} {:>8}  {}{marker}",
            config.name,
            config.record_count,
            config.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Loads a config and prints what it would generate.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or fails validation.
pub fn validate(source: &ConfigSource) -> Result<(), Box<dyn std::error::Error>> {
    let config = source.load()?;
    print_config(&config);
    Ok(())
}

fn print_config(config: &GeneratorConfig) {
    println!("Profile:     {} (valid)", config.name);
    if let Some(description) = &config.description {
        println!("             {description}");
    }
    println!("Records:     {}", config.record_count);
    println!(
        "Seed:        {}",
        config
            .seed
            .map_or_else(|| "from entropy".to_string(), |s| s.to_string())
    );
    println!("Window:      {} to {}", config.window.start, config.window.end);
    println!("Holidays:    {}", config.calendar.holidays.len());
    match config.hours {
        HourDistribution::Uniform => println!("Hours:       uniform"),
        HourDistribution::WrappedNormal { mean, std_dev } => {
            println!("Hours:       wrapped normal (mean {mean}, std dev {std_dev})");
        }
    }
    println!("Categories:  {}", config.categories.names.join(", "));
    println!(
        "Regions:     {} ({} anchors)",
        config.regions.len(),
        config.regions.iter().map(|r| r.anchors.len()).sum::<usize>()
    );
    println!(
        "Exclusions:  {} zones",
        config.placement.exclusion_zones.len()
    );
    let columns: Vec<&str> = config
        .output
        .columns
        .iter()
        .map(AsRef::<str>::as_ref)
        .chain(config.output.constant_columns.iter().map(|c| c.name.as_str()))
        .collect();
    println!("Columns:     {}", columns.join(", "));
    println!("Output:      {}", config.output.path.display());
}

/// Summarizes a CSV, as a report or as JSON.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the summary cannot be
/// serialized.
pub fn summarize(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let summary = crime_synth_analysis::summarize_path(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &DatasetSummary) {
    println!("Rows: {}", summary.rows);

    if !summary.missing.is_empty() {
        println!();
        println!("Missing values");
        for entry in &summary.missing {
            println!("  {:<14} {:>8}", entry.column, entry.missing);
        }
    }

    println!();
    println!("Categories");
    for share in &summary.categories {
        println!(
            "  {:<14} {:>8}  {:>6.2}%",
            share.category, share.count, share.percentage
        );
    }

    println!();
    println!("Records by hour");
    for entry in &summary.hours {
        let marker = if crime_synth_analysis::summary::is_nocturnal(entry.hour) {
            " *"
        } else {
            ""
        };
        println!("  {:02}h {:>8}{marker}", entry.hour, entry.count);
    }

    println!();
    println!("Top regions");
    for entry in &summary.top_regions {
        println!("  {:<24} {:>8}", entry.region, entry.count);
    }

    println!();
    println!("Riskiest regions (summed severity)");
    for entry in &summary.riskiest_regions {
        println!("  {:<24} {:>8}", entry.region, entry.risk);
    }

    println!();
    println!(
        "Severe incidents by hour ({})",
        crime_synth_analysis::summary::SEVERE_CATEGORIES.join(", ")
    );
    for entry in &summary.severe_by_hour {
        println!("  {:02}h {:>8}", entry.hour, entry.count);
    }

    println!();
    println!(
        "Nocturnal (19h-04h): {} ({:.2}%)",
        summary.nocturnal.count, summary.nocturnal.percentage
    );
    for share in &summary.nocturnal.by_category {
        println!(
            "  {:<14} {:>8}  {:>6.2}%",
            share.category, share.count, share.percentage
        );
    }

    println!();
    println!("Records by year");
    for entry in &summary.years {
        println!("  {} {:>8}", entry.year, entry.count);
    }

    if let Some(age) = &summary.age {
        println!();
        println!(
            "Age: n={} mean={:.1} median={:.1} sd={:.1} min={} max={}",
            age.count, age.mean, age.median, age.std_dev, age.min, age.max
        );
    }

    println!();
    match summary.category_region_cramers_v {
        Some(v) => println!("Cramér's V (category x region): {v:.4}"),
        None => println!("Cramér's V (category x region): n/a"),
    }
    println!(
        "Correlation ratio (age by category): {:.4}",
        summary.age_by_category_eta_squared
    );
}
