//! Config-driven generator definition.
//!
//! [`GeneratorConfig`] captures every static table a generation run needs
//! (date window, holidays, category weights, region table, placement and
//! age rules, missingness rates, output layout) in one versioned,
//! serializable document. The near-duplicate scripts this replaces differ
//! only in these tables, so each variant becomes a TOML profile.
//!
//! [`GeneratorConfig::validate`] checks the whole document up front so that
//! malformed configuration fails before the first record is drawn.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{NaiveDate, Weekday};
use crime_synth_incident_models::{Column, CrimeSeverity, DayType, MissableField};
use serde::Deserialize;

/// Current configuration schema version.
pub const CONFIG_VERSION: u32 = 1;

/// Youngest age the generator will ever emit.
pub const MIN_AGE: u8 = 7;

/// Oldest age the generator will ever emit.
pub const MAX_AGE: u8 = 90;

/// Errors detected while parsing or validating a [`GeneratorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document could not be deserialized.
    #[error("Config parse error: {message}")]
    Parse {
        /// Deserializer message, including the offending location.
        message: String,
    },

    /// The document declares a schema version this build does not know.
    #[error("Unsupported config version {found} (expected {})", CONFIG_VERSION)]
    UnsupportedVersion {
        /// Version found in the document.
        found: u32,
    },

    /// A required table has no entries.
    #[error("Table '{table}' must not be empty")]
    EmptyTable {
        /// Name of the empty table.
        table: &'static str,
    },

    /// A name appears twice in a table that requires unique names.
    #[error("Duplicate {kind} '{name}'")]
    Duplicate {
        /// What kind of entry was duplicated.
        kind: &'static str,
        /// The repeated name.
        name: String,
    },

    /// A weight vector does not have one entry per category.
    #[error("Weight vector '{table}' has {actual} entries, expected {expected}")]
    WeightLength {
        /// Which weight vector is wrong.
        table: String,
        /// Number of configured categories.
        expected: usize,
        /// Number of entries found.
        actual: usize,
    },

    /// A weight is negative or not finite.
    #[error("Weight vector '{table}' contains invalid weight {value}")]
    InvalidWeight {
        /// Which weight vector is wrong.
        table: String,
        /// The offending value.
        value: f64,
    },

    /// Every weight in a vector is zero, so nothing could ever be drawn.
    #[error("Weight vector '{table}' has no positive weight")]
    AllZeroWeights {
        /// Which weight vector is wrong.
        table: String,
    },

    /// A table references a category that is not configured.
    #[error("{context} references unknown category '{name}'")]
    UnknownCategory {
        /// Where the reference was found.
        context: String,
        /// The unknown category name.
        name: String,
    },

    /// A table references a region that is not configured.
    #[error("{context} references unknown region '{name}'")]
    UnknownRegion {
        /// Where the reference was found.
        context: String,
        /// The unknown region name.
        name: String,
    },

    /// A region has no base coordinates.
    #[error("Region '{region}' has no anchors")]
    EmptyAnchors {
        /// The region without anchors.
        region: String,
    },

    /// A coordinate is outside WGS84 bounds or not finite.
    #[error("{context} has invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate {
        /// Where the coordinate was found.
        context: String,
        /// Latitude as configured.
        latitude: f64,
        /// Longitude as configured.
        longitude: f64,
    },

    /// The historical window ends before it starts.
    #[error("Window start {start} is after end {end}")]
    InvalidWindow {
        /// Configured start date.
        start: NaiveDate,
        /// Configured end date.
        end: NaiveDate,
    },

    /// The two weekend days are the same.
    #[error("Weekend days must be two distinct weekdays, got {day} twice")]
    DuplicateWeekendDays {
        /// The repeated day.
        day: Weekday,
    },

    /// An hour outside 0-23.
    #[error("{context} has invalid hour {hour}")]
    InvalidHour {
        /// Where the hour was found.
        context: &'static str,
        /// The offending value.
        hour: u32,
    },

    /// A negative, non-finite, or otherwise unusable scalar parameter.
    #[error("{context} has invalid value {value}")]
    InvalidParameter {
        /// Which parameter is wrong.
        context: String,
        /// The offending value.
        value: f64,
    },

    /// A probability outside `[0, 1]`.
    #[error("Probability for '{field}' must be within [0, 1], got {value}")]
    InvalidProbability {
        /// Which probability is wrong.
        field: String,
        /// The offending value.
        value: f64,
    },

    /// Age bounds are inverted or fall outside the global age range.
    #[error(
        "{context} has invalid age bounds {min}..={max} (allowed {}..={})",
        MIN_AGE,
        MAX_AGE
    )]
    InvalidAgeBounds {
        /// Where the bounds were found.
        context: String,
        /// Lower bound.
        min: u8,
        /// Upper bound.
        max: u8,
    },

    /// A severity outside 1-5.
    #[error("Category '{category}' has invalid severity {value}: expected 1-5")]
    InvalidSeverity {
        /// The category whose severity is wrong.
        category: String,
        /// The offending value.
        value: u8,
    },

    /// Regional category weighting and category-preferred regions both need
    /// the other's result first.
    #[error(
        "categories.regional_weighting cannot be combined with preferred_regions: \
         one draws the region first, the other draws the category first"
    )]
    ConflictingRegionWeighting,

    /// Placement retries are disabled.
    #[error("placement.max_attempts must be at least 1")]
    ZeroAttempts,

    /// The CSV would have no data columns.
    #[error("output.columns must list at least one column")]
    NoColumns,
}

/// A complete, config-driven generator definition.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Schema version, must equal [`CONFIG_VERSION`].
    pub version: u32,
    /// Profile name (e.g., `"asa_sul_sectors"`).
    pub name: String,
    /// Human-readable description of what this profile produces.
    #[serde(default)]
    pub description: Option<String>,
    /// Number of records to attempt.
    pub record_count: u64,
    /// Seed for the random stream. Drawn from OS entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Historical window for timestamps.
    pub window: DateWindow,
    /// Weekend days and holidays.
    #[serde(default)]
    pub calendar: CalendarConfig,
    /// Hour-of-day distribution.
    #[serde(default)]
    pub hours: HourDistribution,
    /// Category names and weight vectors.
    pub categories: CategoryConfig,
    /// Late-night severity bias. Disabled when absent.
    #[serde(default)]
    pub nocturnal: Option<NocturnalConfig>,
    /// Region table.
    pub regions: Vec<RegionConfig>,
    /// Category to preferred-region table. Disabled when absent.
    #[serde(default)]
    pub preferred_regions: Option<PreferredRegionsConfig>,
    /// Jitter and exclusion zones.
    pub placement: PlacementConfig,
    /// Age bounds, priority rules and mixture components.
    pub age: AgeConfig,
    /// Fake identity provider settings.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Per-field missing-value probabilities.
    #[serde(default)]
    pub missingness: MissingnessConfig,
    /// CSV layout and destination.
    pub output: OutputConfig,
}

/// Inclusive date range that bounds every generated timestamp.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateWindow {
    /// First date that may be generated.
    pub start: NaiveDate,
    /// Last date that may be generated (up to 23:59 on that day).
    pub end: NaiveDate,
}

/// Calendar used by day-type classification.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// The two weekdays treated as weekend.
    #[serde(default = "default_weekend_days")]
    pub weekend_days: [Weekday; 2],
    /// Holiday dates. A holiday that falls on a weekend day stays a weekend.
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            weekend_days: default_weekend_days(),
            holidays: BTreeSet::new(),
        }
    }
}

const fn default_weekend_days() -> [Weekday; 2] {
    [Weekday::Fri, Weekday::Sat]
}

/// Hour-of-day distribution for generated timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HourDistribution {
    /// Every hour 0-23 equally likely.
    #[default]
    Uniform,
    /// Normal draw truncated toward zero, then taken modulo 24.
    WrappedNormal {
        /// Mean hour (may exceed 23; it wraps).
        mean: f64,
        /// Standard deviation in hours.
        std_dev: f64,
    },
}

/// Category names, per-day-type weights and severities.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    /// Category names, in weight-vector order.
    pub names: Vec<String>,
    /// Multiply day-type weights by each region's `category_multipliers`.
    #[serde(default)]
    pub regional_weighting: bool,
    /// Relative weights per day type.
    pub day_type_weights: DayTypeWeights,
    /// Severity (1-5) per category name. Unlisted categories weigh 1.
    #[serde(default)]
    pub severity: BTreeMap<String, u8>,
}

impl CategoryConfig {
    /// Severity weight for a category name, defaulting to 1.
    #[must_use]
    pub fn severity_of(&self, category: Option<&str>) -> u8 {
        category
            .and_then(|name| self.severity.get(name).copied())
            .unwrap_or(1)
    }
}

/// One relative weight vector per day type.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayTypeWeights {
    pub weekday: Vec<f64>,
    pub weekend: Vec<f64>,
    pub holiday: Vec<f64>,
}

impl DayTypeWeights {
    /// Weight vector for the given day type.
    #[must_use]
    pub fn for_day_type(&self, day_type: DayType) -> &[f64] {
        match day_type {
            DayType::Weekday => &self.weekday,
            DayType::Weekend => &self.weekend,
            DayType::Holiday => &self.holiday,
        }
    }
}

/// Late-night bias toward keeping severe categories.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NocturnalConfig {
    /// First hour of the window (inclusive).
    pub start_hour: u32,
    /// Hour the window ends (exclusive). Wraps midnight when lower than
    /// `start_hour`.
    pub end_hour: u32,
    /// Categories the bias applies to.
    pub severe: Vec<String>,
    /// Copies of the drawn category in the candidate list.
    #[serde(default = "default_replicas")]
    pub replicas: usize,
    /// Fresh draws added to the candidate list.
    #[serde(default = "default_fresh_draws")]
    pub fresh_draws: usize,
    /// Weight fresh draws by the day-type vector instead of uniformly.
    #[serde(default)]
    pub weighted_fresh_draws: bool,
}

const fn default_replicas() -> usize {
    3
}

const fn default_fresh_draws() -> usize {
    1
}

/// A named zone with one or more base coordinates.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegionConfig {
    /// Region name, emitted in the `region` column.
    pub name: String,
    /// Base coordinates as `[latitude, longitude]`.
    pub anchors: Vec<[f64; 2]>,
    /// Relative likelihood of choosing this region.
    #[serde(default = "default_one")]
    pub selection_weight: f64,
    /// Jitter override for this region.
    #[serde(default)]
    pub jitter: Option<f64>,
    /// Element-wise multipliers on category weights when regional
    /// weighting is enabled. All ones when absent.
    #[serde(default)]
    pub category_multipliers: Option<Vec<f64>>,
    /// Multipliers on `selection_weight` per day type.
    #[serde(default)]
    pub day_type_multipliers: DayTypeMultipliers,
}

/// Per-day-type scalar multipliers.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayTypeMultipliers {
    #[serde(default = "default_one")]
    pub weekday: f64,
    #[serde(default = "default_one")]
    pub weekend: f64,
    #[serde(default = "default_one")]
    pub holiday: f64,
}

impl Default for DayTypeMultipliers {
    fn default() -> Self {
        Self {
            weekday: 1.0,
            weekend: 1.0,
            holiday: 1.0,
        }
    }
}

impl DayTypeMultipliers {
    /// Multiplier for the given day type.
    #[must_use]
    pub const fn for_day_type(&self, day_type: DayType) -> f64 {
        match day_type {
            DayType::Weekday => self.weekday,
            DayType::Weekend => self.weekend,
            DayType::Holiday => self.holiday,
        }
    }
}

const fn default_one() -> f64 {
    1.0
}

/// Category to preferred-regions table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreferredRegionsConfig {
    /// Weight multiplier applied to preferred regions.
    #[serde(default = "default_multiplicity")]
    pub multiplicity: f64,
    /// Category name to preferred region names.
    pub categories: BTreeMap<String, Vec<String>>,
}

const fn default_multiplicity() -> f64 {
    3.0
}

/// What to do when a record cannot be placed outside every exclusion zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustionPolicy {
    /// Skip the record and keep generating.
    #[default]
    Drop,
    /// Skip the record and end the run.
    Halt,
}

/// A circular area in which locations are disallowed.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExclusionZone {
    /// Centre as `[latitude, longitude]`.
    pub center: [f64; 2],
    /// Radius in degrees.
    pub radius: f64,
}

/// Jitter and exclusion-zone settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementConfig {
    /// Default jitter half-width in degrees, per axis.
    pub jitter: f64,
    /// Jitter overrides per category name (usually tighter for severe ones).
    #[serde(default)]
    pub category_jitter: BTreeMap<String, f64>,
    /// Attempts before giving up on a record.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Behaviour after the last failed attempt.
    #[serde(default)]
    pub on_exhaustion: ExhaustionPolicy,
    /// Disallowed circular areas.
    #[serde(default)]
    pub exclusion_zones: Vec<ExclusionZone>,
}

const fn default_max_attempts() -> u32 {
    10
}

/// Age bounds, priority rules and the fallback mixture.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeConfig {
    #[serde(default = "default_min_age")]
    pub min: u8,
    #[serde(default = "default_max_age")]
    pub max: u8,
    /// First matching rule wins.
    #[serde(default)]
    pub priority_rules: Vec<AgeRule>,
    /// First mixture component (tried with `young.probability`).
    pub young: AgeComponent,
    /// Second mixture component (tried with `old.probability` when the
    /// young roll fails). Uniform over `[min, max]` otherwise.
    pub old: AgeComponent,
}

const fn default_min_age() -> u8 {
    MIN_AGE
}

const fn default_max_age() -> u8 {
    MAX_AGE
}

/// Uniform age band for a region and/or category.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeRule {
    /// Region to match. Any region when absent.
    #[serde(default)]
    pub region: Option<String>,
    /// Category to match. Any category when absent.
    #[serde(default)]
    pub category: Option<String>,
    pub min: u8,
    pub max: u8,
}

/// One mixture component.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeComponent {
    /// Probability of using this component when it is reached.
    pub probability: f64,
    pub distribution: AgeDistribution,
}

/// Shape of an age mixture component.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgeDistribution {
    Normal { mean: f64, std_dev: f64 },
    Uniform { min: u8, max: u8 },
}

/// Fake identity provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityConfig {
    /// Leading digit of generated national ids.
    #[serde(default)]
    pub national_id_prefix: u8,
    /// Area code used for phone numbers.
    #[serde(default = "default_area_code")]
    pub phone_area_code: String,
    /// Domains used for e-mail addresses.
    #[serde(default = "default_email_domains")]
    pub email_domains: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            national_id_prefix: 0,
            phone_area_code: default_area_code(),
            email_domains: default_email_domains(),
        }
    }
}

fn default_area_code() -> String {
    "61".to_string()
}

fn default_email_domains() -> Vec<String> {
    ["gmail.com", "hotmail.com", "yahoo.com.br", "uol.com.br", "bol.com.br"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Per-field missing-value probabilities. Unlisted fields are never blanked.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MissingnessConfig {
    #[serde(default)]
    pub name: f64,
    #[serde(default)]
    pub national_id: f64,
    #[serde(default)]
    pub email: f64,
    #[serde(default)]
    pub phone: f64,
    #[serde(default)]
    pub address: f64,
    #[serde(default)]
    pub age: f64,
    #[serde(default)]
    pub category: f64,
    #[serde(default)]
    pub time_of_day: f64,
}

impl MissingnessConfig {
    /// Probability that `field` is blanked.
    #[must_use]
    pub const fn rate(&self, field: MissableField) -> f64 {
        match field {
            MissableField::Name => self.name,
            MissableField::NationalId => self.national_id,
            MissableField::Email => self.email,
            MissableField::Phone => self.phone,
            MissableField::Address => self.address,
            MissableField::Age => self.age,
            MissableField::Category => self.category,
            MissableField::TimeOfDay => self.time_of_day,
        }
    }
}

/// CSV layout and destination.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Destination file.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    /// Fixed area label for the `neighborhood` column.
    #[serde(default)]
    pub neighborhood: String,
    /// Columns in output order.
    pub columns: Vec<Column>,
    /// Extra columns with a fixed value, appended after `columns`.
    #[serde(default)]
    pub constant_columns: Vec<ConstantColumn>,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("incidents.csv")
}

/// A column whose every cell holds the same value.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstantColumn {
    /// Header name.
    pub name: String,
    /// Cell value. Every cell is empty when absent.
    #[serde(default)]
    pub value: Option<String>,
}

impl GeneratorConfig {
    /// Parses a TOML document. Does not validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid TOML or
    /// does not match the schema.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        toml::de::from_str(toml_str).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Index of a category name.
    #[must_use]
    pub fn category_index(&self, name: &str) -> Option<usize> {
        self.categories.names.iter().position(|c| c == name)
    }

    /// Index of a region name.
    #[must_use]
    pub fn region_index(&self, name: &str) -> Option<usize> {
        self.regions.iter().position(|r| r.name == name)
    }

    /// Checks every table for consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
            });
        }
        if self.window.start > self.window.end {
            return Err(ConfigError::InvalidWindow {
                start: self.window.start,
                end: self.window.end,
            });
        }
        let [first, second] = self.calendar.weekend_days;
        if first == second {
            return Err(ConfigError::DuplicateWeekendDays { day: first });
        }
        if let HourDistribution::WrappedNormal { mean, std_dev } = self.hours {
            check_finite("hours.mean", mean)?;
            check_positive("hours.std_dev", std_dev)?;
        }

        self.validate_categories()?;
        self.validate_regions()?;
        self.validate_nocturnal()?;
        self.validate_preferred_regions()?;
        self.validate_placement()?;
        self.validate_age()?;
        self.validate_missingness()?;

        if self.identity.national_id_prefix > 9 {
            return Err(ConfigError::InvalidParameter {
                context: "identity.national_id_prefix".to_string(),
                value: f64::from(self.identity.national_id_prefix),
            });
        }
        if self.identity.email_domains.is_empty() {
            return Err(ConfigError::EmptyTable {
                table: "identity.email_domains",
            });
        }
        if self.output.columns.is_empty() {
            return Err(ConfigError::NoColumns);
        }

        Ok(())
    }

    fn validate_categories(&self) -> Result<(), ConfigError> {
        let names = &self.categories.names;
        if names.is_empty() {
            return Err(ConfigError::EmptyTable {
                table: "categories.names",
            });
        }
        check_unique("category", names.iter().map(String::as_str))?;

        for day_type in DayType::all() {
            let table = format!("categories.day_type_weights.{day_type}");
            let weights = self.categories.day_type_weights.for_day_type(*day_type);
            check_weights(&table, weights, names.len())?;
        }

        for (category, &value) in &self.categories.severity {
            self.require_category("categories.severity", category)?;
            CrimeSeverity::from_value(value).map_err(|e| ConfigError::InvalidSeverity {
                category: category.clone(),
                value: e.value,
            })?;
        }

        if self.categories.regional_weighting && self.preferred_regions.is_some() {
            return Err(ConfigError::ConflictingRegionWeighting);
        }

        Ok(())
    }

    fn validate_regions(&self) -> Result<(), ConfigError> {
        if self.regions.is_empty() {
            return Err(ConfigError::EmptyTable { table: "regions" });
        }
        check_unique("region", self.regions.iter().map(|r| r.name.as_str()))?;

        let category_count = self.categories.names.len();
        for region in &self.regions {
            if region.anchors.is_empty() {
                return Err(ConfigError::EmptyAnchors {
                    region: region.name.clone(),
                });
            }
            for anchor in &region.anchors {
                check_coordinate(&format!("Region '{}'", region.name), *anchor)?;
            }
            check_non_negative(
                &format!("regions.{}.selection_weight", region.name),
                region.selection_weight,
            )?;
            if let Some(jitter) = region.jitter {
                check_non_negative(&format!("regions.{}.jitter", region.name), jitter)?;
            }
            for day_type in DayType::all() {
                check_non_negative(
                    &format!("regions.{}.day_type_multipliers.{day_type}", region.name),
                    region.day_type_multipliers.for_day_type(*day_type),
                )?;
            }

            if let Some(multipliers) = &region.category_multipliers {
                let table = format!("regions.{}.category_multipliers", region.name);
                check_weights(&table, multipliers, category_count)?;

                if self.categories.regional_weighting {
                    for day_type in DayType::all() {
                        let base = self.categories.day_type_weights.for_day_type(*day_type);
                        if base.iter().zip(multipliers).all(|(b, m)| b * m <= 0.0) {
                            return Err(ConfigError::AllZeroWeights {
                                table: format!("{table} x day_type_weights.{day_type}"),
                            });
                        }
                    }
                }
            }
        }

        for day_type in DayType::all() {
            let total: f64 = self
                .regions
                .iter()
                .map(|r| r.selection_weight * r.day_type_multipliers.for_day_type(*day_type))
                .sum();
            if total <= 0.0 {
                return Err(ConfigError::AllZeroWeights {
                    table: format!("regions.selection_weight ({day_type})"),
                });
            }
        }

        Ok(())
    }

    fn validate_nocturnal(&self) -> Result<(), ConfigError> {
        let Some(nocturnal) = &self.nocturnal else {
            return Ok(());
        };
        if nocturnal.start_hour > 23 {
            return Err(ConfigError::InvalidHour {
                context: "nocturnal.start_hour",
                hour: nocturnal.start_hour,
            });
        }
        if nocturnal.end_hour > 24 {
            return Err(ConfigError::InvalidHour {
                context: "nocturnal.end_hour",
                hour: nocturnal.end_hour,
            });
        }
        for category in &nocturnal.severe {
            self.require_category("nocturnal.severe", category)?;
        }
        if nocturnal.replicas + nocturnal.fresh_draws == 0 {
            return Err(ConfigError::InvalidParameter {
                context: "nocturnal.replicas + nocturnal.fresh_draws".to_string(),
                value: 0.0,
            });
        }
        Ok(())
    }

    fn validate_preferred_regions(&self) -> Result<(), ConfigError> {
        let Some(preferred) = &self.preferred_regions else {
            return Ok(());
        };
        check_non_negative("preferred_regions.multiplicity", preferred.multiplicity)?;
        for (category, regions) in &preferred.categories {
            self.require_category("preferred_regions", category)?;
            for region in regions {
                self.require_region(&format!("preferred_regions.{category}"), region)?;
            }

            for day_type in DayType::all() {
                let total: f64 = self
                    .regions
                    .iter()
                    .map(|r| {
                        let weight =
                            r.selection_weight * r.day_type_multipliers.for_day_type(*day_type);
                        if regions.contains(&r.name) {
                            weight * preferred.multiplicity
                        } else {
                            weight
                        }
                    })
                    .sum();
                if total <= 0.0 {
                    return Err(ConfigError::AllZeroWeights {
                        table: format!("preferred_regions.{category} ({day_type})"),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_placement(&self) -> Result<(), ConfigError> {
        let placement = &self.placement;
        check_non_negative("placement.jitter", placement.jitter)?;
        for (category, &jitter) in &placement.category_jitter {
            self.require_category("placement.category_jitter", category)?;
            check_non_negative(&format!("placement.category_jitter.{category}"), jitter)?;
        }
        if placement.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        for (i, zone) in placement.exclusion_zones.iter().enumerate() {
            check_coordinate(&format!("Exclusion zone {i}"), zone.center)?;
            check_non_negative(&format!("placement.exclusion_zones[{i}].radius"), zone.radius)?;
        }
        Ok(())
    }

    fn validate_age(&self) -> Result<(), ConfigError> {
        let age = &self.age;
        check_age_bounds("age", age.min, age.max, MIN_AGE, MAX_AGE)?;

        for (i, rule) in age.priority_rules.iter().enumerate() {
            let context = format!("age.priority_rules[{i}]");
            if let Some(region) = &rule.region {
                self.require_region(&context, region)?;
            }
            if let Some(category) = &rule.category {
                self.require_category(&context, category)?;
            }
            check_age_bounds(&context, rule.min, rule.max, age.min, age.max)?;
        }

        for (label, component) in [("age.young", &age.young), ("age.old", &age.old)] {
            check_probability(&format!("{label}.probability"), component.probability)?;
            match component.distribution {
                AgeDistribution::Normal { mean, std_dev } => {
                    check_finite(&format!("{label}.distribution.mean"), mean)?;
                    check_positive(&format!("{label}.distribution.std_dev"), std_dev)?;
                }
                AgeDistribution::Uniform { min, max } => {
                    check_age_bounds(label, min, max, age.min, age.max)?;
                }
            }
        }

        Ok(())
    }

    fn validate_missingness(&self) -> Result<(), ConfigError> {
        for field in MissableField::all() {
            check_probability(&format!("missingness.{field}"), self.missingness.rate(*field))?;
        }
        Ok(())
    }

    fn require_category(&self, context: &str, name: &str) -> Result<usize, ConfigError> {
        self.category_index(name)
            .ok_or_else(|| ConfigError::UnknownCategory {
                context: context.to_string(),
                name: name.to_string(),
            })
    }

    fn require_region(&self, context: &str, name: &str) -> Result<usize, ConfigError> {
        self.region_index(name)
            .ok_or_else(|| ConfigError::UnknownRegion {
                context: context.to_string(),
                name: name.to_string(),
            })
    }
}

fn check_unique<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::Duplicate {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn check_weights(table: &str, weights: &[f64], expected: usize) -> Result<(), ConfigError> {
    if weights.len() != expected {
        return Err(ConfigError::WeightLength {
            table: table.to_string(),
            expected,
            actual: weights.len(),
        });
    }
    if let Some(&value) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(ConfigError::InvalidWeight {
            table: table.to_string(),
            value,
        });
    }
    if weights.iter().all(|w| *w <= 0.0) {
        return Err(ConfigError::AllZeroWeights {
            table: table.to_string(),
        });
    }
    Ok(())
}

fn check_coordinate(context: &str, [latitude, longitude]: [f64; 2]) -> Result<(), ConfigError> {
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidCoordinate {
            context: context.to_string(),
            latitude,
            longitude,
        })
    }
}

fn check_finite(context: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            context: context.to_string(),
            value,
        })
    }
}

fn check_non_negative(context: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            context: context.to_string(),
            value,
        })
    }
}

fn check_positive(context: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            context: context.to_string(),
            value,
        })
    }
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability {
            field: field.to_string(),
            value,
        })
    }
}

fn check_age_bounds(context: &str, min: u8, max: u8, lo: u8, hi: u8) -> Result<(), ConfigError> {
    if min <= max && min >= lo && max <= hi {
        Ok(())
    } else {
        Err(ConfigError::InvalidAgeBounds {
            context: context.to_string(),
            min,
            max,
        })
    }
}
