#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Synthetic incident record types and severity definitions.
//!
//! This crate defines the record shape shared by the generator and the
//! analysis tooling. Generated records always carry a full timestamp,
//! region and location; the remaining attributes may be blanked by the
//! generator's missingness step and are therefore optional.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Severity level for an incident category, from 1 (minimal) to 5 (critical).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CrimeSeverity {
    /// Level 1: vandalism and anything unrecognized
    Minimal = 1,
    /// Level 2: theft without confrontation
    Low = 2,
    /// Level 3: robbery
    Moderate = 3,
    /// Level 4: drug trafficking
    High = 4,
    /// Level 5: homicide and femicide
    Critical = 5,
}

impl CrimeSeverity {
    /// Returns the numeric value of this severity level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a severity level from a numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-5.
    pub const fn from_value(value: u8) -> Result<Self, InvalidSeverityError> {
        match value {
            1 => Ok(Self::Minimal),
            2 => Ok(Self::Low),
            3 => Ok(Self::Moderate),
            4 => Ok(Self::High),
            5 => Ok(Self::Critical),
            _ => Err(InvalidSeverityError { value }),
        }
    }

    /// Looks up the fixed dashboard weight for a category name.
    ///
    /// Returns `None` for categories outside the built-in table; callers
    /// that need a number should fall back to [`CrimeSeverity::Minimal`].
    #[must_use]
    pub fn for_category_name(category: &str) -> Option<Self> {
        match category {
            "vandalismo" => Some(Self::Minimal),
            "furto" => Some(Self::Low),
            "roubo" => Some(Self::Moderate),
            "tráfico" => Some(Self::High),
            "homicídio" | "feminicídio" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Numeric weight for an optional category, defaulting to 1 for
    /// missing or unrecognized names.
    #[must_use]
    pub fn weight_or_default(category: Option<&str>) -> u8 {
        category
            .and_then(Self::for_category_name)
            .unwrap_or(Self::Minimal)
            .value()
    }
}

/// Error returned when attempting to create a [`CrimeSeverity`] from an invalid
/// numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeverityError {
    /// The invalid severity value that was provided.
    pub value: u8,
}

impl std::fmt::Display for InvalidSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid severity value {}: expected 1-5", self.value)
    }
}

impl std::error::Error for InvalidSeverityError {}

/// Calendar classification of an incident date.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DayType {
    /// Any date that is neither a weekend day nor a holiday
    Weekday,
    /// One of the two configured weekend days
    Weekend,
    /// A listed holiday that does not fall on a weekend day
    Holiday,
}

impl DayType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Weekday, Self::Weekend, Self::Holiday]
    }

    /// Position of this variant in [`DayType::all`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Weekday => 0,
            Self::Weekend => 1,
            Self::Holiday => 2,
        }
    }
}

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Record fields the generator may blank out.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MissableField {
    /// Full person name
    Name,
    /// CPF-style identification code
    NationalId,
    /// Contact e-mail
    Email,
    /// Contact phone number
    Phone,
    /// Free-text street address
    Address,
    /// Age in years
    Age,
    /// Incident category
    Category,
    /// `HH:MM` part of the timestamp (the timestamp itself is kept)
    TimeOfDay,
}

impl MissableField {
    /// Returns all variants in the fixed order used when drawing.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Name,
            Self::NationalId,
            Self::Email,
            Self::Phone,
            Self::Address,
            Self::Age,
            Self::Category,
            Self::TimeOfDay,
        ]
    }
}

/// Output column identifiers for tabular exports.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    Latitude,
    Longitude,
    Date,
    Hour,
    Category,
    Neighborhood,
    Region,
    DayType,
    Year,
    Name,
    NationalId,
    Age,
    Email,
    Phone,
    Address,
    Severity,
}

/// One simulated incident.
///
/// Constructed once by the generator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticIncidentRecord {
    /// When the incident occurred. Always inside the configured window.
    pub occurred_at: NaiveDateTime,
    /// `HH:MM` of `occurred_at`, or `None` when blanked.
    pub time_of_day: Option<NaiveTime>,
    /// Calendar classification of `occurred_at`.
    pub day_type: DayType,
    /// Incident category name.
    pub category: Option<String>,
    /// Numeric severity derived from the emitted category.
    pub severity: u8,
    /// Region the incident was placed in.
    pub region: String,
    /// Jittered location near one of the region's anchors.
    pub location: Coordinates,
    /// Age of the person involved.
    pub age: Option<u8>,
    pub name: Option<String>,
    pub national_id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl SyntheticIncidentRecord {
    /// Calendar date of the incident.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date()
    }

    /// Calendar year of the incident.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.occurred_at.year()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn severity_from_value_roundtrip() {
        for v in 1..=5u8 {
            let severity = CrimeSeverity::from_value(v).unwrap();
            assert_eq!(severity.value(), v);
        }
        assert!(CrimeSeverity::from_value(0).is_err());
        assert!(CrimeSeverity::from_value(6).is_err());
    }

    #[test]
    fn unknown_category_weighs_one() {
        assert_eq!(CrimeSeverity::weight_or_default(Some("homicídio")), 5);
        assert_eq!(CrimeSeverity::weight_or_default(Some("furto")), 2);
        assert_eq!(CrimeSeverity::weight_or_default(Some("estelionato")), 1);
        assert_eq!(CrimeSeverity::weight_or_default(None), 1);
    }

    #[test]
    fn day_type_index_matches_all() {
        for (i, day_type) in DayType::all().iter().enumerate() {
            assert_eq!(day_type.index(), i);
        }
    }

    #[test]
    fn columns_parse_from_snake_case() {
        assert_eq!(Column::from_str("national_id").unwrap(), Column::NationalId);
        assert_eq!(Column::DayType.as_ref(), "day_type");
        assert_eq!(MissableField::TimeOfDay.to_string(), "time_of_day");
    }
}
