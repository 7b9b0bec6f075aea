//! Tolerant CSV row model.
//!
//! Every column is optional and unknown columns are ignored, so the reader
//! accepts any subset of the generator's columns as well as the Portuguese
//! headers of older exports (`tipo_crime`, `rua`, `hora`, ...).

use chrono::{Datelike as _, NaiveDate, NaiveTime, Timelike as _};
use crime_synth_incident_models::{Column, CrimeSeverity};
use serde::Deserialize;

/// One CSV row as text. Empty cells deserialize to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentRow {
    #[serde(default)]
    pub latitude: Option<String>,
    #[serde(default)]
    pub longitude: Option<String>,
    #[serde(default, alias = "data")]
    pub date: Option<String>,
    #[serde(default, alias = "hora")]
    pub hour: Option<String>,
    #[serde(default, alias = "tipo_crime")]
    pub category: Option<String>,
    #[serde(default, alias = "bairro")]
    pub neighborhood: Option<String>,
    #[serde(default, alias = "rua")]
    pub region: Option<String>,
    #[serde(default, alias = "tipo_dia")]
    pub day_type: Option<String>,
    #[serde(default, alias = "ano")]
    pub year: Option<String>,
    #[serde(default, alias = "nome")]
    pub name: Option<String>,
    #[serde(default, alias = "cpf")]
    pub national_id: Option<String>,
    #[serde(default, alias = "idade")]
    pub age: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "telefone")]
    pub phone: Option<String>,
    #[serde(default, alias = "endereco")]
    pub address: Option<String>,
    #[serde(default, alias = "peso")]
    pub severity: Option<String>,
}

impl IncidentRow {
    /// Hour of day parsed from `HH:MM` text. `None` when blank or
    /// unparseable.
    #[must_use]
    pub fn hour_of_day(&self) -> Option<u32> {
        parse_hour(self.hour.as_deref()?)
    }

    /// Severity weight of the category, 1 when blank or unrecognized.
    #[must_use]
    pub fn severity_weight(&self) -> u8 {
        CrimeSeverity::weight_or_default(self.category.as_deref())
    }

    /// Age as a number. Accepts `23` and `23.0`.
    #[must_use]
    pub fn age_years(&self) -> Option<f64> {
        self.age
            .as_deref()
            .and_then(|a| a.trim().parse::<f64>().ok())
            .filter(|a| a.is_finite())
    }

    /// Year from the `year` column, falling back to the date.
    #[must_use]
    pub fn year_number(&self) -> Option<i32> {
        self.year
            .as_deref()
            .and_then(|y| y.trim().parse::<i32>().ok())
            .or_else(|| {
                let date = NaiveDate::parse_from_str(self.date.as_deref()?.trim(), "%Y-%m-%d");
                date.ok().map(|d| d.year())
            })
    }

    /// Non-blank text of a column.
    #[must_use]
    pub fn field(&self, column: Column) -> Option<&str> {
        let value = match column {
            Column::Latitude => &self.latitude,
            Column::Longitude => &self.longitude,
            Column::Date => &self.date,
            Column::Hour => &self.hour,
            Column::Category => &self.category,
            Column::Neighborhood => &self.neighborhood,
            Column::Region => &self.region,
            Column::DayType => &self.day_type,
            Column::Year => &self.year,
            Column::Name => &self.name,
            Column::NationalId => &self.national_id,
            Column::Age => &self.age,
            Column::Email => &self.email,
            Column::Phone => &self.phone,
            Column::Address => &self.address,
            Column::Severity => &self.severity,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// Maps a CSV header to the column it fills, accepting the Portuguese
/// headers of older exports.
#[must_use]
pub fn header_column(header: &str) -> Option<Column> {
    let header = header.trim();
    header.parse::<Column>().ok().or(match header {
        "data" => Some(Column::Date),
        "hora" => Some(Column::Hour),
        "tipo_crime" => Some(Column::Category),
        "bairro" => Some(Column::Neighborhood),
        "rua" => Some(Column::Region),
        "tipo_dia" => Some(Column::DayType),
        "ano" => Some(Column::Year),
        "nome" => Some(Column::Name),
        "cpf" => Some(Column::NationalId),
        "idade" => Some(Column::Age),
        "telefone" => Some(Column::Phone),
        "endereco" => Some(Column::Address),
        "peso" => Some(Column::Severity),
        _ => None,
    })
}

/// Parses `HH:MM` into an hour of day.
#[must_use]
pub fn parse_hour(text: &str) -> Option<u32> {
    NaiveTime::parse_from_str(text.trim(), "%H:%M")
        .ok()
        .map(|t| t.hour())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hour_text() {
        assert_eq!(parse_hour("00:00"), Some(0));
        assert_eq!(parse_hour("23:59"), Some(23));
        assert_eq!(parse_hour(" 07:15 "), Some(7));
        assert_eq!(parse_hour("24:00"), None);
        assert_eq!(parse_hour("noon"), None);
    }

    #[test]
    fn severity_uses_dashboard_table() {
        let row = |category: Option<&str>| IncidentRow {
            category: category.map(ToString::to_string),
            ..IncidentRow::default()
        };
        assert_eq!(row(Some("feminicídio")).severity_weight(), 5);
        assert_eq!(row(Some("vandalismo")).severity_weight(), 1);
        assert_eq!(row(Some("estelionato")).severity_weight(), 1);
        assert_eq!(row(None).severity_weight(), 1);
    }

    #[test]
    fn year_falls_back_to_date() {
        let row = IncidentRow {
            date: Some("2022-10-12".to_string()),
            ..IncidentRow::default()
        };
        assert_eq!(row.year_number(), Some(2022));
    }

    #[test]
    fn headers_map_to_columns() {
        assert_eq!(header_column("day_type"), Some(Column::DayType));
        assert_eq!(header_column("tipo_crime"), Some(Column::Category));
        assert_eq!(header_column("rua"), Some(Column::Region));
        assert_eq!(header_column("__ERR0O0__"), None);
        assert_eq!(header_column("null"), None);
    }

    #[test]
    fn blank_fields_are_missing() {
        let row = IncidentRow {
            name: Some("  ".to_string()),
            email: Some("ana.lima12@gmail.com".to_string()),
            ..IncidentRow::default()
        };
        assert_eq!(row.field(Column::Name), None);
        assert_eq!(row.field(Column::Email), Some("ana.lima12@gmail.com"));
        assert_eq!(row.field(Column::Phone), None);
    }

    #[test]
    fn float_ages_are_accepted() {
        let row = IncidentRow {
            age: Some("23.0".to_string()),
            ..IncidentRow::default()
        };
        assert_eq!(row.age_years(), Some(23.0));
    }
}
