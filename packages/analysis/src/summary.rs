//! Dataset-level summary of a generated CSV.

use std::collections::{BTreeMap, HashMap};

use crime_synth_incident_models::Column;
use serde::Serialize;

use crate::row::IncidentRow;
use crate::stats::{self, NumericSummary};

/// First hour of the nocturnal band.
pub const NOCTURNAL_START_HOUR: u32 = 19;
/// Last hour of the nocturnal band, counted after midnight.
pub const NOCTURNAL_END_HOUR: u32 = 4;
/// Categories reported hour by hour as severe.
pub const SEVERE_CATEGORIES: &[&str] = &["homicídio", "tráfico"];

const TOP_REGIONS: usize = 10;
const RISKIEST_REGIONS: usize = 5;

/// Whether `hour` falls in the 19h–04h band, both ends inclusive.
#[must_use]
pub const fn is_nocturnal(hour: u32) -> bool {
    hour >= NOCTURNAL_START_HOUR || hour <= NOCTURNAL_END_HOUR
}

/// Blank cells in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingCount {
    /// Column name.
    pub column: Column,
    /// Rows with no value.
    pub missing: u64,
}

/// Records in one category and their share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// Category name.
    pub category: String,
    /// Number of records.
    pub count: u64,
    /// Percentage of the population the share was computed over.
    pub percentage: f64,
}

/// Records at one hour of day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourCount {
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Number of records.
    pub count: u64,
}

/// Records in one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCount {
    /// Region name.
    pub region: String,
    /// Number of records.
    pub count: u64,
}

/// Accumulated severity of one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRisk {
    /// Region name.
    pub region: String,
    /// Sum of severity weights of its records.
    pub risk: u64,
}

/// Records in one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearCount {
    /// Calendar year.
    pub year: i32,
    /// Number of records.
    pub count: u64,
}

/// Records in the nocturnal band.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NocturnalShare {
    /// Nocturnal records.
    pub count: u64,
    /// Percentage of all rows.
    pub percentage: f64,
    /// Nocturnal records per category, as a share of nocturnal records.
    pub by_category: Vec<CategoryShare>,
}

/// Descriptive statistics of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    /// Rows read.
    pub rows: u64,
    /// Missing cells per known column present in the file.
    pub missing: Vec<MissingCount>,
    /// Records per category, most frequent first.
    pub categories: Vec<CategoryShare>,
    /// Records per hour of day, in hour order.
    pub hours: Vec<HourCount>,
    /// Most frequent regions.
    pub top_regions: Vec<RegionCount>,
    /// Regions with the highest accumulated severity.
    pub riskiest_regions: Vec<RegionRisk>,
    /// Severe-category records per hour of day, in hour order.
    pub severe_by_hour: Vec<HourCount>,
    /// Nocturnal band breakdown.
    pub nocturnal: NocturnalShare,
    /// Records per year, in year order.
    pub years: Vec<YearCount>,
    /// Age distribution, when any age is present.
    pub age: Option<NumericSummary>,
    /// Cramér's V between category and region.
    pub category_region_cramers_v: Option<f64>,
    /// Correlation ratio of age by category.
    pub age_by_category_eta_squared: f64,
}

/// Summarizes `rows`. `columns` lists the known columns present in the
/// file and limits the missing-value report to them.
#[must_use]
pub fn summarize(columns: &[Column], rows: &[IncidentRow]) -> DatasetSummary {
    let total = rows.len() as u64;

    let missing = columns
        .iter()
        .map(|&column| MissingCount {
            column,
            missing: rows.iter().filter(|r| r.field(column).is_none()).count() as u64,
        })
        .collect();

    let categories = shares(
        rows.iter().filter_map(|r| r.field(Column::Category)),
        total,
    );

    let hours = hour_counts(rows.iter().filter_map(IncidentRow::hour_of_day));

    let mut region_counts: HashMap<&str, u64> = HashMap::new();
    let mut region_risk: HashMap<&str, u64> = HashMap::new();
    for row in rows {
        if let Some(region) = row.field(Column::Region) {
            *region_counts.entry(region).or_default() += 1;
            *region_risk.entry(region).or_default() += u64::from(row.severity_weight());
        }
    }
    let top_regions = ranked(region_counts, TOP_REGIONS)
        .into_iter()
        .map(|(region, count)| RegionCount { region, count })
        .collect();
    let riskiest_regions = ranked(region_risk, RISKIEST_REGIONS)
        .into_iter()
        .map(|(region, risk)| RegionRisk { region, risk })
        .collect();

    let severe_by_hour = hour_counts(rows.iter().filter_map(|r| {
        let category = r.field(Column::Category)?;
        if SEVERE_CATEGORIES.contains(&category) {
            r.hour_of_day()
        } else {
            None
        }
    }));

    let nocturnal_rows: Vec<&IncidentRow> = rows
        .iter()
        .filter(|r| r.hour_of_day().is_some_and(is_nocturnal))
        .collect();
    let nocturnal_count = nocturnal_rows.len() as u64;
    let nocturnal = NocturnalShare {
        count: nocturnal_count,
        percentage: percentage(nocturnal_count, total),
        by_category: shares(
            nocturnal_rows
                .iter()
                .filter_map(|r| r.field(Column::Category)),
            nocturnal_count,
        ),
    };

    let mut years: BTreeMap<i32, u64> = BTreeMap::new();
    for year in rows.iter().filter_map(IncidentRow::year_number) {
        *years.entry(year).or_default() += 1;
    }
    let years = years
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect();

    let ages: Vec<f64> = rows.iter().filter_map(IncidentRow::age_years).collect();
    let age = stats::describe(&ages);

    let category_region_cramers_v = stats::cramers_v(
        rows.iter()
            .filter_map(|r| Some((r.field(Column::Category)?, r.field(Column::Region)?))),
    );
    let age_by_category_eta_squared = stats::correlation_ratio(
        rows.iter()
            .filter_map(|r| Some((r.field(Column::Category)?, r.age_years()?))),
    );

    log::debug!(
        "Summarized {total} rows across {} categories",
        categories.len()
    );

    DatasetSummary {
        rows: total,
        missing,
        categories,
        hours,
        top_regions,
        riskiest_regions,
        severe_by_hour,
        nocturnal,
        years,
        age,
        category_region_cramers_v,
        age_by_category_eta_squared,
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

fn shares<'a>(values: impl Iterator<Item = &'a str>, total: u64) -> Vec<CategoryShare> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    ranked(counts, usize::MAX)
        .into_iter()
        .map(|(category, count)| CategoryShare {
            category,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

fn hour_counts(hours: impl Iterator<Item = u32>) -> Vec<HourCount> {
    let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
    for hour in hours {
        *counts.entry(hour).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(hour, count)| HourCount { hour, count })
        .collect()
}

/// Sorts by value descending, then name ascending, and keeps `limit`.
fn ranked(counts: HashMap<&str, u64>, limit: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(&str, u64)> = counts.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
        .into_iter()
        .take(limit)
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(hour: &str, category: &str, region: &str, age: &str) -> IncidentRow {
        let text = |s: &str| (!s.is_empty()).then(|| s.to_string());
        IncidentRow {
            date: Some("2023-05-02".to_string()),
            hour: text(hour),
            category: text(category),
            region: text(region),
            age: text(age),
            ..IncidentRow::default()
        }
    }

    fn sample() -> Vec<IncidentRow> {
        vec![
            row("23:10", "homicídio", "W3 Sul", "19"),
            row("02:00", "tráfico", "W3 Sul", "21"),
            row("04:59", "furto", "SQS 308", "65"),
            row("05:00", "furto", "SQS 308", ""),
            row("12:30", "roubo", "Eixo Sul", "30"),
            row("19:00", "", "W3 Sul", "17"),
            row("", "vandalismo", "Eixo Sul", "40"),
        ]
    }

    #[test]
    fn nocturnal_band_is_inclusive() {
        assert!(is_nocturnal(19));
        assert!(is_nocturnal(0));
        assert!(is_nocturnal(4));
        assert!(!is_nocturnal(5));
        assert!(!is_nocturnal(18));
    }

    #[test]
    fn counts_categories_and_missing_cells() {
        let summary = summarize(&[Column::Hour, Column::Category, Column::Age], &sample());
        assert_eq!(summary.rows, 7);
        assert_eq!(
            summary.missing,
            vec![
                MissingCount {
                    column: Column::Hour,
                    missing: 1
                },
                MissingCount {
                    column: Column::Category,
                    missing: 1
                },
                MissingCount {
                    column: Column::Age,
                    missing: 1
                },
            ]
        );

        assert_eq!(summary.categories[0].category, "furto");
        assert_eq!(summary.categories[0].count, 2);
        assert!((summary.categories[0].percentage - 200.0 / 7.0).abs() < 1e-9);
        let counted: u64 = summary.categories.iter().map(|c| c.count).sum();
        assert_eq!(counted, 6);
    }

    #[test]
    fn ranks_regions_by_count_and_risk() {
        let summary = summarize(&[], &sample());
        assert_eq!(
            summary.top_regions[0],
            RegionCount {
                region: "W3 Sul".to_string(),
                count: 3
            }
        );
        // W3 Sul: 5 + 4 + 1 (blank category) = 10; Eixo Sul: 3 + 1; SQS 308: 2 + 2.
        assert_eq!(
            summary.riskiest_regions,
            vec![
                RegionRisk {
                    region: "W3 Sul".to_string(),
                    risk: 10
                },
                RegionRisk {
                    region: "Eixo Sul".to_string(),
                    risk: 4
                },
                RegionRisk {
                    region: "SQS 308".to_string(),
                    risk: 4
                },
            ]
        );
    }

    #[test]
    fn nocturnal_and_severe_hours() {
        let summary = summarize(&[], &sample());
        // 23h, 02h, 04h and 19h.
        assert_eq!(summary.nocturnal.count, 4);
        assert!((summary.nocturnal.percentage - 400.0 / 7.0).abs() < 1e-9);
        let nocturnal_categories: u64 = summary.nocturnal.by_category.iter().map(|c| c.count).sum();
        assert_eq!(nocturnal_categories, 3);
        assert!(
            summary
                .nocturnal
                .by_category
                .iter()
                .all(|c| (c.percentage - 25.0).abs() < 1e-9)
        );

        assert_eq!(
            summary.severe_by_hour,
            vec![HourCount { hour: 2, count: 1 }, HourCount { hour: 23, count: 1 }]
        );
        assert_eq!(summary.hours.len(), 6);
        assert_eq!(summary.hours[0], HourCount { hour: 2, count: 1 });
    }

    #[test]
    fn years_and_ages() {
        let summary = summarize(&[], &sample());
        assert_eq!(summary.years, vec![YearCount { year: 2023, count: 7 }]);

        let age = summary.age.unwrap();
        assert_eq!(age.count, 6);
        assert!((age.min - 17.0).abs() < 1e-9);
        assert!((age.max - 65.0).abs() < 1e-9);
        assert!((age.median - 25.5).abs() < 1e-9);

        assert!(summary.category_region_cramers_v.is_some());
        assert!((0.0..=1.0).contains(&summary.age_by_category_eta_squared));
    }

    #[test]
    fn empty_dataset() {
        let summary = summarize(&[Column::Region], &[]);
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.missing[0].missing, 0);
        assert!(summary.categories.is_empty());
        assert!(summary.nocturnal.percentage.abs() < f64::EPSILON);
        assert_eq!(summary.age, None);
        assert_eq!(summary.category_region_cramers_v, None);
    }
}
