#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Exploratory statistics over generated incident CSVs.
//!
//! The reader is tolerant: every column is optional, unknown columns are
//! ignored and malformed rows are skipped. [`summarize_path`] produces a
//! [`DatasetSummary`] with frequency tables, the nocturnal share, risk
//! rankings and two association measures.

pub mod row;
pub mod stats;
pub mod summary;

use std::io::Read;
use std::path::Path;

use crime_synth_incident_models::Column;
use thiserror::Error;

pub use row::IncidentRow;
pub use summary::{DatasetSummary, summarize};

/// Errors that can occur while reading a dataset.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV header could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Rows of a dataset plus the known columns its header declares.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Known columns present in the header, in header order.
    pub columns: Vec<Column>,
    /// Parsed rows.
    pub rows: Vec<IncidentRow>,
}

/// Reads a dataset from any CSV source.
///
/// # Errors
///
/// Returns [`AnalysisError::Csv`] if the header cannot be read. Malformed
/// data rows are skipped.
pub fn read_rows<R: Read>(reader: R) -> Result<Dataset, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let columns = reader
        .headers()?
        .iter()
        .filter_map(row::header_column)
        .collect();

    let mut rows = Vec::new();
    let mut skipped = 0_u64;
    for result in reader.deserialize::<IncidentRow>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                log::trace!("  skipping malformed row: {e}");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        log::warn!("Skipped {skipped} malformed rows");
    }

    Ok(Dataset { columns, rows })
}

/// Reads a dataset from a CSV file.
///
/// # Errors
///
/// Returns [`AnalysisError::Io`] if the file cannot be opened, or
/// [`AnalysisError::Csv`] if its header cannot be read.
pub fn load_rows(path: &Path) -> Result<Dataset, AnalysisError> {
    let file = std::fs::File::open(path)?;
    let dataset = read_rows(std::io::BufReader::new(file))?;
    log::info!(
        "Read {} rows from {}",
        dataset.rows.len(),
        path.display()
    );
    Ok(dataset)
}

/// Reads and summarizes a CSV file.
///
/// # Errors
///
/// Returns [`AnalysisError`] if the file cannot be read.
pub fn summarize_path(path: &Path) -> Result<DatasetSummary, AnalysisError> {
    let dataset = load_rows(path)?;
    Ok(summarize(&dataset.columns, &dataset.rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED: &str = "\
latitude,longitude,date,hour,category,region,day_type,age,__ERR0O0__,null
-15.81,-47.90,2022-01-01,23:15,homicídio,W3 Sul,holiday,19,ERRO_404,
-15.80,-47.89,2022-01-03,,furto,SQS 308,weekday,,ERRO_404,
-15.79,-47.88,2023-06-10,03:40,,Eixo Sul,weekend,70,ERRO_404,
";

    #[test]
    fn reads_generated_csv() {
        let dataset = read_rows(GENERATED.as_bytes()).unwrap();
        assert_eq!(
            dataset.columns,
            vec![
                Column::Latitude,
                Column::Longitude,
                Column::Date,
                Column::Hour,
                Column::Category,
                Column::Region,
                Column::DayType,
                Column::Age,
            ]
        );
        assert_eq!(dataset.rows.len(), 3);
        assert_eq!(dataset.rows[1].hour, None);
        assert_eq!(dataset.rows[2].category, None);
        assert_eq!(dataset.rows[0].day_type.as_deref(), Some("holiday"));

        let summary = summarize(&dataset.columns, &dataset.rows);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.nocturnal.count, 2);
        let missing_age = summary
            .missing
            .iter()
            .find(|m| m.column == Column::Age)
            .unwrap();
        assert_eq!(missing_age.missing, 1);
        assert_eq!(summary.years.len(), 2);
    }

    #[test]
    fn reads_portuguese_headers() {
        let text = "tipo_crime,rua,hora,idade,ano\nroubo,W3 Sul,21:00,22.0,2021\n";
        let dataset = read_rows(text.as_bytes()).unwrap();
        assert_eq!(
            dataset.columns,
            vec![
                Column::Category,
                Column::Region,
                Column::Hour,
                Column::Age,
                Column::Year
            ]
        );
        let row = &dataset.rows[0];
        assert_eq!(row.category.as_deref(), Some("roubo"));
        assert_eq!(row.hour_of_day(), Some(21));
        assert_eq!(row.age_years(), Some(22.0));
        assert_eq!(row.year_number(), Some(2021));
        assert_eq!(row.severity_weight(), 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("crime_synth_analysis_absent.csv");
        assert!(matches!(summarize_path(&path), Err(AnalysisError::Io(_))));
    }

    #[test]
    fn summarizes_file_on_disk() {
        let path = std::env::temp_dir().join(format!(
            "crime_synth_analysis_{}.csv",
            std::process::id()
        ));
        std::fs::write(&path, GENERATED).unwrap();
        let summary = summarize_path(&path).unwrap();
        assert_eq!(summary.rows, 3);
        std::fs::remove_file(&path).unwrap();
    }
}
