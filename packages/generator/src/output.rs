//! CSV export.
//!
//! Column order comes from [`OutputConfig::columns`], followed by any
//! constant columns. Missing values are written as empty cells. Files are
//! written to `<path>.tmp` and renamed into place after a successful flush,
//! so a failed run never leaves a truncated CSV at the destination.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crime_synth_incident_models::{Column, SyntheticIncidentRecord};

use crate::GenerateError;
use crate::config::OutputConfig;

/// Writes a header and one row per record to `writer`.
///
/// # Errors
///
/// Returns [`csv::Error`] if any row cannot be written or flushed.
pub fn write_records<'a, W: Write>(
    writer: W,
    output: &OutputConfig,
    records: impl IntoIterator<Item = &'a SyntheticIncidentRecord>,
) -> Result<u64, csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);

    let header: Vec<&str> = output
        .columns
        .iter()
        .map(AsRef::<str>::as_ref)
        .chain(output.constant_columns.iter().map(|c| c.name.as_str()))
        .collect();
    csv.write_record(&header)?;

    let constants: Vec<&str> = output
        .constant_columns
        .iter()
        .map(|c| c.value.as_deref().unwrap_or(""))
        .collect();

    let mut written = 0;
    for record in records {
        let mut row: Vec<String> = output
            .columns
            .iter()
            .map(|column| cell(record, *column, &output.neighborhood))
            .collect();
        row.extend(constants.iter().map(ToString::to_string));
        csv.write_record(&row)?;
        written += 1;
    }

    csv.flush()?;
    Ok(written)
}

/// Writes `records` to `path` atomically.
///
/// The parent directory is created if needed. On any error the temp file
/// is removed and the destination is left untouched.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] or [`GenerateError::Csv`] if the file
/// cannot be created, written or renamed.
pub fn write_csv(
    path: &Path,
    output: &OutputConfig,
    records: &[SyntheticIncidentRecord],
) -> Result<u64, GenerateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    let result = write_to_temp(&tmp, output, records)
        .and_then(|written| std::fs::rename(&tmp, path).map(|()| written).map_err(Into::into));

    if result.is_err() {
        if let Err(e) = std::fs::remove_file(&tmp) {
            log::debug!("Could not remove {}: {e}", tmp.display());
        }
    }

    result
}

fn write_to_temp(
    tmp: &Path,
    output: &OutputConfig,
    records: &[SyntheticIncidentRecord],
) -> Result<u64, GenerateError> {
    let file = File::create(tmp)?;
    let mut writer = BufWriter::new(file);
    let written = write_records(&mut writer, output, records)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(written)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn cell(record: &SyntheticIncidentRecord, column: Column, neighborhood: &str) -> String {
    match column {
        Column::Latitude => record.location.latitude.to_string(),
        Column::Longitude => record.location.longitude.to_string(),
        Column::Date => record.date().format("%Y-%m-%d").to_string(),
        Column::Hour => record
            .time_of_day
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_default(),
        Column::Category => record.category.clone().unwrap_or_default(),
        Column::Neighborhood => neighborhood.to_string(),
        Column::Region => record.region.clone(),
        Column::DayType => record.day_type.as_ref().to_string(),
        Column::Year => record.year().to_string(),
        Column::Name => record.name.clone().unwrap_or_default(),
        Column::NationalId => record.national_id.clone().unwrap_or_default(),
        Column::Age => record.age.map(|a| a.to_string()).unwrap_or_default(),
        Column::Email => record.email.clone().unwrap_or_default(),
        Column::Phone => record.phone.clone().unwrap_or_default(),
        Column::Address => record.address.clone().unwrap_or_default(),
        Column::Severity => record.severity.to_string(),
    }
}
