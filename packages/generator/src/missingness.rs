//! Independent per-field blanking.

use crime_synth_incident_models::{MissableField, SyntheticIncidentRecord};
use rand::Rng;

use crate::config::MissingnessConfig;

/// Blanks each missable field independently with its configured rate.
///
/// One uniform draw is consumed per field in [`MissableField::all`] order,
/// whether or not the rate is zero, so changing one rate does not shift
/// the stream for the fields after it. Location, region, date and day type
/// are never touched. Severity is not recomputed here.
pub fn apply_missingness<R: Rng + ?Sized>(
    mut record: SyntheticIncidentRecord,
    rates: &MissingnessConfig,
    rng: &mut R,
) -> SyntheticIncidentRecord {
    for field in MissableField::all() {
        let roll: f64 = rng.r#gen();
        if roll >= rates.rate(*field) {
            continue;
        }
        match field {
            MissableField::Name => record.name = None,
            MissableField::NationalId => record.national_id = None,
            MissableField::Email => record.email = None,
            MissableField::Phone => record.phone = None,
            MissableField::Address => record.address = None,
            MissableField::Age => record.age = None,
            MissableField::Category => record.category = None,
            MissableField::TimeOfDay => record.time_of_day = None,
        }
    }
    record
}
