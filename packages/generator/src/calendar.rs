//! Timestamp sampling and day-type classification.

use chrono::{Datelike as _, Duration, NaiveDateTime, NaiveTime};
use crime_synth_incident_models::DayType;
use rand::Rng;
use rand::distributions::Distribution as _;
use statrs::distribution::Normal;

use crate::config::{CalendarConfig, ConfigError, DateWindow, HourDistribution};

/// Classifies a timestamp as weekend, holiday, or weekday.
///
/// The weekend check runs first, so a holiday that falls on a weekend day
/// is classified as [`DayType::Weekend`].
#[must_use]
pub fn classify_day_type(timestamp: NaiveDateTime, calendar: &CalendarConfig) -> DayType {
    let date = timestamp.date();
    if calendar.weekend_days.contains(&date.weekday()) {
        DayType::Weekend
    } else if calendar.holidays.contains(&date) {
        DayType::Holiday
    } else {
        DayType::Weekday
    }
}

/// Draws timestamps inside a [`DateWindow`].
pub struct TimestampSampler {
    window: DateWindow,
    span_days: i64,
    hours: HourSampler,
}

enum HourSampler {
    Uniform,
    WrappedNormal(Normal),
}

impl TimestampSampler {
    /// Builds a sampler for a validated window and hour distribution.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] if the normal distribution
    /// parameters are rejected.
    pub fn new(window: DateWindow, hours: HourDistribution) -> Result<Self, ConfigError> {
        let hours = match hours {
            HourDistribution::Uniform => HourSampler::Uniform,
            HourDistribution::WrappedNormal { mean, std_dev } => HourSampler::WrappedNormal(
                Normal::new(mean, std_dev).map_err(|_| ConfigError::InvalidParameter {
                    context: "hours.std_dev".to_string(),
                    value: std_dev,
                })?,
            ),
        };

        Ok(Self {
            window,
            span_days: (window.end - window.start).num_days(),
            hours,
        })
    }

    /// Draws a day uniformly in the window, then an hour from the
    /// configured distribution and a uniform minute.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> NaiveDateTime {
        let day = rng.gen_range(0..=self.span_days);
        let hour = match &self.hours {
            HourSampler::Uniform => rng.gen_range(0..24u32),
            HourSampler::WrappedNormal(normal) => wrap_hour(normal.sample(rng)),
        };
        let minute = rng.gen_range(0..60u32);

        let date = self.window.start + Duration::days(day);
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
        date.and_time(time)
    }
}

/// Truncates toward zero, then reduces modulo 24 into `0..24`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn wrap_hour(value: f64) -> u32 {
    (value.trunc() as i64).rem_euclid(24) as u32
}
