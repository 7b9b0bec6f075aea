//! Profile registry: generator configs embedded from TOML.
//!
//! Each `.toml` file in `packages/generator/profiles/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a profile means
//! adding a file and one line to the list below.

use crate::GenerateError;
use crate::config::GeneratorConfig;

/// Profile used when none is requested.
pub const DEFAULT_PROFILE: &str = "asa_sul_sectors";

/// TOML configs embedded at compile time.
const PROFILE_TOMLS: &[(&str, &str)] = &[
    (
        "asa_sul_hotspots",
        include_str!("../profiles/asa_sul_hotspots.toml"),
    ),
    (
        "asa_sul_sectors",
        include_str!("../profiles/asa_sul_sectors.toml"),
    ),
    ("asa_sul_grid", include_str!("../profiles/asa_sul_grid.toml")),
];

/// Ids of every embedded profile, in registry order.
#[must_use]
pub fn profile_ids() -> Vec<&'static str> {
    PROFILE_TOMLS.iter().map(|(id, _)| *id).collect()
}

/// Raw TOML of an embedded profile.
#[must_use]
pub fn profile_toml(id: &str) -> Option<&'static str> {
    PROFILE_TOMLS
        .iter()
        .find(|(name, _)| *name == id)
        .map(|(_, toml)| *toml)
}

/// Parses and validates an embedded profile.
///
/// # Errors
///
/// Returns [`GenerateError::UnknownProfile`] if `id` is not registered, or
/// [`GenerateError::Config`] if the profile does not parse or validate.
pub fn load_profile(id: &str) -> Result<GeneratorConfig, GenerateError> {
    let toml = profile_toml(id).ok_or_else(|| GenerateError::UnknownProfile {
        id: id.to_string(),
        available: profile_ids().join(", "),
    })?;
    let config = GeneratorConfig::from_toml_str(toml)?;
    config.validate()?;
    Ok(config)
}

/// Every embedded profile, parsed and validated.
///
/// # Errors
///
/// Returns the first profile that fails to load.
pub fn all_profiles() -> Result<Vec<GeneratorConfig>, GenerateError> {
    profile_ids().into_iter().map(load_profile).collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::config::HourDistribution;
    use crate::generator::{Generator, Sampler};

    #[test]
    fn all_profiles_validate() {
        let profiles = all_profiles().unwrap();
        assert_eq!(profiles.len(), PROFILE_TOMLS.len());
        for (config, id) in profiles.iter().zip(profile_ids()) {
            assert_eq!(config.name, id, "profile name must match its registry id");
            assert_eq!(config.calendar.holidays.len(), 54);
        }
    }

    #[test]
    fn default_profile_is_registered() {
        assert!(profile_ids().contains(&DEFAULT_PROFILE));
        let config = load_profile(DEFAULT_PROFILE).unwrap();
        assert!(matches!(
            config.hours,
            HourDistribution::WrappedNormal { .. }
        ));
        assert_eq!(config.output.constant_columns.len(), 2);
    }

    #[test]
    fn unknown_profile_lists_alternatives() {
        let err = load_profile("nowhere").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("nowhere"));
        assert!(message.contains("asa_sul_grid"));
    }

    #[test]
    fn every_profile_generates_records() {
        for id in profile_ids() {
            let config = load_profile(id).unwrap();
            let mut generator = Generator::new(&config, 2024).unwrap();
            let records: Vec<_> = generator.generate(1_000).collect();
            assert_eq!(records.len(), 1_000, "profile {id}");
            for record in &records {
                assert!(config.region_index(&record.region).is_some());
                if let Some(category) = &record.category {
                    assert!(config.category_index(category).is_some());
                }
            }
        }
    }

    #[test]
    fn sector_profile_missingness_converges() {
        let config = load_profile("asa_sul_sectors").unwrap();
        let sampler = Sampler::new(&config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(100);

        let n = 100_000;
        let mut missing_email = 0;
        let mut missing_age = 0;
        for _ in 0..n {
            let record = sampler.sample_record(&mut rng).unwrap();
            missing_email += usize::from(record.email.is_none());
            missing_age += usize::from(record.age.is_none());
        }
        let email_rate = missing_email as f64 / f64::from(n);
        let age_rate = missing_age as f64 / f64::from(n);
        assert!((email_rate - 0.2).abs() < 0.01, "email {email_rate}");
        assert!((age_rate - 0.08).abs() < 0.01, "age {age_rate}");
    }

    #[test]
    fn hotspot_records_stay_near_their_anchor() {
        let config = load_profile("asa_sul_hotspots").unwrap();
        let mut generator = Generator::new(&config, 8).unwrap();
        for record in generator.generate(5_000) {
            let region = &config.regions[config.region_index(&record.region).unwrap()];
            let [lat, lon] = region.anchors[0];
            let jitter = region.jitter.unwrap_or(config.placement.jitter);
            assert!((record.location.latitude - lat).abs() <= jitter + 1e-9);
            assert!((record.location.longitude - lon).abs() <= jitter + 1e-9);
        }
    }
}
