//! Record assembly and the seeded generation loop.
//!
//! [`Sampler`] chains the individual sampling steps in data-dependency
//! order for a single record. [`Generator`] owns the seeded random stream
//! and hands out a lazy [`Records`] iterator over a bounded number of
//! attempts.

use chrono::Timelike as _;
use crime_synth_incident_models::SyntheticIncidentRecord;
use rand::{Rng, SeedableRng as _};
use rand_chacha::ChaCha20Rng;

use crate::age::AgeSampler;
use crate::calendar::{TimestampSampler, classify_day_type};
use crate::category::CategorySampler;
use crate::config::{
    CalendarConfig, CategoryConfig, ConfigError, ExhaustionPolicy, GeneratorConfig,
    MissingnessConfig,
};
use crate::identity::IdentityProvider;
use crate::missingness::apply_missingness;
use crate::placement::Placer;
use crate::region::RegionSampler;

/// Every sampler a record needs, built once from a validated config.
pub struct Sampler {
    calendar: CalendarConfig,
    timestamps: TimestampSampler,
    categories: CategorySampler,
    regions: RegionSampler,
    placer: Placer,
    ages: AgeSampler,
    identity: IdentityProvider,
    missingness: MissingnessConfig,
    category_table: CategoryConfig,
    region_names: Vec<String>,
}

impl Sampler {
    /// Validates `config` and builds the samplers.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let timestamps = TimestampSampler::new(config.window, config.hours)?;

        Ok(Self {
            calendar: config.calendar.clone(),
            timestamps,
            categories: CategorySampler::new(config)?,
            regions: RegionSampler::new(config)?,
            placer: Placer::new(config),
            ages: AgeSampler::new(config)?,
            identity: IdentityProvider::new(&config.identity),
            missingness: config.missingness,
            category_table: config.categories.clone(),
            region_names: config.regions.iter().map(|r| r.name.clone()).collect(),
        })
    }

    /// Builds one record, or `None` when placement exhausted its attempts.
    ///
    /// Order: timestamp, day type, region (only when category weights are
    /// regional), category, nocturnal boost, region (otherwise), location,
    /// age, identity, missingness, severity.
    pub fn sample_record<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<SyntheticIncidentRecord> {
        let occurred_at = self.timestamps.sample(rng);
        let day_type = classify_day_type(occurred_at, &self.calendar);
        let hour = occurred_at.hour();

        let (category, region) = if self.categories.is_regional() {
            let region = self.regions.choose_region(rng, None, day_type);
            let category = self.categories.sample_category(rng, day_type, Some(region));
            let category = self.categories.boost_nocturnal_severity(
                rng,
                category,
                hour,
                day_type,
                Some(region),
            );
            (category, region)
        } else {
            let category = self.categories.sample_category(rng, day_type, None);
            let category =
                self.categories
                    .boost_nocturnal_severity(rng, category, hour, day_type, None);
            let region = self.regions.choose_region(rng, Some(category), day_type);
            (category, region)
        };

        let location = self.placer.place_location(rng, region, Some(category))?;
        let age = self.ages.sample_age(rng, Some(region), Some(category));
        let region_name = &self.region_names[region];
        let identity = self.identity.identity(rng, region_name);

        let record = SyntheticIncidentRecord {
            occurred_at,
            time_of_day: Some(occurred_at.time()),
            day_type,
            category: Some(self.category_table.names[category].clone()),
            severity: 1,
            region: region_name.clone(),
            location,
            age: Some(age),
            name: Some(identity.name),
            national_id: Some(identity.national_id),
            email: Some(identity.email),
            phone: Some(identity.phone),
            address: Some(identity.address),
        };

        let record = apply_missingness(record, &self.missingness, rng);
        let severity = self.category_table.severity_of(record.category.as_deref());
        Some(SyntheticIncidentRecord { severity, ..record })
    }
}

/// Seeded record generator.
pub struct Generator {
    sampler: Sampler,
    rng: ChaCha20Rng,
    seed: u64,
    on_exhaustion: ExhaustionPolicy,
}

impl Generator {
    /// Builds a generator with an explicit seed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config does not validate.
    pub fn new(config: &GeneratorConfig, seed: u64) -> Result<Self, ConfigError> {
        Ok(Self {
            sampler: Sampler::new(config)?,
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
            on_exhaustion: config.placement.on_exhaustion,
        })
    }

    /// Builds a generator seeded from the config, or from OS entropy when
    /// the config has no seed. The chosen seed is logged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config does not validate.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or_else(|| {
            let seed = rand::random::<u64>();
            log::info!("No seed configured, using {seed}");
            seed
        });
        Self::new(config, seed)
    }

    /// Seed the random stream was initialised with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Lazily generates at most `n` records, one attempt per slot.
    ///
    /// The stream continues from wherever the previous call left it, so
    /// two calls on one generator do not repeat records.
    pub const fn generate(&mut self, n: u64) -> Records<'_> {
        Records {
            generator: self,
            remaining: n,
            dropped: 0,
            halted: false,
        }
    }
}

/// Iterator returned by [`Generator::generate`].
pub struct Records<'a> {
    generator: &'a mut Generator,
    remaining: u64,
    dropped: u64,
    halted: bool,
}

impl Records<'_> {
    /// Attempts skipped because placement ran out of retries.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Whether the run ended early under [`ExhaustionPolicy::Halt`].
    #[must_use]
    pub const fn halted(&self) -> bool {
        self.halted
    }
}

impl Iterator for Records<'_> {
    type Item = SyntheticIncidentRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 && !self.halted {
            self.remaining -= 1;
            let generator = &mut *self.generator;
            if let Some(record) = generator.sampler.sample_record(&mut generator.rng) {
                return Some(record);
            }

            self.dropped += 1;
            log::debug!("Placement exhausted, dropping attempt ({} so far)", self.dropped);
            if generator.on_exhaustion == ExhaustionPolicy::Halt {
                log::warn!("Placement exhausted, halting run");
                self.halted = true;
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.halted {
            return (0, Some(0));
        }
        (0, usize::try_from(self.remaining).ok())
    }
}
