//! Weighted category draws and the late-night severity bias.

use crime_synth_incident_models::DayType;
use rand::Rng;
use rand::distributions::{Distribution as _, WeightedIndex};

use crate::config::{ConfigError, GeneratorConfig};

/// Pre-built weighted distributions over the configured categories.
///
/// Weights are relative; [`WeightedIndex`] normalizes internally, so
/// vectors like `[30, 20, 5]` are used as-is.
pub struct CategorySampler {
    /// One distribution per day type, indexed by [`DayType::index`].
    by_day_type: Vec<WeightedIndex<f64>>,
    /// Per region, one distribution per day type. Only built when regional
    /// weighting is enabled.
    by_region: Option<Vec<Vec<WeightedIndex<f64>>>>,
    category_count: usize,
    nocturnal: Option<NocturnalBoost>,
}

struct NocturnalBoost {
    start_hour: u32,
    end_hour: u32,
    /// `severe[i]` is true when category `i` is in the severe subset.
    severe: Vec<bool>,
    replicas: usize,
    fresh_draws: usize,
    weighted_fresh_draws: bool,
}

impl NocturnalBoost {
    const fn applies_to_hour(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

impl CategorySampler {
    /// Builds the distributions from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AllZeroWeights`] if any combined weight vector
    /// cannot be sampled from.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        let weights = &config.categories.day_type_weights;
        let category_count = config.categories.names.len();

        let by_day_type = DayType::all()
            .iter()
            .map(|day_type| {
                weighted(
                    &format!("categories.day_type_weights.{day_type}"),
                    weights.for_day_type(*day_type),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let by_region = if config.categories.regional_weighting {
            let mut tables = Vec::with_capacity(config.regions.len());
            for region in &config.regions {
                let mut per_day_type = Vec::with_capacity(DayType::all().len());
                for day_type in DayType::all() {
                    let base = weights.for_day_type(*day_type);
                    let combined: Vec<f64> = match &region.category_multipliers {
                        Some(multipliers) => {
                            base.iter().zip(multipliers).map(|(b, m)| b * m).collect()
                        }
                        None => base.to_vec(),
                    };
                    per_day_type.push(weighted(
                        &format!("regions.{}.category_multipliers ({day_type})", region.name),
                        &combined,
                    )?);
                }
                tables.push(per_day_type);
            }
            Some(tables)
        } else {
            None
        };

        let nocturnal = match &config.nocturnal {
            Some(nocturnal) => {
                let mut severe = vec![false; category_count];
                for name in &nocturnal.severe {
                    let index =
                        config
                            .category_index(name)
                            .ok_or_else(|| ConfigError::UnknownCategory {
                                context: "nocturnal.severe".to_string(),
                                name: name.clone(),
                            })?;
                    severe[index] = true;
                }
                Some(NocturnalBoost {
                    start_hour: nocturnal.start_hour,
                    end_hour: nocturnal.end_hour,
                    severe,
                    replicas: nocturnal.replicas,
                    fresh_draws: nocturnal.fresh_draws,
                    weighted_fresh_draws: nocturnal.weighted_fresh_draws,
                })
            }
            None => None,
        };

        Ok(Self {
            by_day_type,
            by_region,
            category_count,
            nocturnal,
        })
    }

    /// Whether category draws depend on the region (so the region must be
    /// chosen first).
    #[must_use]
    pub const fn is_regional(&self) -> bool {
        self.by_region.is_some()
    }

    /// Draws a category index for the day type, multiplied element-wise by
    /// the region's weights when regional weighting is enabled and a region
    /// is given.
    pub fn sample_category<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        day_type: DayType,
        region: Option<usize>,
    ) -> usize {
        self.distribution(day_type, region).sample(rng)
    }

    /// Re-draws severe categories inside the nocturnal window with a bias
    /// toward keeping them.
    ///
    /// The candidate list holds `replicas` copies of `category` followed by
    /// `fresh_draws` new draws; one candidate is picked uniformly. Outside
    /// the window, or for non-severe categories, `category` is returned
    /// unchanged and no randomness is consumed.
    pub fn boost_nocturnal_severity<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        category: usize,
        hour: u32,
        day_type: DayType,
        region: Option<usize>,
    ) -> usize {
        let Some(boost) = &self.nocturnal else {
            return category;
        };
        if !boost.applies_to_hour(hour) || !boost.severe.get(category).copied().unwrap_or(false)
        {
            return category;
        }

        let mut candidates = vec![category; boost.replicas];
        for _ in 0..boost.fresh_draws {
            let fresh = if boost.weighted_fresh_draws {
                self.sample_category(rng, day_type, region)
            } else {
                rng.gen_range(0..self.category_count)
            };
            candidates.push(fresh);
        }

        candidates[rng.gen_range(0..candidates.len())]
    }

    fn distribution(&self, day_type: DayType, region: Option<usize>) -> &WeightedIndex<f64> {
        let regional = self
            .by_region
            .as_ref()
            .zip(region)
            .and_then(|(tables, region)| tables.get(region));
        let tables = regional.unwrap_or(&self.by_day_type);
        &tables[day_type.index()]
    }
}

/// Builds a [`WeightedIndex`], mapping rejection to a config error.
pub(crate) fn weighted(table: &str, weights: &[f64]) -> Result<WeightedIndex<f64>, ConfigError> {
    WeightedIndex::new(weights).map_err(|e| {
        log::debug!("Rejected weight vector {table}: {e}");
        ConfigError::AllZeroWeights {
            table: table.to_string(),
        }
    })
}
