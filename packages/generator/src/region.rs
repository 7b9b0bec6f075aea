//! Region selection.

use std::collections::BTreeMap;

use crime_synth_incident_models::DayType;
use rand::Rng;
use rand::distributions::{Distribution as _, WeightedIndex};

use crate::category::weighted;
use crate::config::{ConfigError, GeneratorConfig};

/// Weighted region choice, optionally biased by category.
pub struct RegionSampler {
    /// One distribution per day type, indexed by [`DayType::index`].
    base: Vec<WeightedIndex<f64>>,
    /// category index -> per-day-type distributions with preferred regions
    /// boosted.
    preferred: BTreeMap<usize, Vec<WeightedIndex<f64>>>,
}

impl RegionSampler {
    /// Builds the distributions from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a referenced name is unknown or a combined
    /// weight vector has no positive weight.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        let base_weights = |day_type: DayType| -> Vec<f64> {
            config
                .regions
                .iter()
                .map(|r| r.selection_weight * r.day_type_multipliers.for_day_type(day_type))
                .collect()
        };

        let base = DayType::all()
            .iter()
            .map(|day_type| {
                weighted(
                    &format!("regions.selection_weight ({day_type})"),
                    &base_weights(*day_type),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut preferred = BTreeMap::new();
        if let Some(table) = &config.preferred_regions {
            for (category, regions) in &table.categories {
                let category_index =
                    config
                        .category_index(category)
                        .ok_or_else(|| ConfigError::UnknownCategory {
                            context: "preferred_regions".to_string(),
                            name: category.clone(),
                        })?;

                let mut boosted = vec![false; config.regions.len()];
                for region in regions {
                    let index =
                        config
                            .region_index(region)
                            .ok_or_else(|| ConfigError::UnknownRegion {
                                context: format!("preferred_regions.{category}"),
                                name: region.clone(),
                            })?;
                    boosted[index] = true;
                }

                let per_day_type = DayType::all()
                    .iter()
                    .map(|day_type| {
                        let weights: Vec<f64> = base_weights(*day_type)
                            .into_iter()
                            .zip(&boosted)
                            .map(|(w, &b)| if b { w * table.multiplicity } else { w })
                            .collect();
                        weighted(
                            &format!("preferred_regions.{category} ({day_type})"),
                            &weights,
                        )
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                preferred.insert(category_index, per_day_type);
            }
        }

        Ok(Self { base, preferred })
    }

    /// Draws a region index.
    ///
    /// Regions are weighted by `selection_weight` times their day-type
    /// multiplier. When `category` has preferred regions, those regions'
    /// weights are multiplied by the configured multiplicity.
    pub fn choose_region<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        category: Option<usize>,
        day_type: DayType,
    ) -> usize {
        let tables = category
            .and_then(|c| self.preferred.get(&c))
            .unwrap_or(&self.base);
        tables[day_type.index()].sample(rng)
    }
}
