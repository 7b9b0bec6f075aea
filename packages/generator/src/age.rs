//! Age sampling: priority bands first, then a two-component mixture.

use rand::Rng;
use rand::distributions::Distribution as _;
use statrs::distribution::Normal;

use crate::config::{AgeComponent, AgeDistribution, ConfigError, GeneratorConfig};

struct Rule {
    region: Option<usize>,
    category: Option<usize>,
    min: u8,
    max: u8,
}

impl Rule {
    fn matches(&self, region: Option<usize>, category: Option<usize>) -> bool {
        let region_ok = self.region.is_none_or(|r| region == Some(r));
        let category_ok = self.category.is_none_or(|c| category == Some(c));
        region_ok && category_ok
    }
}

enum Shape {
    Normal(Normal),
    Uniform { min: u8, max: u8 },
}

struct Component {
    probability: f64,
    shape: Shape,
}

impl Component {
    fn new(label: &str, component: &AgeComponent) -> Result<Self, ConfigError> {
        let shape = match component.distribution {
            AgeDistribution::Normal { mean, std_dev } => Shape::Normal(
                Normal::new(mean, std_dev).map_err(|_| ConfigError::InvalidParameter {
                    context: format!("{label}.distribution.std_dev"),
                    value: std_dev,
                })?,
            ),
            AgeDistribution::Uniform { min, max } => Shape::Uniform { min, max },
        };
        Ok(Self {
            probability: component.probability,
            shape,
        })
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.shape {
            Shape::Normal(normal) => normal.sample(rng),
            Shape::Uniform { min, max } => f64::from(rng.gen_range(*min..=*max)),
        }
    }
}

/// Draws ages conditioned on region and category.
pub struct AgeSampler {
    min: u8,
    max: u8,
    rules: Vec<Rule>,
    young: Component,
    old: Component,
}

impl AgeSampler {
    /// Builds the sampler from a validated config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a rule references an unknown name or a
    /// normal component has an unusable standard deviation.
    pub fn new(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        let age = &config.age;
        let rules = age
            .priority_rules
            .iter()
            .enumerate()
            .map(|(i, rule)| {
                let region = rule
                    .region
                    .as_deref()
                    .map(|name| {
                        config
                            .region_index(name)
                            .ok_or_else(|| ConfigError::UnknownRegion {
                                context: format!("age.priority_rules[{i}]"),
                                name: name.to_string(),
                            })
                    })
                    .transpose()?;
                let category = rule
                    .category
                    .as_deref()
                    .map(|name| {
                        config
                            .category_index(name)
                            .ok_or_else(|| ConfigError::UnknownCategory {
                                context: format!("age.priority_rules[{i}]"),
                                name: name.to_string(),
                            })
                    })
                    .transpose()?;
                Ok(Rule {
                    region,
                    category,
                    min: rule.min,
                    max: rule.max,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            min: age.min,
            max: age.max,
            rules,
            young: Component::new("age.young", &age.young)?,
            old: Component::new("age.old", &age.old)?,
        })
    }

    /// Draws an age.
    ///
    /// The first priority rule matching `region`/`category` draws uniformly
    /// in its band. Otherwise the young component is used with its
    /// probability, then the old component with its probability, then a
    /// uniform draw over the full bounds. The result is rounded and clamped
    /// to the configured bounds.
    pub fn sample_age<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        region: Option<usize>,
        category: Option<usize>,
    ) -> u8 {
        if let Some(rule) = self.rules.iter().find(|r| r.matches(region, category)) {
            return rng.gen_range(rule.min..=rule.max);
        }

        let raw = if rng.gen_bool(self.young.probability) {
            self.young.draw(rng)
        } else if rng.gen_bool(self.old.probability) {
            self.old.draw(rng)
        } else {
            f64::from(rng.gen_range(self.min..=self.max))
        };

        self.clamp(raw)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn clamp(&self, raw: f64) -> u8 {
        let rounded = if raw.is_finite() { raw.round() } else { 0.0 };
        rounded.clamp(f64::from(self.min), f64::from(self.max)) as u8
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::config::AgeRule;
    use crate::config::tests::test_zone;

    #[test]
    fn ages_stay_in_global_bounds() {
        let mut config = test_zone();
        // Wide components push plenty of raw draws outside 7..=90.
        config.age.young.distribution = AgeDistribution::Normal {
            mean: 5.0,
            std_dev: 10.0,
        };
        config.age.old.distribution = AgeDistribution::Normal {
            mean: 88.0,
            std_dev: 10.0,
        };
        let sampler = AgeSampler::new(&config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(6);

        let mut hit_min = false;
        let mut hit_max = false;
        for _ in 0..20_000 {
            let age = sampler.sample_age(&mut rng, Some(0), Some(0));
            assert!((7..=90).contains(&age), "age {age}");
            hit_min |= age == 7;
            hit_max |= age == 90;
        }
        assert!(hit_min && hit_max);
    }

    #[test]
    fn priority_rule_draws_within_band() {
        let mut config = test_zone();
        config.age.priority_rules = vec![AgeRule {
            region: Some("TestZone".to_string()),
            category: Some("B".to_string()),
            min: 30,
            max: 35,
        }];
        let sampler = AgeSampler::new(&config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(6);

        for _ in 0..1_000 {
            let age = sampler.sample_age(&mut rng, Some(0), Some(1));
            assert!((30..=35).contains(&age));
        }
        // Category A does not match the rule.
        let outside = (0..1_000)
            .filter(|_| !(30..=35).contains(&sampler.sample_age(&mut rng, Some(0), Some(0))))
            .count();
        assert!(outside > 500);
    }

    #[test]
    fn wildcard_rule_matches_unknown_category() {
        let mut config = test_zone();
        config.age.priority_rules = vec![AgeRule {
            region: Some("TestZone".to_string()),
            category: None,
            min: 40,
            max: 40,
        }];
        let sampler = AgeSampler::new(&config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        assert_eq!(sampler.sample_age(&mut rng, Some(0), None), 40);
    }

    #[test]
    fn uniform_components_reproduce_band_mixture() {
        let mut config = test_zone();
        config.age.young.probability = 0.7;
        config.age.young.distribution = AgeDistribution::Uniform { min: 14, max: 23 };
        config.age.old.probability = 0.2;
        config.age.old.distribution = AgeDistribution::Uniform { min: 60, max: 70 };
        let sampler = AgeSampler::new(&config).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(31);

        let n = 20_000;
        let young = (0..n)
            .filter(|_| (14..=23).contains(&sampler.sample_age(&mut rng, None, None)))
            .count();
        // 0.7 from the band plus the uniform fallback's share of 14..=23.
        let rate = young as f64 / f64::from(n);
        assert!((0.70..0.75).contains(&rate), "young rate {rate}");
    }

    #[test]
    fn unknown_rule_region_fails_fast() {
        let mut config = test_zone();
        config.age.priority_rules = vec![AgeRule {
            region: Some("Elsewhere".to_string()),
            category: None,
            min: 10,
            max: 20,
        }];
        assert!(matches!(
            AgeSampler::new(&config),
            Err(ConfigError::UnknownRegion { .. })
        ));
    }
}
