//! Location placement: anchor choice, jitter and exclusion zones.
//!
//! Placement is a bounded retry loop. Each attempt picks one of the
//! region's anchors, adds independent uniform jitter on each axis and
//! rejects the point if it lands inside any exclusion zone. After
//! `max_attempts` rejections the caller gets `None`.

use crime_synth_incident_models::Coordinates;
use geo::{Distance as _, Euclidean, Point};
use rand::Rng;

use crate::config::GeneratorConfig;

/// A circular no-go area in degree space.
struct Zone {
    center: Point<f64>,
    radius: f64,
}

struct RegionAnchors {
    anchors: Vec<Coordinates>,
    jitter: Option<f64>,
}

/// Places records near their region's anchors.
pub struct Placer {
    regions: Vec<RegionAnchors>,
    default_jitter: f64,
    /// Per category index, an optional jitter override.
    category_jitter: Vec<Option<f64>>,
    zones: Vec<Zone>,
    max_attempts: u32,
}

impl Placer {
    /// Builds a placer from a validated config.
    #[must_use]
    pub fn new(config: &GeneratorConfig) -> Self {
        let regions = config
            .regions
            .iter()
            .map(|region| RegionAnchors {
                anchors: region
                    .anchors
                    .iter()
                    .map(|&[lat, lon]| Coordinates::new(lat, lon))
                    .collect(),
                jitter: region.jitter,
            })
            .collect();

        let category_jitter = config
            .categories
            .names
            .iter()
            .map(|name| config.placement.category_jitter.get(name).copied())
            .collect();

        let zones = config
            .placement
            .exclusion_zones
            .iter()
            .map(|zone| Zone {
                center: Point::new(zone.center[1], zone.center[0]),
                radius: zone.radius,
            })
            .collect();

        Self {
            regions,
            default_jitter: config.placement.jitter,
            category_jitter,
            zones,
            max_attempts: config.placement.max_attempts,
        }
    }

    /// Jitter half-width for a region/category pair.
    ///
    /// A category override wins over a region override, which wins over the
    /// default.
    #[must_use]
    pub fn jitter_for(&self, region: usize, category: Option<usize>) -> f64 {
        category
            .and_then(|c| self.category_jitter.get(c).copied().flatten())
            .or_else(|| self.regions.get(region).and_then(|r| r.jitter))
            .unwrap_or(self.default_jitter)
    }

    /// Whether `location` is inside (or on the edge of) any exclusion zone.
    #[must_use]
    pub fn is_excluded(&self, location: Coordinates) -> bool {
        let point = Point::new(location.longitude, location.latitude);
        self.zones
            .iter()
            .any(|zone| Euclidean.distance(point, zone.center) <= zone.radius)
    }

    /// Places a record in `region`, retrying until the point is outside
    /// every exclusion zone.
    ///
    /// Returns `None` once `max_attempts` placements have all landed inside
    /// a zone.
    pub fn place_location<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        region: usize,
        category: Option<usize>,
    ) -> Option<Coordinates> {
        let anchors = &self.regions.get(region)?.anchors;
        let jitter = self.jitter_for(region, category);

        for _ in 0..self.max_attempts {
            let anchor = if anchors.len() == 1 {
                anchors[0]
            } else {
                anchors[rng.gen_range(0..anchors.len())]
            };
            let candidate = Coordinates::new(
                anchor.latitude + offset(rng, jitter),
                anchor.longitude + offset(rng, jitter),
            );
            if !self.is_excluded(candidate) {
                return Some(candidate);
            }
        }

        None
    }
}

/// Uniform offset in `[-jitter, jitter)`. Always consumes one draw so the
/// stream position does not depend on the jitter value.
fn offset<R: Rng + ?Sized>(rng: &mut R, jitter: f64) -> f64 {
    rng.r#gen::<f64>().mul_add(2.0, -1.0) * jitter
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_chacha::ChaCha20Rng;

    use super::*;
    use crate::config::ExclusionZone;
    use crate::config::tests::test_zone;

    #[test]
    fn jitter_stays_within_bounds() {
        let placer = Placer::new(&test_zone());
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        for _ in 0..5_000 {
            let c = placer.place_location(&mut rng, 0, Some(0)).unwrap();
            assert!(c.latitude.abs() <= 0.01, "lat {}", c.latitude);
            assert!(c.longitude.abs() <= 0.01, "lon {}", c.longitude);
        }
    }

    #[test]
    fn zero_jitter_returns_anchor() {
        let mut config = test_zone();
        config.placement.jitter = 0.0;
        config.regions[0].anchors = vec![[-15.8, -47.9]];
        let placer = Placer::new(&config);
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let c = placer.place_location(&mut rng, 0, None).unwrap();
        assert!((c.latitude + 15.8).abs() < 1e-12);
        assert!((c.longitude + 47.9).abs() < 1e-12);
    }

    #[test]
    fn jitter_precedence() {
        let mut config = test_zone();
        config.placement.jitter = 0.007;
        config.regions[0].jitter = Some(0.001);
        config
            .placement
            .category_jitter
            .insert("B".to_string(), 0.0005);
        let placer = Placer::new(&config);
        assert!((placer.jitter_for(0, Some(1)) - 0.0005).abs() < f64::EPSILON);
        assert!((placer.jitter_for(0, Some(0)) - 0.001).abs() < f64::EPSILON);
        assert!((placer.jitter_for(0, None) - 0.001).abs() < f64::EPSILON);
    }

    #[test]
    fn picks_among_multiple_anchors() {
        let mut config = test_zone();
        config.placement.jitter = 0.0;
        config.regions[0].anchors = vec![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let placer = Placer::new(&config);
        let mut rng = ChaCha20Rng::seed_from_u64(9);

        let mut seen = [false; 3];
        for _ in 0..300 {
            let c = placer.place_location(&mut rng, 0, None).unwrap();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let idx = c.latitude.round() as usize - 1;
            seen[idx] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn never_places_inside_exclusion_zone() {
        let mut config = test_zone();
        config.placement.jitter = 0.01;
        config.placement.exclusion_zones = vec![ExclusionZone {
            center: [0.0, 0.0],
            radius: 0.005,
        }];
        let placer = Placer::new(&config);
        let mut rng = ChaCha20Rng::seed_from_u64(12);

        let mut placed = 0;
        for _ in 0..5_000 {
            if let Some(c) = placer.place_location(&mut rng, 0, None) {
                let distance = c.latitude.hypot(c.longitude);
                assert!(distance > 0.005, "placed inside zone at {distance}");
                placed += 1;
            }
        }
        assert!(placed > 4_900);
    }

    #[test]
    fn exhausts_when_anchor_is_fully_covered() {
        let mut config = test_zone();
        config.placement.jitter = 0.0;
        config.placement.exclusion_zones = vec![ExclusionZone {
            center: [0.0, 0.0],
            radius: 1.0,
        }];
        let placer = Placer::new(&config);
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        assert!(placer.place_location(&mut rng, 0, None).is_none());
    }

    #[test]
    fn unknown_region_cannot_be_placed() {
        let placer = Placer::new(&test_zone());
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert!(placer.place_location(&mut rng, 5, None).is_none());
    }
}
