//! Obstacle field and per-kind collision geometry
//!
//! Obstacles are generated once per session and never move. Each caches the
//! ground height at its position so collision tests never resample terrain.

use glam::Vec2;
use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::{Error as WeightError, WeightedIndex};
use serde::{Deserialize, Serialize};

use super::terrain::Terrain;
use crate::config::{ConfigError, ObstacleWeights, RaceConfig};

/// Rock hazard: circle centered this far above the ground
pub const ROCK_CENTER_LIFT: f32 = 20.0;
pub const ROCK_RADIUS: f32 = 24.0;

/// Log hazard box, relative to `(x, y)`
pub const LOG_LEFT: f32 = 28.0;
pub const LOG_RIGHT: f32 = 26.0;
pub const LOG_TOP: f32 = 22.0;
pub const LOG_BOTTOM: f32 = 2.0;

/// Ramp trigger box, relative to `(x, y)`
pub const RAMP_LEFT: f32 = 10.0;
pub const RAMP_RIGHT: f32 = 100.0;
pub const RAMP_HEIGHT: f32 = 64.0;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Solid hazard, round
    Rock,
    /// Solid hazard, boxy
    Log,
    /// Launch trigger, not a hazard
    Ramp,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Rock, ObstacleKind::Log, ObstacleKind::Ramp];

    /// Rocks and logs slow a rider down; ramps launch them
    pub fn is_hazard(&self) -> bool {
        !matches!(self, ObstacleKind::Ramp)
    }
}

/// A single obstacle resting on the terrain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub x: f32,
    /// Ground height at `x`, cached at creation
    pub y: f32,
}

impl Obstacle {
    pub fn new(kind: ObstacleKind, x: f32, terrain: &Terrain) -> Self {
        Self {
            kind,
            x,
            y: terrain.height_at(x),
        }
    }

    /// Test a contact point (a rider's front wheel) against this obstacle
    pub fn collides(&self, p: Vec2) -> bool {
        match self.kind {
            ObstacleKind::Rock => {
                let center = Vec2::new(self.x, self.y - ROCK_CENTER_LIFT);
                p.distance_squared(center) < ROCK_RADIUS * ROCK_RADIUS
            }
            ObstacleKind::Log => {
                (self.x - LOG_LEFT..=self.x + LOG_RIGHT).contains(&p.x)
                    && (self.y - LOG_TOP..=self.y - LOG_BOTTOM).contains(&p.y)
            }
            ObstacleKind::Ramp => {
                (self.x - RAMP_LEFT..=self.x + RAMP_RIGHT).contains(&p.x)
                    && (self.y - RAMP_HEIGHT..=self.y).contains(&p.y)
            }
        }
    }
}

/// Obstacles along the track, sorted by `x`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ObstacleField {
    items: Vec<Obstacle>,
}

impl ObstacleField {
    /// Build a field from hand-placed obstacles (sorted by `x` here)
    pub fn from_obstacles(mut items: Vec<Obstacle>) -> Self {
        items.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self { items }
    }

    /// Obstacles in ascending `x` order
    pub fn items(&self) -> &[Obstacle] {
        &self.items
    }

    /// Lay out obstacles from the lead-in to `length - margin`.
    ///
    /// Gaps are drawn uniformly from `spacing`; kinds are drawn with `weights`.
    /// Fails if the weights sum to zero or overflow the sampler.
    pub fn generate<R: Rng>(
        length: f32,
        lead_in: f32,
        margin: f32,
        spacing: (f32, f32),
        weights: &ObstacleWeights,
        terrain: &Terrain,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let kind_dist = WeightedIndex::new([weights.rock, weights.log, weights.ramp])
            .map_err(|e| match e {
                WeightError::Overflow => ConfigError::ObstacleWeightOverflow {
                    total: weights.total(),
                },
                _ => ConfigError::ZeroObstacleWeight,
            })?;

        let (min_gap, max_gap) = spacing;
        let limit = length - margin;
        let mut items = Vec::new();
        let mut x = lead_in;
        loop {
            let gap = if min_gap < max_gap {
                rng.random_range(min_gap..=max_gap)
            } else {
                min_gap
            };
            if gap <= 0.0 {
                break;
            }
            x += gap;
            if x > limit {
                break;
            }
            let kind = ObstacleKind::ALL[kind_dist.sample(rng)];
            items.push(Obstacle::new(kind, x, terrain));
        }

        log::debug!("Generated {} obstacles over {} units", items.len(), length);
        Ok(Self { items })
    }

    /// Generate the field described by a race configuration
    pub fn from_config<R: Rng>(
        config: &RaceConfig,
        terrain: &Terrain,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        Self::generate(
            config.track_length,
            config.obstacle_lead_in,
            config.obstacle_finish_margin,
            config.obstacle_spacing,
            &config.obstacle_weights,
            terrain,
            rng,
        )
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Obstacles whose `x` lies within `radius` of `x`
    pub fn near(&self, x: f32, radius: f32) -> impl Iterator<Item = &Obstacle> {
        // Sorted by x, so only the slice between the two bounds matters
        let start = self.items.partition_point(|o| o.x < x - radius);
        self.items[start..]
            .iter()
            .take_while(move |o| o.x <= x + radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn flat() -> Terrain {
        Terrain::new(720.0)
    }

    fn rock_at(x: f32, y: f32) -> Obstacle {
        Obstacle {
            kind: ObstacleKind::Rock,
            x,
            y,
        }
    }

    fn default_field(seed: u64) -> ObstacleField {
        let config = RaceConfig::default();
        let mut rng = Pcg32::seed_from_u64(seed);
        ObstacleField::from_config(&config, &flat(), &mut rng).unwrap()
    }

    #[test]
    fn test_rock_center_collides() {
        let rock = rock_at(500.0, 700.0);
        assert!(rock.collides(Vec2::new(500.0, 700.0 - ROCK_CENTER_LIFT)));
    }

    #[test]
    fn test_rock_boundary() {
        let rock = rock_at(500.0, 700.0);
        let center_y = 700.0 - ROCK_CENTER_LIFT;
        assert!(rock.collides(Vec2::new(523.0, center_y)));
        assert!(!rock.collides(Vec2::new(525.0, center_y)));
        assert!(!rock.collides(Vec2::new(475.0, center_y)));
        // Exactly on the radius is outside
        assert!(!rock.collides(Vec2::new(524.0, center_y)));
    }

    #[test]
    fn test_log_box() {
        let log = Obstacle {
            kind: ObstacleKind::Log,
            x: 1000.0,
            y: 700.0,
        };
        assert!(log.collides(Vec2::new(1000.0, 690.0)));
        assert!(log.collides(Vec2::new(972.0, 678.0)));
        assert!(log.collides(Vec2::new(1026.0, 698.0)));
        assert!(!log.collides(Vec2::new(1027.0, 690.0)));
        assert!(!log.collides(Vec2::new(1000.0, 699.0)));
        assert!(!log.collides(Vec2::new(1000.0, 677.0)));
    }

    #[test]
    fn test_ramp_box() {
        let ramp = Obstacle {
            kind: ObstacleKind::Ramp,
            x: 1000.0,
            y: 700.0,
        };
        assert!(ramp.collides(Vec2::new(990.0, 700.0)));
        assert!(ramp.collides(Vec2::new(1100.0, 636.0)));
        assert!(!ramp.collides(Vec2::new(989.0, 690.0)));
        assert!(!ramp.collides(Vec2::new(1050.0, 635.0)));
        assert!(!ramp.kind.is_hazard());
    }

    #[test]
    fn test_field_layout_bounds() {
        let config = RaceConfig::default();
        for seed in 0..20 {
            let field = default_field(seed);
            assert!(!field.is_empty());
            let mut prev = config.obstacle_lead_in;
            for ob in &field.items {
                let gap = ob.x - prev;
                assert!(gap >= config.obstacle_spacing.0 - 0.01);
                assert!(gap <= config.obstacle_spacing.1 + 0.01);
                assert!(ob.x <= config.track_length - config.obstacle_finish_margin);
                prev = ob.x;
            }
        }
    }

    #[test]
    fn test_field_caches_ground_height() {
        let terrain = Terrain::new(650.0);
        let mut rng = Pcg32::seed_from_u64(3);
        let field =
            ObstacleField::from_config(&RaceConfig::default(), &terrain, &mut rng).unwrap();
        for ob in &field.items {
            assert_eq!(ob.y, terrain.height_at(ob.x));
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        assert_eq!(default_field(77), default_field(77));
        assert_ne!(default_field(77), default_field(78));
    }

    #[test]
    fn test_zero_weights_fail() {
        let weights = ObstacleWeights {
            rock: 0,
            log: 0,
            ramp: 0,
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let result = ObstacleField::generate(
            4000.0,
            400.0,
            200.0,
            (280.0, 520.0),
            &weights,
            &flat(),
            &mut rng,
        );
        assert!(matches!(result, Err(ConfigError::ZeroObstacleWeight)));
    }

    #[test]
    fn test_overflowing_weights_fail() {
        let weights = ObstacleWeights {
            rock: u32::MAX,
            log: 1,
            ramp: 0,
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let result = ObstacleField::generate(
            4000.0,
            400.0,
            200.0,
            (280.0, 520.0),
            &weights,
            &flat(),
            &mut rng,
        );
        assert!(matches!(
            result,
            Err(ConfigError::ObstacleWeightOverflow { .. })
        ));
    }

    #[test]
    fn test_hand_placed_field_is_sorted() {
        let terrain = flat();
        let field = ObstacleField::from_obstacles(vec![
            Obstacle::new(ObstacleKind::Ramp, 1500.0, &terrain),
            Obstacle::new(ObstacleKind::Rock, 700.0, &terrain),
            Obstacle::new(ObstacleKind::Log, 1100.0, &terrain),
        ]);
        let xs: Vec<f32> = field.items().iter().map(|o| o.x).collect();
        assert_eq!(xs, [700.0, 1100.0, 1500.0]);
        let near: Vec<_> = field.near(1000.0, 150.0).map(|o| o.kind).collect();
        assert_eq!(near, [ObstacleKind::Log]);
    }

    #[test]
    fn test_single_kind_weights() {
        let weights = ObstacleWeights {
            rock: 0,
            log: 0,
            ramp: 3,
        };
        let mut rng = Pcg32::seed_from_u64(1);
        let field = ObstacleField::generate(
            4000.0,
            400.0,
            200.0,
            (280.0, 520.0),
            &weights,
            &flat(),
            &mut rng,
        )
        .unwrap();
        assert!(field.items.iter().all(|o| o.kind == ObstacleKind::Ramp));
    }

    #[test]
    fn test_near_matches_linear_scan() {
        let field = default_field(5);
        for x in (0..4000).step_by(37) {
            let x = x as f32;
            let fast: Vec<_> = field.near(x, 80.0).copied().collect();
            let slow: Vec<_> = field
                .items
                .iter()
                .filter(|o| (o.x - x).abs() <= 80.0)
                .copied()
                .collect();
            assert_eq!(fast, slow);
        }
    }
}
