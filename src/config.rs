//! Race configuration
//!
//! Every tunable the simulation reads lives here. Defaults reproduce the
//! reference constants in [`crate::consts`]; sessions validate the set once at
//! construction so the tick loop never has to.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while building a race configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A numeric field must be strictly positive and finite.
    #[error("{field} must be positive and finite (got {value})")]
    NotPositive { field: &'static str, value: f64 },
    /// A numeric field must be finite.
    #[error("{field} must be finite (got {value})")]
    NotFinite { field: &'static str, value: f64 },
    /// A numeric field must be non-negative and finite.
    #[error("{field} must be non-negative and finite (got {value})")]
    Negative { field: &'static str, value: f64 },
    /// A `(min, max)` pair is inverted.
    #[error("{field} range is inverted ({min} > {max})")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    /// A probability-like value falls outside `[0, 1]`.
    #[error("{field} must lie within 0.0..=1.0 (got {value})")]
    OutOfUnitRange { field: &'static str, value: f64 },
    /// Obstacle kind weights sum to zero.
    #[error("obstacle weights must not all be zero")]
    ZeroObstacleWeight,
    /// Obstacle kind weights sum past what the kind sampler can hold.
    #[error("obstacle weights sum to {total}, above the limit of {}", u32::MAX)]
    ObstacleWeightOverflow { total: u64 },
    /// Obstacle field does not fit on the track.
    #[error("obstacle lead-in {lead_in} plus finish margin {margin} exceeds track length {track}")]
    TrackTooShort { lead_in: f32, margin: f32, track: f32 },
    /// Configuration text could not be parsed.
    #[error("invalid configuration json: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Relative weights for obstacle kinds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleWeights {
    pub rock: u32,
    pub log: u32,
    pub ramp: u32,
}

impl Default for ObstacleWeights {
    fn default() -> Self {
        // Rock and log twice as common as ramps
        Self {
            rock: 2,
            log: 2,
            ramp: 1,
        }
    }
}

impl ObstacleWeights {
    /// Sum of all weights, widened so large configured values cannot wrap
    pub fn total(&self) -> u64 {
        u64::from(self.rock) + u64::from(self.log) + u64::from(self.ramp)
    }
}

/// Injectable race configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Seed for obstacle layout and bot behavior
    pub seed: u64,

    // === Track ===
    pub track_length: f32,
    /// Baseline ground height the terrain undulates around
    pub ground_level: f32,
    pub start_x: f32,

    // === Rider ===
    pub ride_height: f32,
    pub contact_offset: f32,
    pub gravity: f32,
    pub jump_impulse: f32,
    pub max_speed: f32,
    pub accel: f32,
    pub brake: f32,
    /// Fractional speed lost per coasting tick
    pub friction: f32,

    // === Obstacles ===
    pub obstacle_spacing: (f32, f32),
    pub obstacle_lead_in: f32,
    pub obstacle_finish_margin: f32,
    pub obstacle_weights: ObstacleWeights,
    /// Obstacles farther than this from a rider are never collision-tested
    pub proximity: f32,

    // === Bots ===
    pub bot_count: usize,
    pub speed_bias_range: (f32, f32),
    pub jump_bias_range: (f32, f32),

    // === Timing ===
    pub tick_ms: u32,
    pub max_substeps: u32,
    pub countdown_ms: u64,
    /// How long bots keep racing after the player finishes
    pub finish_grace_ms: u64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            seed: 0,

            track_length: TRACK_LEN,
            ground_level: GROUND_Y,
            start_x: START_X,

            ride_height: RIDE_HEIGHT,
            contact_offset: CONTACT_OFFSET,
            gravity: GRAVITY,
            jump_impulse: JUMP_VY,
            max_speed: MAX_SPEED,
            accel: ACCEL,
            brake: BRAKE,
            friction: FRICTION,

            obstacle_spacing: OBSTACLE_SPACING,
            obstacle_lead_in: OBSTACLE_LEAD_IN,
            obstacle_finish_margin: OBSTACLE_FINISH_MARGIN,
            obstacle_weights: ObstacleWeights::default(),
            proximity: PROXIMITY,

            bot_count: BOT_COUNT,
            speed_bias_range: SPEED_BIAS_RANGE,
            jump_bias_range: JUMP_BIAS_RANGE,

            tick_ms: TICK_MS,
            max_substeps: MAX_SUBSTEPS,
            countdown_ms: COUNTDOWN_MS,
            finish_grace_ms: FINISH_GRACE_MS,
        }
    }
}

impl RaceConfig {
    /// Reference configuration with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse a JSON configuration (missing keys fall back to defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field; sessions refuse to start on an invalid set.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("track_length", self.track_length)?;
        finite("ground_level", self.ground_level)?;
        non_negative("start_x", self.start_x)?;
        non_negative("ride_height", self.ride_height)?;
        non_negative("contact_offset", self.contact_offset)?;
        positive("gravity", self.gravity)?;
        positive("jump_impulse", self.jump_impulse)?;
        positive("max_speed", self.max_speed)?;
        positive("accel", self.accel)?;
        positive("brake", self.brake)?;
        unit("friction", self.friction)?;

        let (min_gap, max_gap) = self.obstacle_spacing;
        positive("obstacle_spacing.min", min_gap)?;
        positive("obstacle_spacing.max", max_gap)?;
        ordered("obstacle_spacing", self.obstacle_spacing)?;
        non_negative("obstacle_lead_in", self.obstacle_lead_in)?;
        non_negative("obstacle_finish_margin", self.obstacle_finish_margin)?;
        if self.obstacle_lead_in + self.obstacle_finish_margin > self.track_length {
            return Err(ConfigError::TrackTooShort {
                lead_in: self.obstacle_lead_in,
                margin: self.obstacle_finish_margin,
                track: self.track_length,
            });
        }
        match self.obstacle_weights.total() {
            0 => return Err(ConfigError::ZeroObstacleWeight),
            total if total > u64::from(u32::MAX) => {
                return Err(ConfigError::ObstacleWeightOverflow { total });
            }
            _ => {}
        }
        non_negative("proximity", self.proximity)?;

        for (field, range) in [
            ("speed_bias_range", self.speed_bias_range),
            ("jump_bias_range", self.jump_bias_range),
        ] {
            unit(field, range.0)?;
            unit(field, range.1)?;
            ordered(field, range)?;
        }

        if self.tick_ms == 0 {
            return Err(ConfigError::NotPositive {
                field: "tick_ms",
                value: 0.0,
            });
        }
        if self.max_substeps == 0 {
            return Err(ConfigError::NotPositive {
                field: "max_substeps",
                value: 0.0,
            });
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite {
            field,
            value: value as f64,
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            field,
            value: value as f64,
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative {
            field,
            value: value as f64,
        })
    }
}

fn unit(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfUnitRange {
            field,
            value: value as f64,
        })
    }
}

fn ordered(field: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange {
            field,
            min: min as f64,
            max: max as f64,
        })
    }
}
