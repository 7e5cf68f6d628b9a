//! Rider kinematics
//!
//! One `Actor` per competitor. The same update runs for the player and for
//! bots; only the source of `ActorInput` differs.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::obstacle::{ObstacleField, ObstacleKind};
use super::terrain::Terrain;
use crate::config::RaceConfig;
use crate::consts::*;

/// Player bike color
pub const PLAYER_COLOR: &str = "#7fc8ff";
/// Bot bike colors, assigned in roster order
pub const BOT_PALETTE: [&str; 5] = ["#ffa07a", "#a2ff9c", "#ffda7f", "#caa0ff", "#9fe0ff"];

/// Control signals for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInput {
    pub throttle: bool,
    pub brake: bool,
    /// One-shot jump request
    pub jump: bool,
}

/// Per-race personality of a bot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotBias {
    /// Fraction of max speed the bot cruises at
    pub speed: f32,
    /// Probability of jumping a hazard once it is in range
    pub jump: f32,
}

impl BotBias {
    /// Draw a fresh personality from the configured ranges
    pub fn draw<R: Rng>(config: &RaceConfig, rng: &mut R) -> Self {
        Self {
            speed: draw_in(config.speed_bias_range, rng),
            jump: draw_in(config.jump_bias_range, rng),
        }
    }
}

fn draw_in<R: Rng>((min, max): (f32, f32), rng: &mut R) -> f32 {
    if min < max {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// What an obstacle did to a rider this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleReaction {
    /// Hit a ramp and got launched
    Launched,
    /// Hit a rock or log and stumbled
    Bumped(ObstacleKind),
}

/// A competitor (human or bot)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub name: String,
    /// Display color (presentation only)
    pub color: String,
    /// Present for bots, absent for the player
    pub bot: Option<BotBias>,
    /// Track position
    pub x: f32,
    /// Rider center height (screen space, larger is lower)
    pub y: f32,
    /// Forward speed, always within `0..=max_speed`
    pub vx: f32,
    /// Vertical speed (negative is upward)
    pub vy: f32,
    pub grounded: bool,
    pub finished: bool,
    pub finish_time_ms: Option<u64>,
}

impl Actor {
    /// The human rider
    pub fn player(name: impl Into<String>) -> Self {
        Self::new(name.into(), PLAYER_COLOR.to_string(), None)
    }

    /// A bot in roster slot `index`
    pub fn bot(index: usize, bias: BotBias) -> Self {
        Self::new(
            format!("Bot {}", index + 1),
            BOT_PALETTE[index % BOT_PALETTE.len()].to_string(),
            Some(bias),
        )
    }

    fn new(name: String, color: String, bot: Option<BotBias>) -> Self {
        Self {
            name,
            color,
            bot,
            x: START_X,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            grounded: true,
            finished: false,
            finish_time_ms: None,
        }
    }

    pub fn is_bot(&self) -> bool {
        self.bot.is_some()
    }

    /// Put the rider back on the start line, at rest and grounded
    pub fn reset(&mut self, config: &RaceConfig, terrain: &Terrain) {
        self.x = config.start_x;
        self.y = ride_y(config, terrain, self.x);
        self.vx = 0.0;
        self.vy = 0.0;
        self.grounded = true;
        self.finished = false;
        self.finish_time_ms = None;
    }

    /// Height above riding height (0 while grounded, positive in the air)
    pub fn vertical_offset(&self, config: &RaceConfig, terrain: &Terrain) -> f32 {
        ride_y(config, terrain, self.x) - self.y
    }

    /// Front wheel contact point used for obstacle tests
    pub fn contact_point(&self, config: &RaceConfig) -> Vec2 {
        Vec2::new(self.x, self.y + config.contact_offset)
    }

    /// Advance speed, vertical state and position by one tick.
    ///
    /// Returns true on the tick the rider crosses the finish line.
    pub fn update_physics(
        &mut self,
        input: ActorInput,
        config: &RaceConfig,
        terrain: &Terrain,
        elapsed_ms: u64,
    ) -> bool {
        if self.finished {
            return false;
        }

        // Brake after throttle so pressing both favors slowing down
        if input.throttle {
            self.vx += config.accel;
        }
        if input.brake {
            self.vx -= config.brake;
        }
        if !input.throttle && !input.brake {
            self.vx *= 1.0 - config.friction;
        }
        self.vx = self.vx.clamp(0.0, config.max_speed);

        let ground = ride_y(config, terrain, self.x);
        if self.grounded {
            self.y = ground;
            if input.jump {
                self.grounded = false;
                self.vy = -config.jump_impulse;
            }
        } else {
            self.vy += config.gravity;
            self.y += self.vy;
            if self.y >= ground {
                self.land(ground);
            }
        }

        self.x += self.vx;
        if self.grounded {
            // Follow the surface at the new position
            self.y = ride_y(config, terrain, self.x);
        }

        if self.x >= config.track_length {
            self.finished = true;
            self.finish_time_ms = Some(elapsed_ms);
            return true;
        }
        false
    }

    /// React to the first obstacle the front wheel touches.
    ///
    /// Only grounded riders collide; airborne riders clear everything.
    pub fn apply_obstacle_effects(
        &mut self,
        field: &ObstacleField,
        config: &RaceConfig,
    ) -> Option<ObstacleReaction> {
        if self.finished || !self.grounded {
            return None;
        }
        let contact = self.contact_point(config);
        let hit = field.near(self.x, config.proximity).find(|ob| ob.collides(contact))?;

        if hit.kind.is_hazard() {
            self.vx = (self.vx - BUMP_SPEED_PENALTY).max(0.0);
            self.y -= BUMP_LIFT;
            self.grounded = false;
            self.vy = -BUMP_HOP_VY;
            Some(ObstacleReaction::Bumped(hit.kind))
        } else {
            self.grounded = false;
            self.vy = -(config.jump_impulse * RAMP_JUMP_FACTOR);
            self.vx = (self.vx + RAMP_SPEED_BOOST).min(config.max_speed);
            Some(ObstacleReaction::Launched)
        }
    }

    fn land(&mut self, ground: f32) {
        self.y = ground;
        self.vy = 0.0;
        self.grounded = true;
    }
}

/// Rider center height when resting on the ground at `x`
#[inline]
pub fn ride_y(config: &RaceConfig, terrain: &Terrain, x: f32) -> f32 {
    terrain.height_at(x) - config.ride_height
}
