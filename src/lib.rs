//! Dirt Dash - A side-view dirt bike race against heuristic bots
//!
//! Core modules:
//! - `sim`: Deterministic race simulation (terrain, obstacles, riders, bots, race flow)
//! - `config`: Injectable race configuration with validation
//! - `best_time`: Personal best policy and storage backends

pub mod best_time;
pub mod config;
pub mod sim;

pub use best_time::{BestTimeStore, FileStore, MemoryStore};
pub use config::{ConfigError, RaceConfig};

/// Reference build constants (defaults for `RaceConfig`)
pub mod consts {
    /// Fixed simulation step in milliseconds (constants are tuned for ~16 ms)
    pub const TICK_MS: u32 = 16;
    /// Maximum substeps per `advance` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Track dimensions
    pub const TRACK_LEN: f32 = 4000.0;
    pub const GROUND_Y: f32 = 720.0;

    /// Rider geometry: center sits this far above the ground surface
    pub const RIDE_HEIGHT: f32 = 30.0;
    /// Front wheel contact point sits this far below the rider center
    pub const CONTACT_OFFSET: f32 = 28.0;
    /// Starting position on the track
    pub const START_X: f32 = 40.0;

    /// Kinematics (per tick)
    pub const GRAVITY: f32 = 0.6;
    pub const JUMP_VY: f32 = 16.0;
    pub const MAX_SPEED: f32 = 22.0;
    pub const ACCEL: f32 = 0.25;
    pub const BRAKE: f32 = 0.35;
    pub const FRICTION: f32 = 0.01;

    /// Obstacle reactions
    pub const RAMP_JUMP_FACTOR: f32 = 1.1;
    pub const RAMP_SPEED_BOOST: f32 = 1.0;
    pub const BUMP_SPEED_PENALTY: f32 = 2.2;
    pub const BUMP_LIFT: f32 = 6.0;
    pub const BUMP_HOP_VY: f32 = 5.0;

    /// Obstacle field layout
    pub const OBSTACLE_LEAD_IN: f32 = 400.0;
    pub const OBSTACLE_FINISH_MARGIN: f32 = 200.0;
    pub const OBSTACLE_SPACING: (f32, f32) = (280.0, 520.0);
    pub const PROXIMITY: f32 = 80.0;

    /// Race flow
    pub const BOT_COUNT: usize = 3;
    pub const COUNTDOWN_MS: u64 = 3200;
    pub const FINISH_GRACE_MS: u64 = 5000;

    /// Bot personality ranges
    pub const SPEED_BIAS_RANGE: (f32, f32) = (0.60, 0.88);
    pub const JUMP_BIAS_RANGE: (f32, f32) = (0.55, 0.85);
}

/// Format a race time as seconds with two decimals ("12.34s")
pub fn format_time_ms(ms: u64) -> String {
    format!("{:.2}s", ms as f64 / 1000.0)
}
