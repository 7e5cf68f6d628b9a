//! Deterministic race simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable update order (player first, then bots in roster order)
//! - No rendering, audio or platform dependencies

pub mod actor;
pub mod bot;
pub mod obstacle;
pub mod standings;
pub mod state;
pub mod terrain;
pub mod tick;

pub use actor::{Actor, ActorInput, BotBias, ObstacleReaction, ride_y};
pub use obstacle::{Obstacle, ObstacleField, ObstacleKind};
pub use standings::{RaceResults, Standing, rank};
pub use state::{
    ActorSnapshot, RaceCommand, RaceEvent, RaceEventKind, RacePhase, RaceSnapshot, RngState,
};
pub use terrain::Terrain;
pub use tick::{DEFAULT_PLAYER_NAME, RaceSession};
