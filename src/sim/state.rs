//! Race state types shared with the presentation layer
//!
//! Phases, queued commands, timestamped events and read-only snapshots.
//! Nothing here mutates the simulation.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::obstacle::Obstacle;

/// Current phase of the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RacePhase {
    /// Title screen, nothing simulates
    Home,
    /// 3-2-1-GO, riders frozen on the start line
    Countdown,
    /// Active racing
    Racing,
    /// Race suspended, resumes exactly where it stopped
    Paused,
    /// Results on screen
    Finished,
}

impl RacePhase {
    /// Phases that consume simulation steps
    pub fn is_ticking(&self) -> bool {
        matches!(self, RacePhase::Countdown | RacePhase::Racing)
    }
}

/// Player actions queued by the input layer and drained at the next step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceCommand {
    /// Leave the title screen; a blank name becomes "Player"
    Start { name: String },
    TogglePause,
    ToggleEngine,
    /// Race again from the results screen
    Replay,
    /// Back to the title screen from the results screen
    Home,
}

/// What happened (for audio cues and HUD flashes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceEventKind {
    /// Countdown beep showing `remaining` (3, 2, 1)
    CountdownTick { remaining: u8 },
    /// Final high beep ("GO!")
    CountdownGo,
    RaceStarted,
    /// Roster `index` crossed the line (0 is the player)
    ActorFinished { index: usize, time_ms: u64 },
    Paused,
    Resumed,
    EngineStarted,
    EngineStopped,
    /// Results are ready
    RaceFinished { player_place: usize },
    /// Player took first place (fanfare)
    Victory,
    NewBestTime { time_ms: u64 },
}

/// An event stamped with the session clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceEvent {
    pub at_ms: u64,
    pub kind: RaceEventKind,
}

/// Seeded RNG stream descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

/// Obstacle layout stream
pub const LAYOUT_STREAM: u64 = 0;
/// Bot bias and bot jump rolls
pub const GAMEPLAY_STREAM: u64 = 1;

impl RngState {
    pub fn new(seed: u64, stream: u64) -> Self {
        Self { seed, stream }
    }

    pub fn to_rng(&self) -> Pcg32 {
        // Golden ratio hash keeps streams of nearby seeds apart
        Pcg32::seed_from_u64(self.seed ^ self.stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Per-rider view for drawing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorSnapshot {
    pub name: String,
    pub color: String,
    pub is_bot: bool,
    pub position: f32,
    pub y: f32,
    /// Height above riding height
    pub vertical_offset: f32,
    pub grounded: bool,
    pub speed: f32,
    /// Cosmetic sprite tilt in degrees
    pub tilt_degrees: f32,
    pub finished: bool,
    pub finish_time_ms: Option<u64>,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct RaceSnapshot<'a> {
    pub phase: RacePhase,
    pub clock_ms: u64,
    /// Active race time, pauses excluded
    pub race_elapsed_ms: Option<u64>,
    /// "3", "2", "1" or "GO!" during the countdown
    pub countdown_label: Option<&'static str>,
    pub best_time_ms: Option<u64>,
    pub engine_on: bool,
    /// Engine hum pitch in Hz while the engine runs
    pub engine_hz: Option<f32>,
    /// Player first, then bots in roster order
    pub actors: Vec<ActorSnapshot>,
    pub obstacles: &'a [Obstacle],
}

impl RaceSnapshot<'_> {
    pub fn player(&self) -> Option<&ActorSnapshot> {
        self.actors.first()
    }
}

/// Engine hum pitch for a given speed
pub fn engine_pitch(speed: f32) -> f32 {
    (40.0 + speed * 12.0).clamp(40.0, 320.0)
}

/// Roster order used everywhere: player first, then bots
pub fn roster<'a>(player: &'a Actor, bots: &'a [Actor]) -> impl Iterator<Item = &'a Actor> {
    std::iter::once(player).chain(bots.iter())
}
