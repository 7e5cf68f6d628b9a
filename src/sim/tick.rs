//! Race session and fixed timestep tick
//!
//! `RaceSession` owns every piece of race state. The driver feeds it wall-clock
//! deltas and player input; it runs whole fixed steps, drains queued commands,
//! and exposes events and snapshots. No globals, no rendering handles.

use std::collections::VecDeque;

use rand_pcg::Pcg32;

use super::actor::{Actor, ActorInput, BotBias, ride_y};
use super::bot;
use super::obstacle::ObstacleField;
use super::standings::{RaceResults, rank};
use super::state::{
    ActorSnapshot, GAMEPLAY_STREAM, LAYOUT_STREAM, RaceCommand, RaceEvent, RaceEventKind,
    RacePhase, RaceSnapshot, RngState, engine_pitch, roster,
};
use super::terrain::Terrain;
use crate::best_time::{BestTimeStore, is_improvement};
use crate::config::{ConfigError, RaceConfig};
use crate::format_time_ms;

/// Name used when the player leaves the name field blank
pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Countdown labels, one per quarter of the countdown
const COUNTDOWN_LABELS: [&str; 4] = ["3", "2", "1", "GO!"];

/// One race attempt and everything needed to replay it
#[derive(Debug)]
pub struct RaceSession<S: BestTimeStore> {
    config: RaceConfig,
    terrain: Terrain,
    obstacles: ObstacleField,
    /// Bot biases and bot jump rolls
    rng: Pcg32,
    phase: RacePhase,
    /// Simulated milliseconds; never advances while paused or idle
    clock_ms: u64,
    countdown_started_at: Option<u64>,
    race_started_at: Option<u64>,
    race_ended_at: Option<u64>,
    player_finished_at: Option<u64>,
    player: Actor,
    bots: Vec<Actor>,
    engine_on: bool,
    /// Jump pressed since the last racing tick
    jump_latched: bool,
    accumulator_ms: f64,
    best_time_ms: Option<u64>,
    store: S,
    commands: VecDeque<RaceCommand>,
    events: Vec<RaceEvent>,
    results: Option<RaceResults>,
}

impl<S: BestTimeStore> RaceSession<S> {
    /// Build a session on the title screen.
    ///
    /// Validates the configuration, lays out the obstacles and reads the best time.
    pub fn new(config: RaceConfig, store: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let terrain = Terrain::new(config.ground_level);
        let mut layout_rng = RngState::new(config.seed, LAYOUT_STREAM).to_rng();
        let obstacles = ObstacleField::from_config(&config, &terrain, &mut layout_rng)?;
        let rng = RngState::new(config.seed, GAMEPLAY_STREAM).to_rng();
        let best_time_ms = store.load_best_time();

        log::info!(
            "Race session ready: seed {}, {} obstacles, {} bots",
            config.seed,
            obstacles.len(),
            config.bot_count
        );

        let mut session = Self {
            config,
            terrain,
            obstacles,
            rng,
            phase: RacePhase::Home,
            clock_ms: 0,
            countdown_started_at: None,
            race_started_at: None,
            race_ended_at: None,
            player_finished_at: None,
            player: Actor::player(DEFAULT_PLAYER_NAME),
            bots: Vec::new(),
            engine_on: true,
            jump_latched: false,
            accumulator_ms: 0.0,
            best_time_ms,
            store,
            commands: VecDeque::new(),
            events: Vec::new(),
            results: None,
        };
        session.reset_race();
        Ok(session)
    }

    // === Accessors ===

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    pub fn phase(&self) -> RacePhase {
        self.phase
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    pub fn player(&self) -> &Actor {
        &self.player
    }

    pub fn bots(&self) -> &[Actor] {
        &self.bots
    }

    pub fn engine_on(&self) -> bool {
        self.engine_on
    }

    pub fn best_time_ms(&self) -> Option<u64> {
        self.best_time_ms
    }

    pub fn results(&self) -> Option<&RaceResults> {
        self.results.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Active race time so far (frozen once results are in)
    pub fn race_elapsed_ms(&self) -> Option<u64> {
        self.race_started_at
            .map(|start| self.race_ended_at.unwrap_or(self.clock_ms) - start)
    }

    /// Countdown label for the current moment, if counting down
    pub fn countdown_label(&self) -> Option<&'static str> {
        if self.phase != RacePhase::Countdown {
            return None;
        }
        let elapsed = self.clock_ms - self.countdown_started_at?;
        let quarter = (self.config.countdown_ms / 4).max(1);
        let index = ((elapsed / quarter) as usize).min(COUNTDOWN_LABELS.len() - 1);
        Some(COUNTDOWN_LABELS[index])
    }

    // === Commands and events ===

    /// Queue a player action for the next step
    pub fn submit(&mut self, command: RaceCommand) {
        self.commands.push_back(command);
    }

    /// Hand pending events to the presentation layer
    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, kind: RaceEventKind) {
        self.events.push(RaceEvent {
            at_ms: self.clock_ms,
            kind,
        });
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            self.apply_command(command);
        }
    }

    fn apply_command(&mut self, command: RaceCommand) {
        match (command, self.phase) {
            (RaceCommand::Start { name }, RacePhase::Home) => {
                let name = name.trim();
                self.player.name = if name.is_empty() {
                    DEFAULT_PLAYER_NAME.to_string()
                } else {
                    name.to_string()
                };
                self.begin_countdown();
            }
            (RaceCommand::Replay, RacePhase::Finished) => self.begin_countdown(),
            (RaceCommand::Home, RacePhase::Finished) => {
                self.reset_race();
                self.phase = RacePhase::Home;
                log::info!("Back to title screen");
            }
            (RaceCommand::TogglePause, RacePhase::Racing) => {
                self.phase = RacePhase::Paused;
                self.jump_latched = false;
                self.emit(RaceEventKind::Paused);
                log::info!("Race paused at {}", self.clock_ms);
            }
            (RaceCommand::TogglePause, RacePhase::Paused) => {
                self.phase = RacePhase::Racing;
                self.emit(RaceEventKind::Resumed);
                log::info!("Race resumed at {}", self.clock_ms);
            }
            (
                RaceCommand::ToggleEngine,
                RacePhase::Countdown | RacePhase::Racing | RacePhase::Paused,
            ) => {
                self.engine_on = !self.engine_on;
                self.emit(if self.engine_on {
                    RaceEventKind::EngineStarted
                } else {
                    RaceEventKind::EngineStopped
                });
            }
            (command, phase) => {
                log::debug!("Ignoring {:?} during {:?}", command, phase);
            }
        }
    }

    // === Lifecycle ===

    /// Full reset: fresh bot personalities, everyone back on the start line.
    /// Terrain and obstacle layout stay the same.
    fn reset_race(&mut self) {
        self.player.reset(&self.config, &self.terrain);
        self.bots = (0..self.config.bot_count)
            .map(|i| {
                let mut bot = Actor::bot(i, BotBias::draw(&self.config, &mut self.rng));
                bot.reset(&self.config, &self.terrain);
                bot
            })
            .collect();
        self.countdown_started_at = None;
        self.race_started_at = None;
        self.race_ended_at = None;
        self.player_finished_at = None;
        self.jump_latched = false;
        self.accumulator_ms = 0.0;
        self.results = None;
    }

    fn begin_countdown(&mut self) {
        self.reset_race();
        self.phase = RacePhase::Countdown;
        self.countdown_started_at = Some(self.clock_ms);
        self.emit(RaceEventKind::CountdownTick { remaining: 3 });
        log::info!("Countdown started for {}", self.player.name);
    }

    fn begin_racing(&mut self) {
        self.phase = RacePhase::Racing;
        self.race_started_at = Some(self.clock_ms);
        self.emit(RaceEventKind::RaceStarted);
        log::info!("Race started");
    }

    fn finish_race(&mut self) {
        self.phase = RacePhase::Finished;
        self.race_ended_at = Some(self.clock_ms);

        let standings = rank(roster(&self.player, &self.bots));
        let player_place = standings
            .iter()
            .position(|s| s.index == 0)
            .map_or(standings.len(), |i| i + 1);
        let player_won = player_place == 1;

        let mut new_best = false;
        if let Some(time) = self.player.finish_time_ms {
            if is_improvement(self.best_time_ms, time) {
                self.best_time_ms = Some(time);
                self.store.save_best_time(time);
                new_best = true;
                self.emit(RaceEventKind::NewBestTime { time_ms: time });
                log::info!("New best time: {}", format_time_ms(time));
            }
        }

        self.emit(RaceEventKind::RaceFinished { player_place });
        if player_won {
            self.emit(RaceEventKind::Victory);
        }
        log::info!("Race over: {} placed {}", self.player.name, player_place);

        self.results = Some(RaceResults {
            standings,
            player_place,
            player_won,
            best_time_ms: self.best_time_ms,
            new_best,
        });
    }

    // === Stepping ===

    /// Drain commands and run exactly one fixed step if the phase simulates.
    ///
    /// Returns true if a step ran.
    pub fn step(&mut self, input: ActorInput) -> bool {
        self.process_commands();
        self.jump_latched |= input.jump && self.phase == RacePhase::Racing;
        if !self.phase.is_ticking() {
            return false;
        }
        self.tick_once(input);
        true
    }

    /// Consume a wall-clock delta, running as many fixed steps as fit
    /// (capped at `max_substeps`; any larger backlog is dropped).
    ///
    /// Returns the number of steps run.
    pub fn advance(&mut self, dt_ms: f64, input: ActorInput) -> u32 {
        self.process_commands();
        self.jump_latched |= input.jump && self.phase == RacePhase::Racing;
        match self.phase {
            RacePhase::Paused => return 0,
            RacePhase::Home | RacePhase::Finished => {
                self.accumulator_ms = 0.0;
                return 0;
            }
            RacePhase::Countdown | RacePhase::Racing => {}
        }

        let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        let tick = f64::from(self.config.tick_ms);
        self.accumulator_ms += dt;

        let mut steps = 0;
        while self.accumulator_ms >= tick && steps < self.config.max_substeps {
            self.tick_once(input);
            self.accumulator_ms -= tick;
            steps += 1;
            if !self.phase.is_ticking() {
                self.accumulator_ms = 0.0;
                break;
            }
        }
        if self.accumulator_ms >= tick {
            log::debug!("Dropping {:.1} ms of simulation backlog", self.accumulator_ms);
            self.accumulator_ms %= tick;
        }
        steps
    }

    fn tick_once(&mut self, input: ActorInput) {
        self.clock_ms += u64::from(self.config.tick_ms);
        match self.phase {
            RacePhase::Countdown => self.countdown_tick(),
            RacePhase::Racing => self.race_tick(input),
            _ => {}
        }
    }

    fn countdown_tick(&mut self) {
        let Some(started) = self.countdown_started_at else {
            return;
        };
        let duration = self.config.countdown_ms;
        let elapsed = self.clock_ms - started;
        let previous = elapsed.saturating_sub(u64::from(self.config.tick_ms));
        let quarter = duration / 4;

        // Beep when a quarter boundary is crossed this tick
        for (i, remaining) in [(1, 2), (2, 1)] {
            let mark = quarter * i;
            if previous < mark && elapsed >= mark {
                self.emit(RaceEventKind::CountdownTick { remaining });
            }
        }
        let go_mark = quarter * 3;
        if previous < go_mark && elapsed >= go_mark {
            self.emit(RaceEventKind::CountdownGo);
        }

        if elapsed >= duration {
            self.begin_racing();
        }
    }

    fn race_tick(&mut self, input: ActorInput) {
        let Some(started) = self.race_started_at else {
            return;
        };
        let elapsed = self.clock_ms - started;
        let config = &self.config;
        let terrain = &self.terrain;
        let mut finished_now: Vec<(usize, u64)> = Vec::new();

        // Player first
        let player_input = ActorInput {
            throttle: input.throttle && self.engine_on,
            brake: input.brake,
            jump: std::mem::take(&mut self.jump_latched),
        };
        if self.player.update_physics(player_input, config, terrain, elapsed) {
            finished_now.push((0, elapsed));
        }
        if let Some(reaction) = self.player.apply_obstacle_effects(&self.obstacles, config) {
            log::debug!("{} {:?} at {:.0}", self.player.name, reaction, self.player.x);
        }

        // Then bots in roster order
        for (i, bot) in self.bots.iter_mut().enumerate() {
            let bot_input = bot::decide(bot, &self.obstacles, config, &mut self.rng);
            if bot.update_physics(bot_input, config, terrain, elapsed) {
                finished_now.push((i + 1, elapsed));
            }
            if let Some(reaction) = bot.apply_obstacle_effects(&self.obstacles, config) {
                log::debug!("{} {:?} at {:.0}", bot.name, reaction, bot.x);
            }
        }

        for (index, time_ms) in finished_now {
            if index == 0 {
                self.player_finished_at = Some(self.clock_ms);
            }
            log::debug!("Roster {} finished in {}", index, format_time_ms(time_ms));
            self.emit(RaceEventKind::ActorFinished { index, time_ms });
        }

        if let Some(player_done) = self.player_finished_at {
            let everyone_done = self.bots.iter().all(|b| b.finished);
            let grace_over = self.clock_ms - player_done >= self.config.finish_grace_ms;
            if everyone_done || grace_over {
                self.finish_race();
            }
        }
    }

    // === Snapshots ===

    /// Read-only view of the current frame
    pub fn snapshot(&self) -> RaceSnapshot<'_> {
        let actors = roster(&self.player, &self.bots)
            .map(|actor| ActorSnapshot {
                name: actor.name.clone(),
                color: actor.color.clone(),
                is_bot: actor.is_bot(),
                position: actor.x,
                y: actor.y,
                vertical_offset: ride_y(&self.config, &self.terrain, actor.x) - actor.y,
                grounded: actor.grounded,
                speed: actor.vx,
                tilt_degrees: self.terrain.tilt_degrees(actor.x),
                finished: actor.finished,
                finish_time_ms: actor.finish_time_ms,
            })
            .collect();

        let engine_running = self.engine_on
            && matches!(self.phase, RacePhase::Racing | RacePhase::Countdown);

        RaceSnapshot {
            phase: self.phase,
            clock_ms: self.clock_ms,
            race_elapsed_ms: self.race_elapsed_ms(),
            countdown_label: self.countdown_label(),
            best_time_ms: self.best_time_ms,
            engine_on: self.engine_on,
            engine_hz: engine_running.then(|| engine_pitch(self.player.vx)),
            actors,
            obstacles: self.obstacles.items(),
        }
    }
}
