//! Dirt Dash entry point
//!
//! Runs a headless race on native targets: an autopilot rides for the player
//! while the bots race as usual, then the standings are printed.
//!
//! Usage: `dirt-dash [seed] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::{SystemTime, UNIX_EPOCH};

    use dirt_dash::sim::{ActorInput, RaceCommand, RaceEventKind, RacePhase, RaceSession};
    use dirt_dash::{FileStore, RaceConfig, format_time_ms};

    /// Frame delta fed to the session, in wall-clock milliseconds
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Upper bound on frames before giving up on a stuck race
    const MAX_FRAMES: u32 = 60 * 60 * 5;

    fn seed_from_clock() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn load_config(args: &[String]) -> Result<RaceConfig, String> {
        let mut config = match args.get(1) {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| format!("cannot read {}: {}", path, e))?;
                RaceConfig::from_json(&raw).map_err(|e| format!("bad config {}: {}", path, e))?
            }
            None => RaceConfig::default(),
        };
        config.seed = match args.first() {
            Some(raw) => raw
                .parse()
                .map_err(|_| format!("seed must be an integer, got {:?}", raw))?,
            None => seed_from_clock(),
        };
        Ok(config)
    }

    /// Full throttle, hopping hazards that are about to reach the front wheel
    fn autopilot(session: &RaceSession<FileStore>) -> ActorInput {
        let player = session.player();
        let reach = 60.0 + player.vx * 1.2;
        let hazard_ahead = session
            .obstacles()
            .near(player.x + reach / 2.0, reach / 2.0)
            .any(|o| o.kind.is_hazard() && o.x > player.x);
        ActorInput {
            throttle: true,
            brake: false,
            jump: player.grounded && hazard_ahead,
        }
    }

    pub fn run() {
        env_logger::init();
        log::info!("Dirt Dash (headless) starting...");

        let args: Vec<String> = std::env::args().skip(1).collect();
        let config = match load_config(&args) {
            Ok(config) => config,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(2);
            }
        };
        let seed = config.seed;

        let store = FileStore::new(FileStore::DEFAULT_FILE);
        let mut session = match RaceSession::new(config, store) {
            Ok(session) => session,
            Err(e) => {
                log::error!("Invalid race config: {}", e);
                std::process::exit(2);
            }
        };
        log::info!("Race initialized with seed: {}", seed);

        session.submit(RaceCommand::Start {
            name: String::new(),
        });

        let mut frames = 0;
        while session.phase() != RacePhase::Finished && frames < MAX_FRAMES {
            let input = autopilot(&session);
            session.advance(FRAME_MS, input);
            for event in session.drain_events() {
                match event.kind {
                    RaceEventKind::CountdownTick { remaining } => println!("{}...", remaining),
                    RaceEventKind::CountdownGo => println!("GO!"),
                    RaceEventKind::ActorFinished { index, time_ms } => {
                        let name = if index == 0 {
                            session.player().name.as_str()
                        } else {
                            session.bots()[index - 1].name.as_str()
                        };
                        println!("{} finished in {}", name, format_time_ms(time_ms));
                    }
                    RaceEventKind::NewBestTime { time_ms } => {
                        println!("New best time: {}", format_time_ms(time_ms));
                    }
                    _ => log::debug!("{:?} at {}", event.kind, event.at_ms),
                }
            }
            frames += 1;
        }

        let Some(results) = session.results() else {
            log::warn!("Race did not finish after {} frames", frames);
            return;
        };

        println!();
        for (place, row) in results.standings.iter().enumerate() {
            let time = row
                .finish_time_ms
                .map(format_time_ms)
                .unwrap_or_else(|| format!("DNF ({:.0})", row.position));
            println!("{}. {:<8} {}", place + 1, row.name, time);
        }
        if results.player_won {
            println!("\nYou win!");
        }
        if let Some(best) = results.best_time_ms {
            println!("Best time: {}", format_time_ms(best));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser front end; the library is driven by the host page
}
