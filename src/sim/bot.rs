//! Bot decision heuristic
//!
//! Greedy single-obstacle lookahead: cruise at a personal target speed and
//! roll the dice on jumping the first relevant obstacle ahead.

use rand::Rng;

use super::actor::{Actor, ActorInput};
use super::obstacle::ObstacleField;
use crate::config::RaceConfig;

/// Base lookahead distance in front of the bot
pub const LOOKAHEAD_BASE: f32 = 90.0;
/// Extra lookahead per unit of speed
pub const LOOKAHEAD_PER_SPEED: f32 = 2.0;
/// Hazards only trigger a jump inside this base distance...
pub const HAZARD_RANGE_BASE: f32 = 60.0;
/// ...plus this much per unit of speed
pub const HAZARD_RANGE_PER_SPEED: f32 = 1.2;
/// Ramps are attractive: bots are this much more likely to take them
pub const RAMP_JUMP_BONUS: f32 = 0.1;

/// Decide this tick's controls for a bot. Bots never brake.
///
/// Non-bots and finished riders get an idle input.
pub fn decide<R: Rng>(
    actor: &Actor,
    field: &ObstacleField,
    config: &RaceConfig,
    rng: &mut R,
) -> ActorInput {
    let Some(bias) = actor.bot else {
        return ActorInput::default();
    };
    if actor.finished {
        return ActorInput::default();
    }

    let throttle = actor.vx < bias.speed * config.max_speed;

    let ahead_x = actor.x + LOOKAHEAD_BASE + actor.vx * LOOKAHEAD_PER_SPEED;
    let hazard_range = HAZARD_RANGE_BASE + actor.vx * HAZARD_RANGE_PER_SPEED;

    let mut jump = false;
    let items = field.items();
    let start = items.partition_point(|ob| ob.x < actor.x);
    for ob in &items[start..] {
        if ob.x > ahead_x {
            break;
        }
        if !ob.kind.is_hazard() {
            jump = rng.random::<f32>() < bias.jump + RAMP_JUMP_BONUS;
            break;
        }
        if ob.x - actor.x < hazard_range {
            jump = rng.random::<f32>() < bias.jump;
            break;
        }
    }

    ActorInput {
        throttle,
        brake: false,
        jump,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::BotBias;
    use crate::sim::obstacle::{Obstacle, ObstacleKind};
    use crate::sim::terrain::Terrain;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn bot(speed: f32, jump: f32) -> Actor {
        let config = RaceConfig::default();
        let mut actor = Actor::bot(0, BotBias { speed, jump });
        actor.reset(&config, &Terrain::new(config.ground_level));
        actor
    }

    fn field(obstacles: &[(ObstacleKind, f32)]) -> ObstacleField {
        let terrain = Terrain::new(720.0);
        ObstacleField::from_obstacles(
            obstacles
                .iter()
                .map(|&(kind, x)| Obstacle::new(kind, x, &terrain))
                .collect(),
        )
    }

    #[test]
    fn test_throttles_below_target_speed() {
        let config = RaceConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut actor = bot(0.5, 0.5);
        let empty = ObstacleField::default();

        actor.vx = 10.0;
        assert!(decide(&actor, &empty, &config, &mut rng).throttle);
        actor.vx = 11.0;
        assert!(!decide(&actor, &empty, &config, &mut rng).throttle);
    }

    #[test]
    fn test_never_brakes() {
        let config = RaceConfig::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let actor = bot(0.7, 0.7);
        let obstacles = field(&[(ObstacleKind::Rock, 100.0)]);
        for _ in 0..100 {
            assert!(!decide(&actor, &obstacles, &config, &mut rng).brake);
        }
    }

    #[test]
    fn test_certain_jump_at_close_hazard() {
        let config = RaceConfig::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let mut actor = bot(0.7, 1.0);
        actor.x = 1000.0;
        let obstacles = field(&[(ObstacleKind::Log, 1050.0)]);
        assert!(decide(&actor, &obstacles, &config, &mut rng).jump);
    }

    #[test]
    fn test_never_jumps_with_zero_bias_at_hazard() {
        let config = RaceConfig::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut actor = bot(0.7, 0.0);
        actor.x = 1000.0;
        let obstacles = field(&[(ObstacleKind::Rock, 1030.0)]);
        for _ in 0..100 {
            assert!(!decide(&actor, &obstacles, &config, &mut rng).jump);
        }
    }

    #[test]
    fn test_distant_hazard_waits() {
        let config = RaceConfig::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut actor = bot(0.7, 1.0);
        actor.x = 1000.0;
        // Inside the lookahead (90) but outside hazard range (60) at rest
        let obstacles = field(&[(ObstacleKind::Rock, 1075.0)]);
        assert!(!decide(&actor, &obstacles, &config, &mut rng).jump);
    }

    #[test]
    fn test_ramp_bonus_applies() {
        let config = RaceConfig::default();
        let mut rng = Pcg32::seed_from_u64(6);
        let mut actor = bot(0.7, 0.95);
        actor.x = 1000.0;
        // Ramp beyond hazard range still counts; with the bonus the jump is certain
        let obstacles = field(&[(ObstacleKind::Ramp, 1085.0)]);
        for _ in 0..50 {
            assert!(decide(&actor, &obstacles, &config, &mut rng).jump);
        }
    }

    #[test]
    fn test_skips_distant_hazard_for_ramp_behind_it() {
        let config = RaceConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut actor = bot(0.7, 0.95);
        actor.x = 1000.0;
        actor.vx = 10.0;
        // Lookahead reaches 1110, hazard range 72: the log at +80 is out of range, the ramp is next
        let obstacles = field(&[(ObstacleKind::Log, 1080.0), (ObstacleKind::Ramp, 1105.0)]);
        assert!(decide(&actor, &obstacles, &config, &mut rng).jump);
    }

    #[test]
    fn test_ignores_obstacles_behind_and_beyond() {
        let config = RaceConfig::default();
        let mut rng = Pcg32::seed_from_u64(8);
        let mut actor = bot(0.7, 1.0);
        actor.x = 1000.0;
        let obstacles = field(&[(ObstacleKind::Ramp, 950.0), (ObstacleKind::Ramp, 1200.0)]);
        assert!(!decide(&actor, &obstacles, &config, &mut rng).jump);
    }

    #[test]
    fn test_player_and_finished_get_idle_input() {
        let config = RaceConfig::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let obstacles = field(&[(ObstacleKind::Rock, 60.0)]);
        let player = Actor::player("P");
        assert_eq!(
            decide(&player, &obstacles, &config, &mut rng),
            ActorInput::default()
        );
        let mut done = bot(0.7, 1.0);
        done.finished = true;
        assert_eq!(
            decide(&done, &obstacles, &config, &mut rng),
            ActorInput::default()
        );
    }
}
