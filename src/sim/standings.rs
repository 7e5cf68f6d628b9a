//! Final race standings

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::actor::Actor;

/// One row of the results table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// Roster index (0 is the player)
    pub index: usize,
    pub name: String,
    pub finish_time_ms: Option<u64>,
    /// Track position when the race ended
    pub position: f32,
}

/// Results shown once the race is over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResults {
    /// Best first
    pub standings: Vec<Standing>,
    /// 1-based place of the player
    pub player_place: usize,
    pub player_won: bool,
    pub best_time_ms: Option<u64>,
    /// The player set a new personal best this race
    pub new_best: bool,
}

/// Rank riders: finishers by ascending time, then non-finishers by distance
/// covered (furthest first). Ties keep roster order.
pub fn rank<'a>(actors: impl IntoIterator<Item = &'a Actor>) -> Vec<Standing> {
    let mut rows: Vec<Standing> = actors
        .into_iter()
        .enumerate()
        .map(|(index, actor)| Standing {
            index,
            name: actor.name.clone(),
            finish_time_ms: actor.finish_time_ms,
            position: actor.x,
        })
        .collect();
    rows.sort_by(compare);
    rows
}

fn compare(a: &Standing, b: &Standing) -> Ordering {
    match (a.finish_time_ms, b.finish_time_ms) {
        (Some(ta), Some(tb)) => ta.cmp(&tb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.position.total_cmp(&a.position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rider(name: &str, time: Option<u64>, x: f32) -> Actor {
        let mut actor = Actor::player(name);
        actor.finish_time_ms = time;
        actor.finished = time.is_some();
        actor.x = x;
        actor
    }

    #[test]
    fn test_finishers_then_furthest() {
        let actors = [
            rider("A", Some(12_300), 4010.0),
            rider("B", Some(10_100), 4005.0),
            rider("C", None, 3200.0),
            rider("D", None, 3900.0),
        ];
        let names: Vec<_> = rank(&actors).into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["B", "A", "D", "C"]);
    }

    #[test]
    fn test_ties_keep_roster_order() {
        let actors = [
            rider("P", Some(9_000), 4010.0),
            rider("Bot 1", Some(9_000), 4012.0),
            rider("Bot 2", None, 1000.0),
            rider("Bot 3", None, 1000.0),
        ];
        let ranked = rank(&actors);
        let indices: Vec<_> = ranked.iter().map(|s| s.index).collect();
        assert_eq!(indices, [0, 1, 2, 3]);
    }

    #[test]
    fn test_empty() {
        assert!(rank(std::iter::empty()).is_empty());
    }
}
