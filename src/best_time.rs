//! Personal best time
//!
//! One value outlives a race session: the player's fastest finish. It is read
//! once when a session is built and written only when beaten. Missing or
//! corrupt data always means "no best yet", never an error.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Synchronous key-value storage for the best time
pub trait BestTimeStore {
    /// Stored best in milliseconds, `None` if absent or unreadable
    fn load_best_time(&self) -> Option<u64>;
    /// Persist a new best (failures are logged, not returned)
    fn save_best_time(&mut self, ms: u64);
}

/// Whether `time_ms` beats the current best
pub fn is_improvement(best: Option<u64>, time_ms: u64) -> bool {
    best.is_none_or(|best| time_ms < best)
}

/// On-disk representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestTimeRecord {
    pub best_time_ms: u64,
}

/// Parse stored text: a JSON record, or a bare integer as older saves used.
///
/// Zero is treated as absent since no race can finish instantly.
pub fn parse_best_time(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let ms = serde_json::from_str::<BestTimeRecord>(raw)
        .map(|record| record.best_time_ms)
        .ok()
        .or_else(|| raw.parse::<u64>().ok())?;
    (ms > 0).then_some(ms)
}

/// In-process store (tests, headless runs without a save file)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<u64>,
    /// Number of writes performed
    pub saves: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best(ms: u64) -> Self {
        Self {
            value: Some(ms),
            saves: 0,
        }
    }
}

impl BestTimeStore for MemoryStore {
    fn load_best_time(&self) -> Option<u64> {
        self.value
    }

    fn save_best_time(&mut self, ms: u64) {
        self.value = Some(ms);
        self.saves += 1;
    }
}

/// JSON file store for native builds
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Default file name in the working directory
    pub const DEFAULT_FILE: &'static str = "dirt_dash_best.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BestTimeStore for FileStore {
    fn load_best_time(&self) -> Option<u64> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No best time found, starting fresh");
                return None;
            }
            Err(e) => {
                log::warn!("Could not read best time from {}: {}", self.path.display(), e);
                return None;
            }
        };
        let best = parse_best_time(&raw);
        match best {
            Some(ms) => log::info!("Loaded best time {}", crate::format_time_ms(ms)),
            None => log::warn!("Ignoring corrupt best time in {}", self.path.display()),
        }
        best
    }

    fn save_best_time(&mut self, ms: u64) {
        let record = BestTimeRecord { best_time_ms: ms };
        let result = serde_json::to_string(&record)
            .map_err(std::io::Error::from)
            .and_then(|json| fs::write(&self.path, json));
        match result {
            Ok(()) => log::info!("Best time saved ({})", crate::format_time_ms(ms)),
            Err(e) => log::warn!("Could not save best time to {}: {}", self.path.display(), e),
        }
    }
}
