//! Local progress store: per-level bests plus the raw session log, persisted
//! as two JSON files in the configured data directory. Missing or corrupt
//! files degrade to an empty store with a warning; they are rewritten whole
//! on every session end (temp file + rename, so a crash mid-write never
//! truncates existing data).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

pub const PROGRESS_FILE: &str = "focus_progress.json";
pub const SESSIONS_FILE: &str = "focus_sessions.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOutcome {
    /// Required hits reached.
    Cleared,
    /// Lives exhausted.
    Failed,
    /// Level time limit elapsed first.
    TimedOut,
}

/// Per-level bests. `best_reaction_ms` of 0.0 means "never recorded".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u32,
    pub best_accuracy: f32,
    pub best_reaction_ms: f32,
    pub times_played: u32,
    pub last_played: u64,
}

/// One finished play session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub level: u32,
    pub started_at: u64,
    pub ended_at: u64,
    pub correct: u32,
    pub incorrect: u32,
    pub targets_spawned: u32,
    pub accuracy: f32,
    pub mean_reaction_ms: f32,
    pub outcome: SessionOutcome,
}

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ProgressStore {
    pub progress: Vec<LevelProgress>,
    pub sessions: Vec<SessionRecord>,
}

impl ProgressStore {
    /// Load both files from `dir`. Never fails: unreadable or malformed files
    /// yield an empty section plus a warning string for the caller to log.
    pub fn load(dir: &Path) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        let progress = match read_json::<Vec<LevelProgress>>(&dir.join(PROGRESS_FILE)) {
            Ok(Some(p)) => p,
            Ok(None) => Vec::new(),
            Err(e) => {
                warnings.push(format!("{PROGRESS_FILE}: {e}; starting with empty progress"));
                Vec::new()
            }
        };
        let sessions = match read_json::<Vec<SessionRecord>>(&dir.join(SESSIONS_FILE)) {
            Ok(Some(s)) => s,
            Ok(None) => Vec::new(),
            Err(e) => {
                warnings.push(format!("{SESSIONS_FILE}: {e}; starting with empty session log"));
                Vec::new()
            }
        };
        (Self { progress, sessions }, warnings)
    }

    pub fn save(&self, dir: &Path) -> anyhow::Result<()> {
        fs::create_dir_all(dir)?;
        write_json_atomic(&dir.join(PROGRESS_FILE), &self.progress)?;
        write_json_atomic(&dir.join(SESSIONS_FILE), &self.sessions)?;
        Ok(())
    }

    pub fn level_progress(&self, level: u32) -> Option<&LevelProgress> {
        self.progress.iter().find(|p| p.level == level)
    }

    /// Level 1 is always open; level N needs the level before it played to at
    /// least `threshold` percent accuracy.
    pub fn is_unlocked(&self, level: u32, threshold: f32) -> bool {
        if level <= 1 {
            return true;
        }
        self.level_progress(level - 1)
            .map(|p| p.best_accuracy >= threshold)
            .unwrap_or(false)
    }

    /// Fold a finished session into the per-level bests and append it to the log.
    pub fn record_session(&mut self, record: SessionRecord) {
        match self.progress.iter_mut().find(|p| p.level == record.level) {
            Some(entry) => {
                entry.best_accuracy = entry.best_accuracy.max(record.accuracy);
                if record.mean_reaction_ms > 0.0 {
                    entry.best_reaction_ms = if entry.best_reaction_ms > 0.0 {
                        entry.best_reaction_ms.min(record.mean_reaction_ms)
                    } else {
                        record.mean_reaction_ms
                    };
                }
                entry.times_played += 1;
                entry.last_played = record.ended_at;
            }
            None => self.progress.push(LevelProgress {
                level: record.level,
                best_accuracy: record.accuracy,
                best_reaction_ms: record.mean_reaction_ms,
                times_played: 1,
                last_played: record.ended_at,
            }),
        }
        self.sessions.push(record);
    }

    pub fn total_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn average_accuracy(&self) -> f32 {
        if self.sessions.is_empty() {
            return 0.0;
        }
        self.sessions.iter().map(|s| s.accuracy).sum::<f32>() / self.sessions.len() as f32
    }

    pub fn levels_completed(&self, threshold: f32) -> usize {
        self.progress
            .iter()
            .filter(|p| p.best_accuracy >= threshold)
            .count()
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, String> {
    match fs::read_to_string(path) {
        Ok(txt) => serde_json::from_str(&txt)
            .map(Some)
            .map_err(|e| format!("parse error: {e}")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(format!("read error: {e}")),
    }
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let tmp: PathBuf = path.with_extension("json.tmp");
    let txt = serde_json::to_string_pretty(value)?;
    fs::write(&tmp, txt)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn unix_now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Loads the store at startup so the menu / level-select screens can read it
/// on their first frame.
pub struct ProgressStorePlugin;

impl Plugin for ProgressStorePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_progress_store);
    }
}

fn load_progress_store(mut commands: Commands, cfg: Res<crate::core::config::GameConfig>) {
    let (store, warnings) = ProgressStore::load(&cfg.persistence.data_dir);
    for w in warnings {
        warn!(target: "progress", "{w}");
    }
    info!(
        target: "progress",
        "progress store loaded: {} level records, {} sessions",
        store.progress.len(),
        store.sessions.len()
    );
    commands.insert_resource(store);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(level: u32, accuracy: f32, reaction: f32, outcome: SessionOutcome) -> SessionRecord {
        SessionRecord {
            id: format!("session_test_{level}"),
            level,
            started_at: 100,
            ended_at: 160,
            correct: 10,
            incorrect: 2,
            targets_spawned: 14,
            accuracy,
            mean_reaction_ms: reaction,
            outcome,
        }
    }

    #[test]
    fn load_missing_dir_is_empty_without_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let (store, warnings) = ProgressStore::load(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(store, ProgressStore::default());
    }

    #[test]
    fn corrupt_file_degrades_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(PROGRESS_FILE), "not json").unwrap();
        let (store, warnings) = ProgressStore::load(dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(PROGRESS_FILE));
        assert!(store.progress.is_empty());
    }

    #[test]
    fn record_session_folds_bests() {
        let mut store = ProgressStore::default();
        store.record_session(record(3, 60.0, 900.0, SessionOutcome::Failed));
        store.record_session(record(3, 85.0, 1100.0, SessionOutcome::Cleared));
        let p = store.level_progress(3).unwrap();
        assert_eq!(p.best_accuracy, 85.0);
        assert_eq!(p.best_reaction_ms, 900.0); // lower is better
        assert_eq!(p.times_played, 2);
        assert_eq!(store.total_sessions(), 2);
    }

    #[test]
    fn zero_reaction_sentinel_is_not_a_best() {
        let mut store = ProgressStore::default();
        // A session with no successful taps has no reaction samples.
        store.record_session(record(1, 0.0, 0.0, SessionOutcome::Failed));
        store.record_session(record(1, 90.0, 750.0, SessionOutcome::Cleared));
        assert_eq!(store.level_progress(1).unwrap().best_reaction_ms, 750.0);
    }

    #[test]
    fn unlock_requires_previous_level_threshold() {
        let mut store = ProgressStore::default();
        assert!(store.is_unlocked(1, 70.0));
        assert!(!store.is_unlocked(2, 70.0));
        store.record_session(record(1, 69.9, 800.0, SessionOutcome::Cleared));
        assert!(!store.is_unlocked(2, 70.0));
        store.record_session(record(1, 72.0, 800.0, SessionOutcome::Cleared));
        assert!(store.is_unlocked(2, 70.0));
        // Unlocking level 3 depends on level 2, not level 1.
        assert!(!store.is_unlocked(3, 70.0));
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ProgressStore::default();
        store.record_session(record(1, 80.0, 640.0, SessionOutcome::Cleared));
        store.record_session(record(2, 50.0, 0.0, SessionOutcome::TimedOut));
        store.save(dir.path()).unwrap();
        let (reloaded, warnings) = ProgressStore::load(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(reloaded, store);
    }

    #[test]
    fn aggregate_stats() {
        let mut store = ProgressStore::default();
        store.record_session(record(1, 80.0, 640.0, SessionOutcome::Cleared));
        store.record_session(record(2, 40.0, 700.0, SessionOutcome::Failed));
        assert_eq!(store.average_accuracy(), 60.0);
        assert_eq!(store.levels_completed(70.0), 1);
    }
}
