//! Level library: the per-level spawn/difficulty table.
//!
//! Levels are loaded from `assets/config/levels.ron` when present; a
//! compile-time embedded copy of the same file (`include_str!`) is the
//! fallback so the binary still runs without on-disk assets.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::core::config::GameConfig;

/// Embedded copy of the stock level table. Kept byte-identical to the asset
/// file; `embedded()` parses it and is exercised by tests.
const EMBEDDED_LEVELS_RON: &str = include_str!("../../../assets/config/levels.ron");

/// The shapes a level can spawn. Doubles as the component marking what kind
/// a live playfield object is.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum ObjectKind {
    Star,
    Balloon,
    Heart,
    Circle,
    Triangle,
}

impl ObjectKind {
    /// Plural label for HUD copy ("Tap: Stars").
    pub fn plural_label(&self) -> &'static str {
        match self {
            ObjectKind::Star => "Stars",
            ObjectKind::Balloon => "Balloons",
            ObjectKind::Heart => "Hearts",
            ObjectKind::Circle => "Circles",
            ObjectKind::Triangle => "Triangles",
        }
    }
}

/// One level's spawn mix and end conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub number: u32,
    pub name: String,
    pub description: String,
    pub target: ObjectKind,
    pub distractors: Vec<ObjectKind>,
    /// Objects per second.
    pub spawn_rate: f32,
    /// Milliseconds an object stays on the field before silently expiring.
    pub lifespan_ms: u32,
    /// Probability 0..1 that a spawn is a target rather than a distractor.
    pub target_ratio: f32,
    /// Spawn is skipped while this many objects are live.
    pub max_objects: usize,
    /// Correct taps needed to clear the level.
    pub required_hits: u32,
    /// Lives for the session; each incorrect tap costs one.
    pub allowed_misses: u32,
    /// Background scroll speed in pixels per second.
    pub background_speed: f32,
    /// Hard session cutoff; None = unlimited.
    #[serde(default)]
    pub time_limit_secs: Option<u32>,
}

impl LevelSpec {
    pub fn spawn_interval_secs(&self) -> f32 {
        1.0 / self.spawn_rate
    }

    pub fn lifespan_secs(&self) -> f32 {
        self.lifespan_ms as f32 / 1000.0
    }
}

#[derive(Debug, Resource, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLibrary {
    pub version: u32,
    pub levels: Vec<LevelSpec>,
}

impl LevelLibrary {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let txt = fs::read_to_string(&path)
            .map_err(|e| format!("read level library {:?}: {e}", path.as_ref()))?;
        let lib: LevelLibrary = ron::from_str(&txt)
            .map_err(|e| format!("parse level library {:?}: {e}", path.as_ref()))?;
        lib.validate()?;
        Ok(lib)
    }

    /// The compiled-in stock table. The embed is validated by tests, so a
    /// parse failure here is a build defect, not a runtime condition.
    pub fn embedded() -> Self {
        let lib: LevelLibrary =
            ron::from_str(EMBEDDED_LEVELS_RON).expect("embedded level library must parse");
        lib.validate().expect("embedded level library must validate");
        lib
    }

    /// Disk load with embedded fallback; the error (if any) is returned for logging.
    pub fn load_or_embedded(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(lib) => (lib, None),
            Err(e) => (Self::embedded(), Some(e)),
        }
    }

    pub fn get(&self, number: u32) -> Option<&LevelSpec> {
        self.levels.iter().find(|l| l.number == number)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.version != 1 {
            return Err(format!(
                "level library version {} unsupported (expected 1)",
                self.version
            ));
        }
        if self.levels.is_empty() {
            return Err("level library is empty".into());
        }
        for (i, lv) in self.levels.iter().enumerate() {
            let expected = i as u32 + 1;
            if lv.number != expected {
                return Err(format!(
                    "level numbers must be dense 1..=N: slot {i} holds level {}",
                    lv.number
                ));
            }
            if lv.spawn_rate <= 0.0 {
                return Err(format!("level {}: spawn_rate must be > 0", lv.number));
            }
            if lv.lifespan_ms == 0 {
                return Err(format!("level {}: lifespan_ms must be > 0", lv.number));
            }
            if !(0.0..=1.0).contains(&lv.target_ratio) {
                return Err(format!(
                    "level {}: target_ratio {} outside 0..1",
                    lv.number, lv.target_ratio
                ));
            }
            if lv.max_objects == 0 {
                return Err(format!("level {}: max_objects must be > 0", lv.number));
            }
            if lv.required_hits == 0 {
                return Err(format!("level {}: required_hits must be > 0", lv.number));
            }
            if lv.allowed_misses == 0 {
                return Err(format!("level {}: allowed_misses must be > 0", lv.number));
            }
            if lv.distractors.contains(&lv.target) {
                return Err(format!(
                    "level {}: target kind {:?} also listed as a distractor",
                    lv.number, lv.target
                ));
            }
            if let Some(limit) = lv.time_limit_secs {
                if limit == 0 {
                    return Err(format!(
                        "level {}: time_limit_secs of 0 ends the session immediately",
                        lv.number
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Level requested via env var (`FOCUS_LEVEL`); CLI takes precedence and is
/// handled by clap in `main`.
pub fn resolve_env_level() -> Option<u32> {
    std::env::var("FOCUS_LEVEL")
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
}

/// Loads the level library into a resource at startup.
pub struct LevelLibraryPlugin;

impl Plugin for LevelLibraryPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_level_library);
    }
}

fn load_level_library(mut commands: Commands, cfg: Res<GameConfig>) {
    let (lib, err) = LevelLibrary::load_or_embedded(&cfg.levels_path);
    match err {
        None => info!(
            target: "level",
            "level library loaded from '{}' ({} levels)",
            cfg.levels_path,
            lib.levels.len()
        ),
        Some(e) => warn!(
            target: "level",
            "level library '{}' unavailable ({e}); using embedded table ({} levels)",
            cfg.levels_path,
            lib.levels.len()
        ),
    }
    commands.insert_resource(lib);
}
