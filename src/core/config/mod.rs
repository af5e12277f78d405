use bevy::prelude::*;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
    /// Automatically close the app after this many seconds. 0.0 (or omitted) = run indefinitely.
    #[serde(rename = "autoClose")]
    pub auto_close: f32,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            title: "Focus Catcher".into(),
            auto_close: 0.0,
        }
    }
}

/// Spawn area + object appearance parameters shared by every level.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PlayfieldConfig {
    /// Inset from the window edges inside which objects may spawn.
    pub spawn_margin: f32,
    /// Base object diameter before per-object variation.
    pub base_size: f32,
    /// Total diameter variation band (spawned size = base +/- variation/2).
    pub size_variation: f32,
    /// Velocity components are drawn uniformly from +/- max_speed/2.
    pub max_speed: f32,
}
impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            spawn_margin: 50.0,
            base_size: 60.0,
            size_variation: 20.0,
            max_speed: 50.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub points_correct: u32,
    pub penalty_incorrect: u32,
}
impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_correct: 10,
            penalty_incorrect: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UnlockConfig {
    /// Best accuracy (percent) a level must reach before the next one unlocks.
    pub accuracy_threshold: f32,
}
impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            accuracy_threshold: 70.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub enabled: bool,
    /// Linear playback volume, 0..1.
    pub volume: f32,
}
impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.8,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Directory the progress / session JSON files live in.
    pub data_dir: PathBuf,
}
impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub playfield: PlayfieldConfig,
    pub scoring: ScoringConfig,
    pub unlock: UnlockConfig,
    pub audio: AudioConfig,
    pub persistence: PersistenceConfig,
    /// Level library RON file; the embedded library is used when this is missing.
    pub levels_path: String,
}
impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window: Default::default(),
            playfield: Default::default(),
            scoring: Default::default(),
            unlock: Default::default(),
            audio: Default::default(),
            persistence: Default::default(),
            levels_path: "assets/config/levels.ron".into(),
        }
    }
}

impl GameConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load multiple config layers, later files overriding earlier ones (deep merge).
    /// Missing files are skipped; returns (config, list_of_layer_paths_used, list_of_errors).
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();

        fn merge_value(base: &mut ron::value::Value, overlay: ron::value::Value) {
            use ron::value::Value;
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let mut incoming = Some(v);
                        let mut replaced = false;
                        for (ek, ev) in bm.iter_mut() {
                            if *ek == k {
                                let val = incoming.take().unwrap();
                                merge_value(ev, val);
                                replaced = true;
                                break;
                            }
                        }
                        if !replaced {
                            bm.insert(k, incoming.unwrap());
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }

        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(_) => {} // missing layers are expected (e.g. game.local.ron)
            }
        }

        if let Some(val) = merged {
            match val.clone().into_rust::<GameConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => (GameConfig::default(), used, {
                    let mut evec = errors;
                    evec.push(format!(
                        "failed to deserialize merged config; using defaults: {e}"
                    ));
                    evec
                }),
            }
        } else {
            (GameConfig::default(), used, errors)
        }
    }

    /// Validate the configuration returning a list of human-readable warning strings.
    /// These represent suspicious / potentially unintended values but are not hard errors.
    /// Call at startup and log each warning with `warn!`.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        if self.window.auto_close < 0.0 {
            w.push(format!(
                "window.autoClose {} negative -> treated as disabled (should be >= 0)",
                self.window.auto_close
            ));
        }
        let pf = &self.playfield;
        if pf.base_size <= 0.0 {
            w.push("playfield.base_size must be > 0".into());
        }
        if pf.size_variation < 0.0 {
            w.push("playfield.size_variation negative".into());
        }
        if pf.size_variation >= pf.base_size {
            w.push(format!(
                "playfield.size_variation {} >= base_size {} -> zero-or-negative sizes possible",
                pf.size_variation, pf.base_size
            ));
        }
        if pf.max_speed < 0.0 {
            w.push("playfield.max_speed negative".into());
        }
        if pf.spawn_margin < 0.0 {
            w.push("playfield.spawn_margin negative".into());
        }
        if 2.0 * pf.spawn_margin + pf.base_size >= self.window.width.min(self.window.height) {
            w.push(format!(
                "playfield.spawn_margin {} leaves no room to spawn in a {}x{} window",
                pf.spawn_margin, self.window.width, self.window.height
            ));
        }
        if self.scoring.points_correct == 0 {
            w.push("scoring.points_correct is 0; score never rises".into());
        }
        if !(0.0..=100.0).contains(&self.unlock.accuracy_threshold) {
            w.push(format!(
                "unlock.accuracy_threshold {} outside 0..100",
                self.unlock.accuracy_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            w.push(format!("audio.volume {} outside 0..1", self.audio.volume));
        }
        if self.levels_path.trim().is_empty() {
            w.push("levels_path empty; embedded level library will be used".into());
        }
        w
    }
}

/// Warnings produced by `validate()` in `main`, logged once the app logger is up.
#[derive(Resource, Debug, Default, Clone)]
pub struct ConfigWarnings(pub Vec<String>);

pub fn log_config_warnings(warnings: Option<Res<ConfigWarnings>>) {
    if let Some(list) = warnings {
        for w in &list.0 {
            warn!(target: "config", "{w}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_sample_config() {
        let sample = r#"(
            window: (width: 1024.0, height: 768.0, title: "Test"),
            playfield: (spawn_margin: 40.0, base_size: 50.0, size_variation: 10.0, max_speed: 80.0),
            scoring: (points_correct: 15, penalty_incorrect: 3),
            unlock: (accuracy_threshold: 65.0),
            audio: (enabled: false, volume: 0.5),
            persistence: (data_dir: "save"),
            levels_path: "assets/config/levels.ron",
        )"#;
        let mut file = tempfile::NamedTempFile::new().expect("tmp file");
        file.write_all(sample.as_bytes()).unwrap();
        let cfg = GameConfig::load_from_file(file.path()).expect("parse config");
        assert_eq!(cfg.window.width, 1024.0);
        assert_eq!(cfg.scoring.points_correct, 15);
        assert_eq!(cfg.unlock.accuracy_threshold, 65.0);
        assert!(!cfg.audio.enabled);
        assert_eq!(cfg.persistence.data_dir, PathBuf::from("save"));
        assert!(
            cfg.validate().is_empty(),
            "expected no validation warnings for sample config"
        );
    }

    #[test]
    fn validate_detects_warnings() {
        let bad = GameConfig {
            window: WindowConfig {
                width: -100.0,
                height: 0.0,
                title: "Bad".into(),
                auto_close: -1.0,
            },
            playfield: PlayfieldConfig {
                spawn_margin: -5.0,
                base_size: 0.0,
                size_variation: 10.0,
                max_speed: -1.0,
            },
            scoring: ScoringConfig {
                points_correct: 0,
                penalty_incorrect: 5,
            },
            unlock: UnlockConfig {
                accuracy_threshold: 130.0,
            },
            audio: AudioConfig {
                enabled: true,
                volume: 1.5,
            },
            persistence: Default::default(),
            levels_path: " ".into(),
        };
        let warnings = bad.validate();
        let joined = warnings.join(" | ");
        assert!(joined.contains("window dimensions must be > 0"));
        assert!(joined.contains("window.autoClose"));
        assert!(joined.contains("playfield.base_size must be > 0"));
        assert!(joined.contains("playfield.max_speed negative"));
        assert!(joined.contains("scoring.points_correct is 0"));
        assert!(joined.contains("unlock.accuracy_threshold"));
        assert!(joined.contains("audio.volume"));
        assert!(joined.contains("levels_path empty"));
        assert!(
            warnings.len() >= 8,
            "expected many warnings, got {}: {joined}",
            warnings.len()
        );
    }

    #[test]
    fn load_or_default_missing_file() {
        let (cfg, err) = GameConfig::load_or_default("this/file/does/not/exist.ron");
        assert!(err.is_some());
        assert_eq!(cfg.window.width, WindowConfig::default().width);
    }

    #[test]
    fn layered_merge_overrides() {
        let base = r#"(
            window: (width: 900.0),
            scoring: (points_correct: 20),
        )"#;
        let override_one = r#"(
            window: (title: "Custom Title"),
            scoring: (penalty_incorrect: 1),
        )"#;
        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        let mut f2 = tempfile::NamedTempFile::new().unwrap();
        f1.write_all(base.as_bytes()).unwrap();
        f2.write_all(override_one.as_bytes()).unwrap();
        let (cfg, used, errors) = GameConfig::load_layered([f1.path(), f2.path()]);
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
        assert_eq!(used.len(), 2);
        assert_eq!(cfg.window.width, 900.0); // from base
        assert_eq!(cfg.window.title, "Custom Title"); // overridden
        assert_eq!(cfg.scoring.points_correct, 20);
        assert_eq!(cfg.scoring.penalty_incorrect, 1);
        // Untouched section keeps defaults
        assert_eq!(
            cfg.unlock.accuracy_threshold,
            UnlockConfig::default().accuracy_threshold
        );
    }

    #[test]
    fn layered_skips_missing_files() {
        let base = r#"(window: (width: 640.0))"#;
        let mut f1 = tempfile::NamedTempFile::new().unwrap();
        f1.write_all(base.as_bytes()).unwrap();
        let (cfg, used, errors) =
            GameConfig::load_layered([f1.path(), Path::new("does/not/exist.local.ron")]);
        assert!(errors.is_empty());
        assert_eq!(used.len(), 1);
        assert_eq!(cfg.window.width, 640.0);
    }
}
