pub mod app;
pub mod audio;
pub mod core;
pub mod debug;
pub mod gameplay;
pub mod interaction;
pub mod persistence;
pub mod rendering;

// Curated re-exports
pub use crate::app::game::GamePlugin;
pub use crate::app::state::{AppState, GameplayState};
pub use crate::core::config::GameConfig;
pub use crate::core::level::{LevelLibrary, LevelSpec, ObjectKind};
pub use crate::gameplay::session::{GameSession, PendingLevel, SessionEnded, TapJudged};
pub use crate::persistence::{ProgressStore, SessionOutcome};
