use bevy::prelude::*;

/// High-level app lifecycle state.
/// MainMenu -> LevelSelect -> Gameplay -> back to LevelSelect on session end.
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    /// Entry screen (start / view progress).
    #[default]
    MainMenu,
    /// Player chooses a level; locked levels are shown but inert.
    LevelSelect,
    /// Active play session.
    Gameplay,
    /// Progress report screen.
    Progress,
}

/// Gameplay sub-state; only meaningful while [`AppState::Gameplay`] is active.
#[derive(States, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameplayState {
    #[default]
    Running,
    Paused,
}
