use bevy::prelude::*;

use crate::app::level_select::LevelSelectPlugin;
use crate::app::menu::MenuPlugin;
use crate::app::pause::PausePlugin;
use crate::app::progress_screen::ProgressScreenPlugin;
use crate::app::state::{AppState, GameplayState};
use crate::audio::SfxPlugin;
use crate::core::config::log_config_warnings;
use crate::core::level::{resolve_env_level, LevelLibrary, LevelLibraryPlugin};
use crate::core::system_order::{
    InputSet, MotionSet, PlayfieldTapSet, RetireSet, ScoringSet, SessionEndSet, SpawnSet,
    UiButtonSet,
};
use crate::debug::DebugPlugin;
use crate::gameplay::hud::HudPlugin;
use crate::gameplay::motion::MotionPlugin;
use crate::gameplay::session::{PendingLevel, SessionPlugin};
use crate::gameplay::spawn::SpawnPlugin;
use crate::interaction::auto_close::AutoClosePlugin;
use crate::interaction::config_hot_reload::ConfigHotReloadPlugin;
use crate::interaction::tap::TapPlugin;
use crate::persistence::ProgressStorePlugin;
use crate::rendering::background::BackgroundPlugin;
use crate::rendering::camera::CameraPlugin;
use crate::rendering::shapes::ShapesPlugin;

/// Level requested on the command line; bypasses the menus (and the unlock
/// gate, deliberately: it is a development entry point).
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct StartupLevel(pub Option<u32>);

pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            .init_state::<GameplayState>()
            // Periwinkle backdrop behind the menu screens.
            .insert_resource(ClearColor(Color::srgb(0.40, 0.49, 0.92)))
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .configure_sets(
                Update,
                (
                    InputSet,
                    ScoringSet.after(InputSet),
                    SessionEndSet.after(ScoringSet),
                ),
            )
            .configure_sets(Update, UiButtonSet.before(PlayfieldTapSet))
            .configure_sets(
                FixedUpdate,
                (
                    SpawnSet,
                    MotionSet.after(SpawnSet),
                    RetireSet.after(MotionSet),
                ),
            )
            .add_plugins((
                ProgressStorePlugin,
                LevelLibraryPlugin,
                CameraPlugin,
                ShapesPlugin,
                BackgroundPlugin,
                SessionPlugin,
                SpawnPlugin,
                MotionPlugin,
                TapPlugin,
                HudPlugin,
            ))
            .add_plugins((
                MenuPlugin,
                LevelSelectPlugin,
                ProgressScreenPlugin,
                PausePlugin,
                SfxPlugin,
                DebugPlugin,
                AutoClosePlugin,
                ConfigHotReloadPlugin,
            ))
            .add_systems(Startup, log_config_warnings)
            .add_systems(PostStartup, apply_startup_level);
    }
}

fn apply_startup_level(
    mut commands: Commands,
    startup: Option<Res<StartupLevel>>,
    library: Option<Res<LevelLibrary>>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let requested = startup.as_deref().and_then(|s| s.0).or_else(resolve_env_level);
    let Some(number) = requested else { return };
    match library.as_ref().and_then(|lib| lib.get(number)) {
        Some(spec) => {
            info!(
                target: "session",
                "startup level override: jumping straight into level {} '{}'",
                spec.number,
                spec.name
            );
            commands.insert_resource(PendingLevel { number });
            next_state.set(AppState::Gameplay);
        }
        None => warn!(
            target: "session",
            "startup level override {number} not in library; staying in menu"
        ),
    }
}
