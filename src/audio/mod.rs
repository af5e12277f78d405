//! One-shot sound effects keyed off scoring and session-end events. Handles
//! are requested once at startup and playback is fire-and-forget; a missing
//! asset only costs a runtime warning from the asset server.

use bevy::audio::Volume;
use bevy::prelude::*;

use crate::core::config::GameConfig;
use crate::gameplay::session::{SessionEnded, TapJudged};
use crate::persistence::SessionOutcome;

#[derive(Resource)]
pub struct SfxHandles {
    correct: Handle<AudioSource>,
    incorrect: Handle<AudioSource>,
    cleared: Handle<AudioSource>,
    failed: Handle<AudioSource>,
}

pub struct SfxPlugin;

impl Plugin for SfxPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_sfx)
            .add_systems(Update, (play_tap_sfx, play_session_sfx));
    }
}

fn load_sfx(mut commands: Commands, asset_server: Option<Res<AssetServer>>) {
    // Headless test apps carry no asset server; audio simply stays off.
    let Some(server) = asset_server else { return };
    commands.insert_resource(SfxHandles {
        correct: server.load("audio/correct.ogg"),
        incorrect: server.load("audio/incorrect.ogg"),
        cleared: server.load("audio/level_cleared.ogg"),
        failed: server.load("audio/level_failed.ogg"),
    });
}

fn play_one_shot(commands: &mut Commands, handle: &Handle<AudioSource>, volume: f32) {
    commands.spawn((
        AudioPlayer(handle.clone()),
        PlaybackSettings::DESPAWN.with_volume(Volume::Linear(volume)),
    ));
}

fn play_tap_sfx(
    mut commands: Commands,
    mut events: EventReader<TapJudged>,
    sfx: Option<Res<SfxHandles>>,
    cfg: Res<GameConfig>,
) {
    let Some(sfx) = sfx else {
        events.clear();
        return;
    };
    if !cfg.audio.enabled {
        events.clear();
        return;
    }
    for judged in events.read() {
        let handle = if judged.correct {
            &sfx.correct
        } else {
            &sfx.incorrect
        };
        play_one_shot(&mut commands, handle, cfg.audio.volume);
    }
}

fn play_session_sfx(
    mut commands: Commands,
    mut events: EventReader<SessionEnded>,
    sfx: Option<Res<SfxHandles>>,
    cfg: Res<GameConfig>,
) {
    let Some(sfx) = sfx else {
        events.clear();
        return;
    };
    if !cfg.audio.enabled {
        events.clear();
        return;
    }
    for ended in events.read() {
        let handle = match ended.outcome {
            SessionOutcome::Cleared => &sfx.cleared,
            SessionOutcome::Failed | SessionOutcome::TimedOut => &sfx.failed,
        };
        play_one_shot(&mut commands, handle, cfg.audio.volume);
    }
}
