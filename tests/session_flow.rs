//! Headless session lifecycle: spawner caps, expiry, scoring events, end
//! conditions, state transitions, persisted progress.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use focus_catcher::core::components::Catchable;
use focus_catcher::debug::DebugStats;
use focus_catcher::gameplay::motion::MotionPlugin;
use focus_catcher::gameplay::session::SessionPlugin;
use focus_catcher::gameplay::spawn::SpawnPlugin;
use focus_catcher::{
    AppState, GameConfig, GameSession, GameplayState, LevelLibrary, PendingLevel, ProgressStore,
    SessionOutcome, TapJudged,
};

// Keep the TempDir alive for the whole test; progress files land in it.
fn test_app(level: u32, data_dir: &std::path::Path) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_micros(
        16_667,
    )));
    app.insert_resource(Time::<Fixed>::from_hz(60.0));
    app.init_state::<AppState>();
    app.init_state::<GameplayState>();
    let mut cfg = GameConfig::default();
    cfg.persistence.data_dir = data_dir.to_path_buf();
    app.insert_resource(cfg);
    app.insert_resource(LevelLibrary::embedded());
    app.insert_resource(ProgressStore::default());
    app.insert_resource(DebugStats::default());
    app.insert_resource(PendingLevel { number: level });
    app.add_plugins((SessionPlugin, SpawnPlugin, MotionPlugin));
    app.world_mut()
        .resource_mut::<NextState<AppState>>()
        .set(AppState::Gameplay);
    // Two updates: initial state setup, then the queued Gameplay transition
    // (and begin_session) are guaranteed to have applied.
    app.update();
    app.update();
    assert_eq!(
        *app.world().resource::<State<AppState>>().get(),
        AppState::Gameplay
    );
    assert!(app.world().get_resource::<GameSession>().is_some());
    app
}

fn live_objects(app: &mut App) -> usize {
    let mut q = app.world_mut().query_filtered::<Entity, With<Catchable>>();
    q.iter(app.world()).count()
}

fn app_state(app: &App) -> AppState {
    *app.world().resource::<State<AppState>>().get()
}

#[test]
fn spawner_respects_max_objects() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(1, dir.path());
    let max = LevelLibrary::embedded().get(1).unwrap().max_objects;

    // ~10 virtual seconds at level 1's 0.5/sec spawn rate and 4 s lifespan.
    let mut peak = 0;
    for _ in 0..600 {
        app.update();
        peak = peak.max(live_objects(&mut app));
        assert!(live_objects(&mut app) <= max, "cap exceeded");
    }
    assert!(peak > 0, "nothing ever spawned");
    // The session outlives all this: no end condition was ever met.
    assert!(app.world().get_resource::<GameSession>().is_some());
}

#[test]
fn objects_expire_after_their_lifespan() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(1, dir.path());

    // Run well past spawn interval (2 s) + lifespan (4 s).
    for _ in 0..500 {
        app.update();
    }
    let stats = app.world().resource::<DebugStats>();
    assert!(stats.spawned > 0, "no spawns recorded");
    assert!(stats.expired > 0, "no expiries despite lifespans elapsing");
}

#[test]
fn cleared_session_persists_progress_and_returns_to_level_select() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(1, dir.path());

    let required = LevelLibrary::embedded().get(1).unwrap().required_hits;
    for _ in 0..required {
        app.world_mut().send_event(TapJudged {
            correct: true,
            reaction_ms: Some(480.0),
        });
    }
    app.update(); // scoring + end check + finalize
    app.update(); // state transition applies

    assert_eq!(app_state(&app), AppState::LevelSelect);
    assert!(app.world().get_resource::<GameSession>().is_none());

    let store = app.world().resource::<ProgressStore>();
    assert_eq!(store.total_sessions(), 1);
    let record = &store.sessions[0];
    assert_eq!(record.outcome, SessionOutcome::Cleared);
    assert_eq!(record.correct, required);
    assert_eq!(record.accuracy, 100.0);
    assert_eq!(record.mean_reaction_ms, 480.0);
    assert!(store.is_unlocked(2, 70.0));

    // Both files hit the disk.
    let (reloaded, warnings) = ProgressStore::load(dir.path());
    assert!(warnings.is_empty());
    assert_eq!(reloaded.total_sessions(), 1);
    assert_eq!(reloaded.level_progress(1).unwrap().times_played, 1);
}

#[test]
fn exhausted_lives_fail_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(1, dir.path());

    let misses = LevelLibrary::embedded().get(1).unwrap().allowed_misses;
    for _ in 0..misses {
        app.world_mut().send_event(TapJudged {
            correct: false,
            reaction_ms: None,
        });
    }
    app.update();
    app.update();

    assert_eq!(app_state(&app), AppState::LevelSelect);
    let store = app.world().resource::<ProgressStore>();
    assert_eq!(store.sessions[0].outcome, SessionOutcome::Failed);
    assert_eq!(store.sessions[0].accuracy, 0.0);
    // A failed run at 0% does not unlock anything.
    assert!(!store.is_unlocked(2, 70.0));
}

#[test]
fn empty_space_taps_cost_a_life_but_no_reaction_sample() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(1, dir.path());

    app.world_mut().send_event(TapJudged {
        correct: false,
        reaction_ms: None,
    });
    app.update();

    let session = app.world().resource::<GameSession>();
    assert_eq!(session.incorrect, 1);
    assert!(session.reaction_samples_ms.is_empty());
    assert_eq!(
        session.lives,
        LevelLibrary::embedded().get(1).unwrap().allowed_misses - 1
    );
}

#[test]
fn time_limit_expires_the_session() {
    let dir = tempfile::tempdir().unwrap();
    // Level 10 carries the 60 s limit.
    let mut app = test_app(10, dir.path());

    // 61 virtual seconds at ~60 updates/sec.
    for _ in 0..(61 * 60) {
        app.update();
        if app_state(&app) == AppState::LevelSelect {
            break;
        }
    }
    assert_eq!(app_state(&app), AppState::LevelSelect);
    let store = app.world().resource::<ProgressStore>();
    assert_eq!(store.sessions[0].outcome, SessionOutcome::TimedOut);
}

#[test]
fn finalize_runs_in_the_same_update_as_the_finishing_tap() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(1, dir.path());
    let required = LevelLibrary::embedded().get(1).unwrap().required_hits;
    for _ in 0..required {
        app.world_mut().send_event(TapJudged {
            correct: true,
            reaction_ms: Some(300.0),
        });
    }
    app.update();
    // Scoring, end check and finalize chain inside one update: the store is
    // already written even before the state flip applies.
    assert_eq!(app.world().resource::<ProgressStore>().total_sessions(), 1);
}
