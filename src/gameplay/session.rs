//! Session state and scoring: one [`GameSession`] resource exists while
//! [`AppState::Gameplay`] is active, fed by tap judgements and closed by the
//! end-condition check.

use bevy::prelude::*;

use crate::app::state::{AppState, GameplayState};
use crate::core::config::{GameConfig, ScoringConfig};
use crate::core::components::Catchable;
use crate::core::level::{LevelLibrary, LevelSpec};
use crate::core::system_order::{ScoringSet, SessionEndSet};
use crate::gameplay::spawn::SpawnTimer;
use crate::persistence::{unix_now_secs, ProgressStore, SessionOutcome, SessionRecord};

/// Level chosen on the select screen (or via CLI/env); inserted before the
/// transition into Gameplay so `begin_session` never races the menu.
#[derive(Resource, Debug, Clone, Copy)]
pub struct PendingLevel {
    pub number: u32,
}

/// The level spec driving the current session.
#[derive(Resource, Debug, Clone, Deref)]
pub struct ActiveLevel(pub LevelSpec);

/// Verdict of one tap, written by the interaction layer.
#[derive(Event, Debug, Clone, Copy)]
pub struct TapJudged {
    pub correct: bool,
    /// Milliseconds from object spawn to tap; None for empty-space taps,
    /// which have no object to measure against.
    pub reaction_ms: Option<f32>,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct SessionEnded {
    pub outcome: SessionOutcome,
}

#[derive(Resource, Debug, Clone)]
pub struct GameSession {
    pub level: u32,
    /// Virtual-clock seconds at session start (pause time excluded).
    pub started_at: f64,
    /// Wall-clock start for the persisted record.
    pub wall_started_at: u64,
    pub correct: u32,
    pub incorrect: u32,
    pub targets_spawned: u32,
    pub reaction_samples_ms: Vec<f32>,
    pub score: u32,
    pub lives: u32,
}

impl GameSession {
    pub fn new(level: &LevelSpec, started_at: f64) -> Self {
        Self {
            level: level.number,
            started_at,
            wall_started_at: unix_now_secs(),
            correct: 0,
            incorrect: 0,
            targets_spawned: 0,
            reaction_samples_ms: Vec::new(),
            score: 0,
            lives: level.allowed_misses,
        }
    }

    pub fn record_correct(&mut self, reaction_ms: f32, scoring: &ScoringConfig) {
        self.correct += 1;
        self.reaction_samples_ms.push(reaction_ms);
        self.score += scoring.points_correct;
    }

    /// Distractor hit or empty-space tap: score floor at 0, one life gone.
    pub fn record_incorrect(&mut self, scoring: &ScoringConfig) {
        self.incorrect += 1;
        self.score = self.score.saturating_sub(scoring.penalty_incorrect);
        self.lives = self.lives.saturating_sub(1);
    }

    pub fn total_taps(&self) -> u32 {
        self.correct + self.incorrect
    }

    /// Percent, 0.0 when nothing has been tapped yet.
    pub fn accuracy(&self) -> f32 {
        if self.total_taps() == 0 {
            return 0.0;
        }
        self.correct as f32 / self.total_taps() as f32 * 100.0
    }

    /// 0.0 when no correct tap has landed yet.
    pub fn mean_reaction_ms(&self) -> f32 {
        if self.reaction_samples_ms.is_empty() {
            return 0.0;
        }
        self.reaction_samples_ms.iter().sum::<f32>() / self.reaction_samples_ms.len() as f32
    }

    /// First end condition met, if any.
    pub fn end_condition(&self, level: &LevelSpec, elapsed_secs: f64) -> Option<SessionOutcome> {
        if self.correct >= level.required_hits {
            Some(SessionOutcome::Cleared)
        } else if self.lives == 0 {
            Some(SessionOutcome::Failed)
        } else if let Some(limit) = level.time_limit_secs {
            (elapsed_secs >= limit as f64).then_some(SessionOutcome::TimedOut)
        } else {
            None
        }
    }
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TapJudged>()
            .add_event::<SessionEnded>()
            .add_systems(OnEnter(AppState::Gameplay), begin_session)
            .add_systems(OnExit(AppState::Gameplay), teardown_session)
            .add_systems(
                Update,
                (
                    apply_tap_judgements.in_set(ScoringSet),
                    check_session_end.in_set(SessionEndSet).after(ScoringSet),
                    finalize_session.in_set(SessionEndSet).after(check_session_end),
                )
                    .run_if(in_state(AppState::Gameplay).and(resource_exists::<GameSession>)),
            );
    }
}

fn begin_session(
    mut commands: Commands,
    time: Res<Time>,
    pending: Option<Res<PendingLevel>>,
    library: Option<Res<LevelLibrary>>,
    mut next_app: ResMut<NextState<AppState>>,
    mut next_gameplay: ResMut<NextState<GameplayState>>,
) {
    let requested = pending.map(|p| p.number).unwrap_or(1);
    let Some(spec) = library.as_ref().and_then(|lib| lib.get(requested)).cloned() else {
        warn!(target: "session", "level {requested} not in library; returning to level select");
        next_app.set(AppState::LevelSelect);
        return;
    };
    info!(
        target: "session",
        "session start: level {} '{}' (need {} hits, {} lives{})",
        spec.number,
        spec.name,
        spec.required_hits,
        spec.allowed_misses,
        spec.time_limit_secs
            .map(|t| format!(", {t}s limit"))
            .unwrap_or_default()
    );
    commands.insert_resource(GameSession::new(&spec, time.elapsed_secs_f64()));
    commands.insert_resource(SpawnTimer::for_level(&spec));
    commands.insert_resource(ActiveLevel(spec));
    next_gameplay.set(GameplayState::Running);
}

fn apply_tap_judgements(
    mut events: EventReader<TapJudged>,
    mut session: ResMut<GameSession>,
    cfg: Res<GameConfig>,
) {
    for judged in events.read() {
        match (judged.correct, judged.reaction_ms) {
            (true, Some(ms)) => {
                session.record_correct(ms, &cfg.scoring);
                debug!(target: "session", "correct tap ({ms:.0} ms), score={}", session.score);
            }
            _ => {
                session.record_incorrect(&cfg.scoring);
                debug!(
                    target: "session",
                    "incorrect tap, lives={} score={}", session.lives, session.score
                );
            }
        }
    }
}

fn check_session_end(
    time: Res<Time>,
    session: Res<GameSession>,
    level: Res<ActiveLevel>,
    mut ended: EventWriter<SessionEnded>,
    state: Res<State<GameplayState>>,
) {
    // A paused clock cannot trip the time limit, but guard anyway: no session
    // may end while the player cannot act.
    if *state.get() == GameplayState::Paused {
        return;
    }
    let elapsed = time.elapsed_secs_f64() - session.started_at;
    if let Some(outcome) = session.end_condition(&level, elapsed) {
        ended.write(SessionEnded { outcome });
    }
}

fn finalize_session(
    mut commands: Commands,
    mut events: EventReader<SessionEnded>,
    session: Res<GameSession>,
    mut store: ResMut<ProgressStore>,
    cfg: Res<GameConfig>,
    mut next_app: ResMut<NextState<AppState>>,
) {
    let Some(ended) = events.read().next() else {
        return;
    };
    let record = SessionRecord {
        id: format!("session_{}_{}", session.wall_started_at, session.level),
        level: session.level,
        started_at: session.wall_started_at,
        ended_at: unix_now_secs(),
        correct: session.correct,
        incorrect: session.incorrect,
        targets_spawned: session.targets_spawned,
        accuracy: session.accuracy(),
        mean_reaction_ms: session.mean_reaction_ms(),
        outcome: ended.outcome,
    };
    info!(
        target: "session",
        "session end: level {} {:?} accuracy={:.0}% mean_reaction={:.0}ms score={}",
        record.level,
        record.outcome,
        record.accuracy,
        record.mean_reaction_ms,
        session.score
    );
    store.record_session(record);
    if let Err(e) = store.save(&cfg.persistence.data_dir) {
        error!(target: "progress", "failed to persist progress: {e:#}");
    }
    commands.remove_resource::<GameSession>();
    next_app.set(AppState::LevelSelect);
}

fn teardown_session(mut commands: Commands, q_objects: Query<Entity, With<Catchable>>) {
    for e in &q_objects {
        commands.entity(e).despawn();
    }
    commands.remove_resource::<GameSession>();
    commands.remove_resource::<ActiveLevel>();
    commands.remove_resource::<SpawnTimer>();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::level::LevelLibrary;

    fn level_one() -> LevelSpec {
        LevelLibrary::embedded().get(1).unwrap().clone()
    }

    #[test]
    fn scoring_arithmetic() {
        let level = level_one();
        let scoring = ScoringConfig::default();
        let mut s = GameSession::new(&level, 0.0);
        assert_eq!(s.lives, level.allowed_misses);
        s.record_correct(500.0, &scoring);
        s.record_correct(700.0, &scoring);
        assert_eq!(s.score, 20);
        assert_eq!(s.mean_reaction_ms(), 600.0);
        s.record_incorrect(&scoring);
        assert_eq!(s.score, 15);
        assert_eq!(s.lives, level.allowed_misses - 1);
        assert_eq!(s.accuracy(), 2.0 / 3.0 * 100.0);
    }

    #[test]
    fn score_floors_at_zero() {
        let level = level_one();
        let scoring = ScoringConfig::default();
        let mut s = GameSession::new(&level, 0.0);
        s.record_incorrect(&scoring);
        assert_eq!(s.score, 0);
    }

    #[test]
    fn accuracy_and_reaction_default_to_zero() {
        let s = GameSession::new(&level_one(), 0.0);
        assert_eq!(s.accuracy(), 0.0);
        assert_eq!(s.mean_reaction_ms(), 0.0);
    }

    #[test]
    fn end_condition_cleared_beats_other_checks() {
        let level = level_one();
        let scoring = ScoringConfig::default();
        let mut s = GameSession::new(&level, 0.0);
        for _ in 0..level.required_hits {
            s.record_correct(400.0, &scoring);
        }
        assert_eq!(s.end_condition(&level, 1.0), Some(SessionOutcome::Cleared));
    }

    #[test]
    fn end_condition_failed_when_lives_exhausted() {
        let level = level_one();
        let scoring = ScoringConfig::default();
        let mut s = GameSession::new(&level, 0.0);
        for _ in 0..level.allowed_misses {
            s.record_incorrect(&scoring);
        }
        assert_eq!(s.end_condition(&level, 1.0), Some(SessionOutcome::Failed));
    }

    #[test]
    fn end_condition_time_limit() {
        let mut level = level_one();
        level.time_limit_secs = Some(30);
        let s = GameSession::new(&level, 0.0);
        assert_eq!(s.end_condition(&level, 29.9), None);
        assert_eq!(s.end_condition(&level, 30.0), Some(SessionOutcome::TimedOut));
    }

    #[test]
    fn no_end_condition_mid_session() {
        let level = level_one();
        let s = GameSession::new(&level, 0.0);
        assert_eq!(s.end_condition(&level, 5.0), None);
    }
}
