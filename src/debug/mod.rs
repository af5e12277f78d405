//! Diagnostics: spawn/expiry counters plus (behind the `debug` feature) a
//! once-per-second log line with frame timing and session counters.

use bevy::prelude::*;

#[cfg(feature = "debug")]
use crate::core::components::Catchable;
#[cfg(feature = "debug")]
use crate::gameplay::session::GameSession;

/// Running totals for the whole process lifetime.
#[derive(Resource, Default, Debug)]
pub struct DebugStats {
    pub spawned: u64,
    pub expired: u64,
}

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugStats>();
        #[cfg(feature = "debug")]
        app.add_systems(Update, debug_logging_system);
    }
}

#[cfg(feature = "debug")]
fn debug_logging_system(
    time: Res<Time<Real>>,
    mut accum: Local<f32>,
    stats: Res<DebugStats>,
    q_objects: Query<(), With<Catchable>>,
    session: Option<Res<GameSession>>,
) {
    *accum += time.delta_secs();
    if *accum < 1.0 {
        return;
    }
    *accum = 0.0;
    let ft_ms = time.delta_secs() * 1000.0;
    let fps = if ft_ms > 0.0 { 1000.0 / ft_ms } else { 0.0 };
    match session {
        Some(s) => info!(
            "SIM fps={:.1} ft_ms={:.1} objects={} spawned={} expired={} level={} correct={} incorrect={} lives={} score={}",
            fps,
            ft_ms,
            q_objects.iter().count(),
            stats.spawned,
            stats.expired,
            s.level,
            s.correct,
            s.incorrect,
            s.lives,
            s.score
        ),
        None => info!(
            "SIM fps={:.1} ft_ms={:.1} objects={} spawned={} expired={}",
            fps,
            ft_ms,
            q_objects.iter().count(),
            stats.spawned,
            stats.expired
        ),
    }
}
