//! Fixed-timestep object advancement: drift, spin, breathing scale, then
//! lifespan expiry and off-screen culling. Expiry is silent; only taps score.

use bevy::prelude::*;

use crate::app::state::{AppState, GameplayState};
use crate::core::components::{Breathe, Catchable, Lifespan, Motion, ObjectRadius, SpawnStamp};
use crate::core::config::GameConfig;
use crate::core::system_order::{MotionSet, RetireSet, SpawnSet};
use crate::debug::DebugStats;

pub struct MotionPlugin;

impl Plugin for MotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                advance_objects.in_set(MotionSet).after(SpawnSet),
                (expire_objects, cull_offscreen)
                    .in_set(RetireSet)
                    .after(MotionSet),
            )
                .run_if(in_state(AppState::Gameplay).and(in_state(GameplayState::Running))),
        );
    }
}

fn advance_objects(
    time: Res<Time>,
    mut q: Query<(&mut Transform, &Motion, &mut Breathe), With<Catchable>>,
) {
    let dt = time.delta_secs();
    for (mut tf, motion, mut breathe) in q.iter_mut() {
        tf.translation.x += motion.velocity.x * dt;
        tf.translation.y += motion.velocity.y * dt;
        tf.rotate_z(motion.spin * dt);
        breathe.advance(dt);
        tf.scale = Vec3::splat(breathe.scale);
    }
}

fn expire_objects(
    mut commands: Commands,
    time: Res<Time>,
    q: Query<(Entity, &SpawnStamp, &Lifespan), With<Catchable>>,
    mut stats: Option<ResMut<DebugStats>>,
) {
    let now = time.elapsed_secs_f64();
    for (e, stamp, lifespan) in &q {
        if now - stamp.0 > f64::from(lifespan.0) {
            commands.entity(e).despawn();
            if let Some(stats) = stats.as_deref_mut() {
                stats.expired += 1;
            }
        }
    }
}

fn cull_offscreen(
    mut commands: Commands,
    windows: Query<&Window>,
    cfg: Res<GameConfig>,
    q: Query<(Entity, &Transform, &ObjectRadius), With<Catchable>>,
    mut stats: Option<ResMut<DebugStats>>,
) {
    let (win_w, win_h) = windows
        .single()
        .map(|w| (w.width(), w.height()))
        .unwrap_or((cfg.window.width, cfg.window.height));
    let max_x = win_w / 2.0;
    let max_y = win_h / 2.0;
    for (e, tf, radius) in &q {
        let pos = tf.translation.truncate();
        let reach = radius.0 * tf.scale.x;
        if pos.x + reach < -max_x
            || pos.x - reach > max_x
            || pos.y + reach < -max_y
            || pos.y - reach > max_y
        {
            commands.entity(e).despawn();
            if let Some(stats) = stats.as_deref_mut() {
                stats.expired += 1;
            }
        }
    }
}
