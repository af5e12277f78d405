//! Timer-driven object spawner. Runs on the fixed timestep while a session
//! is live; each firing rolls target-vs-distractor, kind, position, size and
//! drift from the level spec and playfield config.

use bevy::prelude::*;
use rand::Rng;

use crate::app::state::{AppState, GameplayState};
use crate::core::components::{Breathe, Catchable, IsTarget, Lifespan, Motion, ObjectRadius, SpawnStamp};
use crate::core::config::GameConfig;
use crate::core::level::{LevelSpec, ObjectKind};
use crate::core::system_order::SpawnSet;
use crate::debug::DebugStats;
use crate::gameplay::session::{ActiveLevel, GameSession};
use crate::rendering::shapes::{attach_visuals, ShapeAssets};

#[derive(Resource, Deref, DerefMut)]
pub struct SpawnTimer(pub Timer);

impl SpawnTimer {
    pub fn for_level(level: &LevelSpec) -> Self {
        Self(Timer::from_seconds(
            level.spawn_interval_secs(),
            TimerMode::Repeating,
        ))
    }
}

pub struct SpawnPlugin;

impl Plugin for SpawnPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            spawn_objects.in_set(SpawnSet).run_if(
                in_state(AppState::Gameplay)
                    .and(in_state(GameplayState::Running))
                    .and(resource_exists::<SpawnTimer>),
            ),
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_objects(
    mut commands: Commands,
    time: Res<Time>,
    mut timer: ResMut<SpawnTimer>,
    level: Res<ActiveLevel>,
    cfg: Res<GameConfig>,
    mut session: ResMut<GameSession>,
    q_live: Query<(), With<Catchable>>,
    windows: Query<&Window>,
    shapes: Option<Res<ShapeAssets>>,
    mut stats: Option<ResMut<DebugStats>>,
) {
    if !timer.tick(time.delta()).just_finished() {
        return;
    }
    let live = q_live.iter().count();
    if live >= level.max_objects {
        return;
    }
    let budget = (level.max_objects - live).min(timer.times_finished_this_tick() as usize);

    // World is centered on the origin; spawn inside the margin-inset window.
    let (win_w, win_h) = windows
        .single()
        .map(|w| (w.width(), w.height()))
        .unwrap_or((cfg.window.width, cfg.window.height));

    let mut rng = rand::thread_rng();
    let now = time.elapsed_secs_f64();

    for _ in 0..budget {
        let pf = &cfg.playfield;
        let size = pf.base_size + (rng.gen::<f32>() - 0.5) * pf.size_variation;
        let half_w = (win_w / 2.0 - pf.spawn_margin - size / 2.0).max(0.0);
        let half_h = (win_h / 2.0 - pf.spawn_margin - size / 2.0).max(0.0);
        let pos = Vec2::new(
            rng.gen_range(-half_w..=half_w),
            rng.gen_range(-half_h..=half_h),
        );
        let velocity = Vec2::new(
            (rng.gen::<f32>() - 0.5) * pf.max_speed,
            (rng.gen::<f32>() - 0.5) * pf.max_speed,
        );
        let spin = (rng.gen::<f32>() - 0.5) * 2.0;

        let is_target = level.distractors.is_empty()
            || rng.gen_bool(f64::from(level.target_ratio.clamp(0.0, 1.0)));
        let kind: ObjectKind = if is_target {
            level.target
        } else {
            level.distractors[rng.gen_range(0..level.distractors.len())]
        };

        let mut entity = commands.spawn((
            Catchable,
            kind,
            IsTarget(is_target),
            ObjectRadius(size / 2.0),
            SpawnStamp(now),
            Lifespan(level.lifespan_secs()),
            Motion { velocity, spin },
            Breathe::new(),
            Transform::from_translation(pos.extend(1.0)),
            Visibility::default(),
        ));
        if let Some(shapes) = shapes.as_deref() {
            attach_visuals(&mut entity, shapes, kind, is_target, size, &mut rng);
        }

        if is_target {
            session.targets_spawned += 1;
        }
        if let Some(stats) = stats.as_deref_mut() {
            stats.spawned += 1;
        }
    }
}
