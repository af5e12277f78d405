//! Pointer picking: one tap, one verdict. Works for mouse and touch; the
//! press position is converted through the 2D camera and hit-tested against
//! every live object's breathing-scaled radius.

use bevy::prelude::*;

use crate::app::state::{AppState, GameplayState};
use crate::core::components::{Catchable, IsTarget, ObjectRadius, SpawnStamp};
use crate::core::system_order::{InputSet, PlayfieldTapSet};
use crate::gameplay::session::{GameSession, TapJudged};

/// Set by UI button handlers so a tap that landed on a button never falls
/// through to the playfield. Cleared at the top of every frame.
#[derive(Resource, Default, Debug)]
pub struct TapConsumed(pub bool);

pub struct TapPlugin;

impl Plugin for TapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TapConsumed>().add_systems(
            Update,
            (
                clear_tap_consumed.before(InputSet),
                handle_tap.in_set(InputSet).in_set(PlayfieldTapSet).run_if(
                    in_state(AppState::Gameplay)
                        .and(in_state(GameplayState::Running))
                        .and(resource_exists::<GameSession>),
                ),
            ),
        );
    }
}

fn clear_tap_consumed(mut consumed: ResMut<TapConsumed>) {
    consumed.0 = false;
}

fn cursor_world_pos(
    camera_q: &Query<(&Camera, &GlobalTransform)>,
    screen_pos: Vec2,
) -> Option<Vec2> {
    let (camera, cam_tf) = camera_q.iter().next()?;
    camera.viewport_to_world_2d(cam_tf, screen_pos).ok()
}

fn primary_press_world_pos(
    window: &Window,
    buttons: &ButtonInput<MouseButton>,
    touches: &Touches,
    camera_q: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    if let Some(touch) = touches.iter_just_pressed().next() {
        return cursor_world_pos(camera_q, touch.position());
    }
    if buttons.just_pressed(MouseButton::Left) {
        let cursor = window.cursor_position()?;
        return cursor_world_pos(camera_q, cursor);
    }
    None
}

/// One pick candidate: world-space center plus the effective (scaled) radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickCandidate {
    pub entity: Entity,
    pub center: Vec2,
    pub radius: f32,
}

const DIST_EPS: f32 = 1e-4; // distance-squared epsilon for tie-breaking

/// Nearest hit wins. Distance ties go to the larger radius, then the lower
/// entity index, so equal input always picks the same object.
pub fn pick_object(
    world_pos: Vec2,
    candidates: impl IntoIterator<Item = PickCandidate>,
) -> Option<PickCandidate> {
    let mut best: Option<(PickCandidate, f32)> = None;
    for cand in candidates {
        let delta = world_pos - cand.center;
        if !delta.x.is_finite() || !delta.y.is_finite() {
            continue;
        }
        let d2 = delta.length_squared();
        if d2 > cand.radius * cand.radius {
            continue;
        }
        let replace = match &best {
            None => true,
            Some((b, bd2)) => {
                if d2 + DIST_EPS < *bd2 {
                    true
                } else if (d2 - bd2).abs() <= DIST_EPS {
                    if cand.radius > b.radius + 1e-6 {
                        true
                    } else if (cand.radius - b.radius).abs() <= 1e-6 {
                        cand.entity.index() < b.entity.index()
                    } else {
                        false
                    }
                } else {
                    false
                }
            }
        };
        if replace {
            best = Some((cand, d2));
        }
    }
    best.map(|(c, _)| c)
}

#[allow(clippy::too_many_arguments)]
fn handle_tap(
    mut commands: Commands,
    time: Res<Time>,
    buttons: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows_q: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform)>,
    q: Query<(Entity, &Transform, &ObjectRadius, &IsTarget, &SpawnStamp), With<Catchable>>,
    consumed: Res<TapConsumed>,
    mut judged: EventWriter<TapJudged>,
) {
    if consumed.0 {
        return;
    }
    let Ok(window) = windows_q.single() else {
        return;
    };
    let Some(world_pos) = primary_press_world_pos(window, &buttons, &touches, &camera_q) else {
        return;
    };

    let hit = pick_object(
        world_pos,
        q.iter().map(|(entity, tf, radius, _, _)| PickCandidate {
            entity,
            center: tf.translation.truncate(),
            radius: radius.0 * tf.scale.x,
        }),
    );

    match hit {
        Some(cand) => {
            let Ok((_, _, _, is_target, stamp)) = q.get(cand.entity) else {
                return;
            };
            let reaction_ms = ((time.elapsed_secs_f64() - stamp.0) * 1000.0) as f32;
            commands.entity(cand.entity).despawn();
            judged.write(TapJudged {
                correct: is_target.0,
                reaction_ms: Some(reaction_ms),
            });
        }
        // Empty space: an impulse-control miss. No object, no reaction sample.
        None => {
            judged.write(TapJudged {
                correct: false,
                reaction_ms: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn miss_outside_every_radius() {
        let e = entities(1);
        let hit = pick_object(
            Vec2::new(100.0, 100.0),
            [PickCandidate {
                entity: e[0],
                center: Vec2::ZERO,
                radius: 30.0,
            }],
        );
        assert!(hit.is_none());
    }

    #[test]
    fn nearest_hit_wins() {
        let e = entities(2);
        let hit = pick_object(
            Vec2::new(10.0, 0.0),
            [
                PickCandidate {
                    entity: e[0],
                    center: Vec2::ZERO,
                    radius: 30.0,
                },
                PickCandidate {
                    entity: e[1],
                    center: Vec2::new(15.0, 0.0),
                    radius: 30.0,
                },
            ],
        )
        .unwrap();
        assert_eq!(hit.entity, e[1]);
    }

    #[test]
    fn distance_tie_prefers_larger_radius() {
        let e = entities(2);
        let hit = pick_object(
            Vec2::ZERO,
            [
                PickCandidate {
                    entity: e[0],
                    center: Vec2::new(5.0, 0.0),
                    radius: 20.0,
                },
                PickCandidate {
                    entity: e[1],
                    center: Vec2::new(-5.0, 0.0),
                    radius: 35.0,
                },
            ],
        )
        .unwrap();
        assert_eq!(hit.entity, e[1]);
    }

    #[test]
    fn full_tie_prefers_lower_entity_index() {
        let e = entities(2);
        let hit = pick_object(
            Vec2::ZERO,
            [
                PickCandidate {
                    entity: e[1],
                    center: Vec2::new(0.0, 5.0),
                    radius: 25.0,
                },
                PickCandidate {
                    entity: e[0],
                    center: Vec2::new(0.0, -5.0),
                    radius: 25.0,
                },
            ],
        )
        .unwrap();
        assert_eq!(hit.entity, e[0]);
    }

    #[test]
    fn scaled_radius_extends_the_hit_region() {
        let e = entities(1);
        // 30 base radius breathing at 1.2 -> reaches 36.
        let cand = PickCandidate {
            entity: e[0],
            center: Vec2::ZERO,
            radius: 36.0,
        };
        assert!(pick_object(Vec2::new(35.0, 0.0), [cand]).is_some());
        assert!(pick_object(Vec2::new(37.0, 0.0), [cand]).is_none());
    }
}
