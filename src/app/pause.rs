//! Pause handling. Entering `Paused` freezes the virtual clock, which stops
//! the fixed-timestep gameplay schedule, object lifespans, the session timer
//! and reaction-time measurement all at once.

use bevy::prelude::*;

use super::state::{AppState, GameplayState};
use crate::core::system_order::{InputSet, UiButtonSet};
use crate::interaction::tap::TapConsumed;

#[derive(Component)]
struct PauseOverlayRoot;

#[derive(Component)]
struct ResumeButton;

pub struct PausePlugin;

impl Plugin for PausePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TapConsumed>()
            .add_systems(Update, toggle_pause_key.run_if(in_state(AppState::Gameplay)))
            .add_systems(
                Update,
                handle_resume_button
                    .in_set(InputSet)
                    .in_set(UiButtonSet)
                    .run_if(in_state(AppState::Gameplay).and(in_state(GameplayState::Paused))),
            )
            .add_systems(OnEnter(GameplayState::Paused), enter_pause)
            .add_systems(OnExit(GameplayState::Paused), exit_pause)
            .add_systems(OnExit(AppState::Gameplay), reset_gameplay_state);
    }
}

fn toggle_pause_key(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameplayState>>,
    mut next_state: ResMut<NextState<GameplayState>>,
) {
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }
    match state.get() {
        GameplayState::Running => next_state.set(GameplayState::Paused),
        GameplayState::Paused => next_state.set(GameplayState::Running),
    }
}

fn enter_pause(mut commands: Commands, mut time: ResMut<Time<Virtual>>) {
    time.pause();
    info!(target: "session", "paused");

    commands
        .spawn((
            PauseOverlayRoot,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
        ))
        .with_children(|overlay| {
            overlay
                .spawn((
                    Node {
                        width: Val::Px(400.0),
                        height: Val::Px(200.0),
                        flex_direction: FlexDirection::Column,
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(20.0),
                        ..default()
                    },
                    BackgroundColor(Color::WHITE),
                ))
                .with_children(|dialog| {
                    dialog.spawn((
                        Text::new("Game Paused"),
                        TextFont {
                            font_size: 36.0,
                            ..default()
                        },
                        TextColor(Color::BLACK),
                    ));
                    dialog
                        .spawn((
                            ResumeButton,
                            Button,
                            Node {
                                width: Val::Px(160.0),
                                height: Val::Px(44.0),
                                justify_content: JustifyContent::Center,
                                align_items: AlignItems::Center,
                                ..default()
                            },
                            BackgroundColor(Color::srgb(0.31, 0.80, 0.77)),
                        ))
                        .with_children(|b| {
                            b.spawn((
                                Text::new("Resume"),
                                TextFont {
                                    font_size: 22.0,
                                    ..default()
                                },
                                TextColor(Color::WHITE),
                            ));
                        });
                });
        });
}

fn exit_pause(
    mut commands: Commands,
    mut time: ResMut<Time<Virtual>>,
    q: Query<Entity, With<PauseOverlayRoot>>,
) {
    time.unpause();
    info!(target: "session", "resumed");
    for e in &q {
        commands.entity(e).despawn();
    }
}

#[allow(clippy::type_complexity)]
fn handle_resume_button(
    q: Query<&Interaction, (Changed<Interaction>, With<ResumeButton>, With<Button>)>,
    mut consumed: ResMut<TapConsumed>,
    mut next_state: ResMut<NextState<GameplayState>>,
) {
    for interaction in &q {
        if *interaction == Interaction::Pressed {
            consumed.0 = true;
            next_state.set(GameplayState::Running);
        }
    }
}

/// Leaving gameplay while paused must never leak a frozen clock.
fn reset_gameplay_state(
    mut time: ResMut<Time<Virtual>>,
    mut next_state: ResMut<NextState<GameplayState>>,
) {
    time.unpause();
    next_state.set(GameplayState::Running);
}
