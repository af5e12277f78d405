//! In-game top bar: level name, score, hit progress, lives, running accuracy,
//! the target reminder, and the pause button.

use bevy::prelude::*;

use crate::app::state::{AppState, GameplayState};
use crate::core::system_order::{InputSet, UiButtonSet};
use crate::gameplay::session::{ActiveLevel, GameSession};
use crate::interaction::tap::TapConsumed;

#[derive(Component)]
struct HudRoot;
#[derive(Component)]
struct HudLevelText;
#[derive(Component)]
struct HudScoreText;
#[derive(Component)]
struct HudProgressText;
#[derive(Component)]
struct HudAccuracyText;
#[derive(Component)]
struct HudTargetText;
#[derive(Component)]
struct LifePip(u32);
#[derive(Component)]
struct PauseButton;

const PIP_FILLED: Color = Color::srgb(1.0, 0.42, 0.42);
const PIP_EMPTY: Color = Color::srgb(0.58, 0.65, 0.65);

pub struct HudPlugin;

impl Plugin for HudPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TapConsumed>().add_systems(
            Update,
            (
                // Session resources land via commands after OnEnter runs, so
                // the bar is built on the first Update frame instead.
                ensure_hud.run_if(
                    in_state(AppState::Gameplay)
                        .and(resource_exists::<GameSession>)
                        .and(resource_exists::<ActiveLevel>)
                        .and(|q: Query<(), With<HudRoot>>| q.is_empty()),
                ),
                (refresh_hud_texts, refresh_life_pips)
                    .run_if(in_state(AppState::Gameplay).and(resource_exists::<GameSession>)),
                handle_pause_button
                    .in_set(InputSet)
                    .in_set(UiButtonSet)
                    .run_if(
                        in_state(AppState::Gameplay).and(in_state(GameplayState::Running)),
                    ),
            ),
        )
        .add_systems(OnExit(AppState::Gameplay), despawn_hud);
    }
}

fn ensure_hud(mut commands: Commands, level: Res<ActiveLevel>) {
    let root = commands
        .spawn((
            HudRoot,
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(0.0),
                left: Val::Px(0.0),
                width: Val::Percent(100.0),
                height: Val::Px(64.0),
                flex_direction: FlexDirection::Row,
                justify_content: JustifyContent::SpaceBetween,
                align_items: AlignItems::Center,
                padding: UiRect::horizontal(Val::Px(16.0)),
                column_gap: Val::Px(18.0),
                ..default()
            },
            BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.8)),
        ))
        .id();

    commands.entity(root).with_children(|bar| {
        bar.spawn((
            HudLevelText,
            Text::new(format!("Level {}: {}", level.number, level.name)),
            TextFont {
                font_size: 22.0,
                ..default()
            },
            TextColor(Color::BLACK),
        ));
        bar.spawn((
            HudScoreText,
            Text::new("Score: 0"),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(Color::BLACK),
        ));
        bar.spawn((
            HudProgressText,
            Text::new(format!("Progress: 0/{}", level.required_hits)),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(Color::BLACK),
        ));
        bar.spawn((
            HudAccuracyText,
            Text::new("Accuracy: 0%"),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(Color::BLACK),
        ));
        bar.spawn((
            HudTargetText,
            Text::new(format!("Tap: {}", level.target.plural_label())),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(Color::BLACK),
        ));
        bar.spawn(Node {
            flex_direction: FlexDirection::Row,
            column_gap: Val::Px(6.0),
            ..default()
        })
        .with_children(|pips| {
            for i in 0..level.allowed_misses {
                pips.spawn((
                    LifePip(i),
                    Node {
                        width: Val::Px(16.0),
                        height: Val::Px(16.0),
                        ..default()
                    },
                    BorderRadius::all(Val::Px(8.0)),
                    BackgroundColor(PIP_FILLED),
                ));
            }
        });
        bar.spawn((
            PauseButton,
            Button,
            Node {
                width: Val::Px(72.0),
                height: Val::Px(32.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::WHITE),
        ))
        .with_children(|b| {
            b.spawn((
                Text::new("Pause"),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::BLACK),
            ));
        });
    });
}

fn set_text_if_changed(text: &mut Text, value: String) {
    if text.as_str() != value {
        *text = Text::new(value);
    }
}

#[allow(clippy::type_complexity)]
fn refresh_hud_texts(
    session: Res<GameSession>,
    level: Res<ActiveLevel>,
    mut q_score: Query<
        &mut Text,
        (
            With<HudScoreText>,
            Without<HudProgressText>,
            Without<HudAccuracyText>,
        ),
    >,
    mut q_progress: Query<
        &mut Text,
        (
            With<HudProgressText>,
            Without<HudScoreText>,
            Without<HudAccuracyText>,
        ),
    >,
    mut q_accuracy: Query<
        &mut Text,
        (
            With<HudAccuracyText>,
            Without<HudScoreText>,
            Without<HudProgressText>,
        ),
    >,
) {
    if let Ok(mut text) = q_score.single_mut() {
        set_text_if_changed(&mut text, format!("Score: {}", session.score));
    }
    if let Ok(mut text) = q_progress.single_mut() {
        set_text_if_changed(
            &mut text,
            format!("Progress: {}/{}", session.correct, level.required_hits),
        );
    }
    if let Ok(mut text) = q_accuracy.single_mut() {
        set_text_if_changed(
            &mut text,
            format!("Accuracy: {:.0}%", session.accuracy()),
        );
    }
}

fn refresh_life_pips(
    session: Res<GameSession>,
    mut q_pips: Query<(&LifePip, &mut BackgroundColor)>,
) {
    for (pip, mut color) in q_pips.iter_mut() {
        let filled = pip.0 < session.lives;
        let wanted = if filled { PIP_FILLED } else { PIP_EMPTY };
        if color.0 != wanted {
            color.0 = wanted;
        }
    }
}

#[allow(clippy::type_complexity)]
fn handle_pause_button(
    q: Query<&Interaction, (Changed<Interaction>, With<PauseButton>, With<Button>)>,
    mut consumed: ResMut<TapConsumed>,
    mut next_gameplay: ResMut<NextState<GameplayState>>,
) {
    for interaction in &q {
        if *interaction == Interaction::Pressed {
            consumed.0 = true;
            next_gameplay.set(GameplayState::Paused);
        }
    }
}

fn despawn_hud(mut commands: Commands, q: Query<Entity, With<HudRoot>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
