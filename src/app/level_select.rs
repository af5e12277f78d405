//! Level select: one card per library entry with lock state and best
//! accuracy. Unlocked cards start a session by pointer or number key.

use bevy::prelude::*;

use super::state::AppState;
use crate::core::config::GameConfig;
use crate::core::level::LevelLibrary;
use crate::gameplay::session::PendingLevel;
use crate::persistence::ProgressStore;

#[derive(Component)]
struct LevelSelectUiRoot;

#[derive(Component, Clone, Copy)]
struct LevelButton {
    number: u32,
    unlocked: bool,
}

#[derive(Component)]
struct BackButton;

pub struct LevelSelectPlugin;

impl Plugin for LevelSelectPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::LevelSelect), spawn_level_grid)
            .add_systems(
                Update,
                (handle_level_buttons, handle_back_button, handle_select_keys)
                    .run_if(in_state(AppState::LevelSelect)),
            )
            .add_systems(OnExit(AppState::LevelSelect), despawn_level_grid);
    }
}

fn spawn_level_grid(
    mut commands: Commands,
    library: Option<Res<LevelLibrary>>,
    store: Option<Res<ProgressStore>>,
    cfg: Res<GameConfig>,
) {
    let root = commands
        .spawn((
            LevelSelectUiRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                padding: UiRect::all(Val::Px(24.0)),
                row_gap: Val::Px(20.0),
                ..default()
            },
        ))
        .id();

    commands.entity(root).with_children(|page| {
        page.spawn((
            Text::new("Select Level"),
            TextFont {
                font_size: 42.0,
                ..default()
            },
            TextColor(Color::WHITE),
        ));

        let Some(library) = library.as_deref() else {
            warn!(target: "menu", "level library missing; nothing to select");
            page.spawn((
                Text::new("No levels available"),
                TextFont {
                    font_size: 22.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            return;
        };

        page.spawn(Node {
            flex_direction: FlexDirection::Row,
            flex_wrap: FlexWrap::Wrap,
            justify_content: JustifyContent::Center,
            column_gap: Val::Px(16.0),
            row_gap: Val::Px(16.0),
            max_width: Val::Px(1160.0),
            ..default()
        })
        .with_children(|grid| {
            for level in &library.levels {
                let unlocked = store
                    .as_deref()
                    .map(|s| s.is_unlocked(level.number, cfg.unlock.accuracy_threshold))
                    .unwrap_or(level.number == 1);
                let stats_line = store
                    .as_deref()
                    .and_then(|s| s.level_progress(level.number))
                    .map(|p| {
                        format!(
                            "Best: {:.0}%  {:.0} ms  ({}x)",
                            p.best_accuracy, p.best_reaction_ms, p.times_played
                        )
                    });

                grid.spawn((
                    LevelButton {
                        number: level.number,
                        unlocked,
                    },
                    Button,
                    Node {
                        width: Val::Px(210.0),
                        height: Val::Px(124.0),
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(10.0)),
                        row_gap: Val::Px(4.0),
                        ..default()
                    },
                    BackgroundColor(if unlocked {
                        Color::WHITE
                    } else {
                        Color::srgb(0.58, 0.65, 0.65)
                    }),
                ))
                .with_children(|card| {
                    card.spawn((
                        Text::new(format!("Level {}", level.number)),
                        TextFont {
                            font_size: 22.0,
                            ..default()
                        },
                        TextColor(Color::BLACK),
                    ));
                    card.spawn((
                        Text::new(level.name.clone()),
                        TextFont {
                            font_size: 16.0,
                            ..default()
                        },
                        TextColor(Color::BLACK),
                    ));
                    card.spawn((
                        Text::new(truncate(&level.description, 28)),
                        TextFont {
                            font_size: 13.0,
                            ..default()
                        },
                        TextColor(Color::BLACK),
                    ));
                    card.spawn((
                        Text::new(stats_line.unwrap_or_else(|| {
                            if unlocked { String::new() } else { "Locked".into() }
                        })),
                        TextFont {
                            font_size: 13.0,
                            ..default()
                        },
                        TextColor(Color::BLACK),
                    ));
                });
            }
        });

        page.spawn((
            BackButton,
            Button,
            Node {
                width: Val::Px(110.0),
                height: Val::Px(40.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::WHITE),
        ))
        .with_children(|b| {
            b.spawn((
                Text::new("Back"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::BLACK),
            ));
        });
    });
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}

#[allow(clippy::type_complexity)]
fn handle_level_buttons(
    mut commands: Commands,
    q: Query<(&Interaction, &LevelButton), (Changed<Interaction>, With<Button>)>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for (interaction, button) in &q {
        if *interaction != Interaction::Pressed {
            continue;
        }
        if !button.unlocked {
            debug!(target: "menu", "level {} still locked", button.number);
            continue;
        }
        info!(target: "menu", "selected level {}", button.number);
        // Insert pending level BEFORE the state transition (race-free).
        commands.insert_resource(PendingLevel {
            number: button.number,
        });
        next_state.set(AppState::Gameplay);
        break;
    }
}

#[allow(clippy::type_complexity)]
fn handle_back_button(
    q: Query<&Interaction, (Changed<Interaction>, With<BackButton>, With<Button>)>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for interaction in &q {
        if *interaction == Interaction::Pressed {
            next_state.set(AppState::MainMenu);
        }
    }
}

fn handle_select_keys(
    mut commands: Commands,
    keys: Res<ButtonInput<KeyCode>>,
    library: Option<Res<LevelLibrary>>,
    store: Option<Res<ProgressStore>>,
    cfg: Res<GameConfig>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        next_state.set(AppState::MainMenu);
        return;
    }
    let Some(library) = library else { return };
    for (i, level) in library.levels.iter().enumerate() {
        // Digit1..Digit9 then Digit0 for level 10.
        let keycode = match i {
            0 => KeyCode::Digit1,
            1 => KeyCode::Digit2,
            2 => KeyCode::Digit3,
            3 => KeyCode::Digit4,
            4 => KeyCode::Digit5,
            5 => KeyCode::Digit6,
            6 => KeyCode::Digit7,
            7 => KeyCode::Digit8,
            8 => KeyCode::Digit9,
            9 => KeyCode::Digit0,
            _ => break,
        };
        if keys.just_pressed(keycode) {
            let unlocked = store
                .as_deref()
                .map(|s| s.is_unlocked(level.number, cfg.unlock.accuracy_threshold))
                .unwrap_or(level.number == 1);
            if !unlocked {
                info!(target: "menu", "level {} is locked", level.number);
                break;
            }
            info!(target: "menu", "selected level {} by key", level.number);
            commands.insert_resource(PendingLevel {
                number: level.number,
            });
            next_state.set(AppState::Gameplay);
            break;
        }
    }
}

fn despawn_level_grid(mut commands: Commands, q_root: Query<Entity, With<LevelSelectUiRoot>>) {
    for e in &q_root {
        commands.entity(e).despawn();
    }
}
