//! Progress report: aggregate stats plus one line per played level.

use bevy::prelude::*;

use super::state::AppState;
use crate::core::config::GameConfig;
use crate::core::level::LevelLibrary;
use crate::persistence::ProgressStore;

#[derive(Component)]
struct ProgressUiRoot;

#[derive(Component)]
struct BackButton;

pub struct ProgressScreenPlugin;

impl Plugin for ProgressScreenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Progress), spawn_progress_ui)
            .add_systems(
                Update,
                (handle_back_button, handle_keys).run_if(in_state(AppState::Progress)),
            )
            .add_systems(OnExit(AppState::Progress), despawn_progress_ui);
    }
}

fn spawn_progress_ui(
    mut commands: Commands,
    store: Option<Res<ProgressStore>>,
    library: Option<Res<LevelLibrary>>,
    cfg: Res<GameConfig>,
) {
    let level_count = library.as_deref().map(|l| l.levels.len()).unwrap_or(0);
    commands
        .spawn((
            ProgressUiRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::FlexStart,
                padding: UiRect::all(Val::Px(40.0)),
                row_gap: Val::Px(8.0),
                ..default()
            },
        ))
        .with_children(|page| {
            page.spawn((
                Text::new("Progress Report"),
                TextFont {
                    font_size: 42.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));

            let Some(store) = store.as_deref() else {
                page.spawn((
                    Text::new("No progress recorded yet."),
                    TextFont {
                        font_size: 20.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
                return;
            };

            for line in [
                format!("Total Sessions: {}", store.total_sessions()),
                format!("Average Accuracy: {:.0}%", store.average_accuracy()),
                format!(
                    "Levels Completed: {}/{}",
                    store.levels_completed(cfg.unlock.accuracy_threshold),
                    level_count
                ),
            ] {
                page.spawn((
                    Text::new(line),
                    TextFont {
                        font_size: 24.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            }

            page.spawn((
                Text::new("Level Progress:"),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));

            let mut entries: Vec<_> = store.progress.iter().collect();
            entries.sort_by_key(|p| p.level);
            for p in entries {
                page.spawn((
                    Text::new(format!(
                        "Level {}: {:.0}% accuracy, {:.0} ms reaction, played {}x",
                        p.level, p.best_accuracy, p.best_reaction_ms, p.times_played
                    )),
                    TextFont {
                        font_size: 17.0,
                        ..default()
                    },
                    TextColor(Color::WHITE),
                ));
            }

            page.spawn((
                BackButton,
                Button,
                Node {
                    width: Val::Px(110.0),
                    height: Val::Px(40.0),
                    margin: UiRect::top(Val::Px(24.0)),
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

fn handle_keys(keys: Res<ButtonInput<KeyCode>>, mut next_state: ResMut<NextState<AppState>>) {
    if keys.just_pressed(KeyCode::Escape) {
        next_state.set(AppState::MainMenu);
    }
}

fn despawn_progress_ui(mut commands: Commands, q_root: Query<Entity, With<ProgressUiRoot>>) {
    for e in &q_root {
        commands.entity(e).despawn();
    }
}
