//! Main menu: title card plus Start / View Progress actions, usable by
//! pointer or keyboard.

use bevy::prelude::*;

use super::state::AppState;

#[derive(Component)]
struct MenuUiRoot;

#[derive(Component, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    StartGame,
    ViewProgress,
}

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::MainMenu), spawn_menu_ui)
            .add_systems(
                Update,
                (handle_menu_buttons, handle_menu_keys).run_if(in_state(AppState::MainMenu)),
            )
            .add_systems(OnExit(AppState::MainMenu), despawn_menu_ui);
    }
}

fn spawn_menu_ui(mut commands: Commands) {
    commands
        .spawn((
            MenuUiRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(14.0),
                ..default()
            },
        ))
        .with_children(|root| {
            root.spawn((
                Text::new("Focus Catcher"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            root.spawn((
                Text::new("Visual Attention Game"),
                TextFont {
                    font_size: 28.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            root.spawn((
                Text::new("Improve focus and impulse control"),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            for (label, action) in [
                ("Start Game", MenuAction::StartGame),
                ("View Progress", MenuAction::ViewProgress),
            ] {
                root.spawn((
                    action,
                    Button,
                    Node {
                        width: Val::Px(220.0),
                        height: Val::Px(52.0),
                        margin: UiRect::top(Val::Px(action_gap(action))),
                        justify_content: JustifyContent::Center,
                        align_items: AlignItems::Center,
                        ..default()
                    },
                    BackgroundColor(Color::WHITE),
                ))
                .with_children(|b| {
                    b.spawn((
                        Text::new(label),
                        TextFont {
                            font_size: 24.0,
                            ..default()
                        },
                        TextColor(Color::BLACK),
                    ));
                });
            }
        });
}

fn action_gap(action: MenuAction) -> f32 {
    if action == MenuAction::StartGame {
        40.0
    } else {
        0.0
    }
}

#[allow(clippy::type_complexity)]
fn handle_menu_buttons(
    q: Query<(&Interaction, &MenuAction), (Changed<Interaction>, With<Button>)>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    for (interaction, action) in &q {
        if *interaction != Interaction::Pressed {
            continue;
        }
        match action {
            MenuAction::StartGame => next_state.set(AppState::LevelSelect),
            MenuAction::ViewProgress => next_state.set(AppState::Progress),
        }
    }
}

fn handle_menu_keys(keys: Res<ButtonInput<KeyCode>>, mut next_state: ResMut<NextState<AppState>>) {
    if keys.just_pressed(KeyCode::Enter) {
        next_state.set(AppState::LevelSelect);
    } else if keys.just_pressed(KeyCode::KeyP) {
        next_state.set(AppState::Progress);
    }
}

fn despawn_menu_ui(mut commands: Commands, q_root: Query<Entity, With<MenuUiRoot>>) {
    for e in &q_root {
        commands.entity(e).despawn();
    }
}
