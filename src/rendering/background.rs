//! Gameplay backdrop: a full-screen quad running a small gradient + dot-grid
//! shader. The dot grid scrolls at the level's `background_speed`.

use bevy::prelude::*;
use bevy::render::render_resource::{AsBindGroup, ShaderRef, ShaderType};
use bevy::sprite::{Material2d, Material2dPlugin};
use bevy::window::WindowResized;

use crate::app::state::{AppState, GameplayState};
use crate::gameplay::session::ActiveLevel;

#[derive(Clone, Copy, ShaderType, Debug)]
struct BgData {
    window_size: Vec2,
    scroll: f32,
    dot_spacing: f32,
    top: Vec4,
    bottom: Vec4,
}

impl Default for BgData {
    fn default() -> Self {
        Self {
            window_size: Vec2::new(1200.0, 800.0),
            scroll: 0.0,
            dot_spacing: 50.0,
            // Periwinkle fading into purple.
            top: Vec4::new(0.40, 0.49, 0.92, 1.0),
            bottom: Vec4::new(0.46, 0.29, 0.64, 1.0),
        }
    }
}

#[derive(Asset, AsBindGroup, TypePath, Debug, Clone, Default)]
struct BgMaterial {
    #[uniform(0)]
    data: BgData,
}

impl Material2d for BgMaterial {
    fn fragment_shader() -> ShaderRef {
        "shaders/background.wgsl".into()
    }
}

#[derive(Component)]
struct BackgroundQuad;

#[derive(Resource)]
struct BackgroundMaterialHandle(Handle<BgMaterial>);

pub struct BackgroundPlugin;

impl Plugin for BackgroundPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(Material2dPlugin::<BgMaterial>::default())
            .add_systems(OnEnter(AppState::Gameplay), spawn_background)
            .add_systems(OnExit(AppState::Gameplay), despawn_background)
            .add_systems(
                Update,
                (
                    scroll_background.run_if(
                        in_state(AppState::Gameplay)
                            .and(in_state(GameplayState::Running))
                            .and(resource_exists::<ActiveLevel>),
                    ),
                    fit_background_to_window.run_if(in_state(AppState::Gameplay)),
                ),
            );
    }
}

fn spawn_background(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<BgMaterial>>,
    windows: Query<&Window>,
) {
    let (w, h) = windows
        .single()
        .map(|win| (win.width(), win.height()))
        .unwrap_or((1200.0, 800.0));
    let material = materials.add(BgMaterial {
        data: BgData {
            window_size: Vec2::new(w, h),
            ..default()
        },
    });
    commands.spawn((
        BackgroundQuad,
        Mesh2d(meshes.add(Rectangle::new(1.0, 1.0))),
        MeshMaterial2d(material.clone()),
        Transform::from_translation(Vec3::new(0.0, 0.0, -10.0))
            .with_scale(Vec3::new(w, h, 1.0)),
    ));
    commands.insert_resource(BackgroundMaterialHandle(material));
}

fn despawn_background(mut commands: Commands, q: Query<Entity, With<BackgroundQuad>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
    commands.remove_resource::<BackgroundMaterialHandle>();
}

fn scroll_background(
    time: Res<Time>,
    level: Res<ActiveLevel>,
    handle: Option<Res<BackgroundMaterialHandle>>,
    mut materials: ResMut<Assets<BgMaterial>>,
) {
    let Some(handle) = handle else { return };
    if let Some(material) = materials.get_mut(&handle.0) {
        material.data.scroll += level.background_speed * time.delta_secs();
    }
}

fn fit_background_to_window(
    mut resized: EventReader<WindowResized>,
    handle: Option<Res<BackgroundMaterialHandle>>,
    mut materials: ResMut<Assets<BgMaterial>>,
    mut q: Query<&mut Transform, With<BackgroundQuad>>,
) {
    let Some(event) = resized.read().last() else {
        return;
    };
    for mut tf in q.iter_mut() {
        tf.scale = Vec3::new(event.width, event.height, 1.0);
    }
    if let Some(handle) = handle {
        if let Some(material) = materials.get_mut(&handle.0) {
            material.data.window_size = Vec2::new(event.width, event.height);
        }
    }
}
