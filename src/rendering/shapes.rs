//! Unit-sized meshes and materials for the five object kinds. Every mesh fits
//! a unit diameter so the spawn code scales children by the rolled object
//! size; targets get a white outline pass behind the body.

use bevy::ecs::system::EntityCommands;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use rand::Rng;

use crate::core::level::ObjectKind;

/// Bright palette for targets.
pub const TARGET_COLORS: [Color; 5] = [
    Color::srgb(1.0, 0.42, 0.42),   // red
    Color::srgb(0.31, 0.80, 0.77),  // green
    Color::srgb(0.27, 0.72, 0.82),  // blue
    Color::srgb(0.98, 0.79, 0.14),  // yellow
    Color::srgb(0.94, 0.58, 0.17),  // orange
];

/// Muted grays for distractors.
pub const DISTRACTOR_COLORS: [Color; 3] = [
    Color::srgb(0.58, 0.65, 0.65),
    Color::srgb(0.50, 0.55, 0.55),
    Color::srgb(0.74, 0.76, 0.78),
];

#[derive(Resource)]
pub struct ShapeAssets {
    star: Handle<Mesh>,
    balloon: Handle<Mesh>,
    heart: Handle<Mesh>,
    circle: Handle<Mesh>,
    triangle: Handle<Mesh>,
    string: Handle<Mesh>,
    target_materials: Vec<Handle<ColorMaterial>>,
    distractor_materials: Vec<Handle<ColorMaterial>>,
    outline_material: Handle<ColorMaterial>,
    string_material: Handle<ColorMaterial>,
}

impl ShapeAssets {
    pub fn mesh_for(&self, kind: ObjectKind) -> Handle<Mesh> {
        match kind {
            ObjectKind::Star => self.star.clone(),
            ObjectKind::Balloon => self.balloon.clone(),
            ObjectKind::Heart => self.heart.clone(),
            ObjectKind::Circle => self.circle.clone(),
            ObjectKind::Triangle => self.triangle.clone(),
        }
    }
}

pub struct ShapesPlugin;

impl Plugin for ShapesPlugin {
    fn build(&self, app: &mut App) {
        // Tests often run with only MinimalPlugins; ensure asset storages exist.
        if app.world().get_resource::<Assets<Mesh>>().is_none() {
            app.init_resource::<Assets<Mesh>>();
        }
        if app
            .world()
            .get_resource::<Assets<ColorMaterial>>()
            .is_none()
        {
            app.init_resource::<Assets<ColorMaterial>>();
        }
        app.add_systems(Startup, build_shape_assets);
    }
}

fn build_shape_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let target_materials = TARGET_COLORS.iter().map(|c| materials.add(*c)).collect();
    let distractor_materials = DISTRACTOR_COLORS.iter().map(|c| materials.add(*c)).collect();
    commands.insert_resource(ShapeAssets {
        star: meshes.add(star_mesh()),
        balloon: meshes.add(Ellipse::new(0.45, 0.5)),
        heart: meshes.add(heart_mesh()),
        circle: meshes.add(Circle::new(0.5)),
        triangle: meshes.add(RegularPolygon::new(0.5, 3)),
        string: meshes.add(Rectangle::new(0.06, 0.4)),
        target_materials,
        distractor_materials,
        outline_material: materials.add(Color::WHITE),
        string_material: materials.add(Color::srgb(0.1, 0.1, 0.1)),
    });
}

/// Spawn the visual children for one playfield object under `entity`.
pub fn attach_visuals(
    entity: &mut EntityCommands,
    shapes: &ShapeAssets,
    kind: ObjectKind,
    is_target: bool,
    size: f32,
    rng: &mut impl Rng,
) {
    let body_material = if is_target {
        shapes.target_materials[rng.gen_range(0..shapes.target_materials.len())].clone()
    } else {
        shapes.distractor_materials[rng.gen_range(0..shapes.distractor_materials.len())].clone()
    };
    let mesh = shapes.mesh_for(kind);
    let outline = is_target.then(|| (mesh.clone(), shapes.outline_material.clone()));
    let string = (kind == ObjectKind::Balloon)
        .then(|| (shapes.string.clone(), shapes.string_material.clone()));

    entity.with_children(|parent| {
        parent.spawn((
            Mesh2d(mesh),
            MeshMaterial2d(body_material),
            Transform::from_scale(Vec3::splat(size)),
        ));
        if let Some((mesh, material)) = outline {
            parent.spawn((
                Mesh2d(mesh),
                MeshMaterial2d(material),
                Transform::from_scale(Vec3::splat(size * 1.12))
                    .with_translation(Vec3::new(0.0, 0.0, -0.05)),
            ));
        }
        if let Some((mesh, material)) = string {
            parent.spawn((
                Mesh2d(mesh),
                MeshMaterial2d(material),
                Transform::from_scale(Vec3::splat(size))
                    .with_translation(Vec3::new(0.0, -0.65 * size, -0.02)),
            ));
        }
    });
}

/// Five-spike star as a triangle fan about the origin (unit diameter).
fn star_mesh() -> Mesh {
    const SPIKES: usize = 5;
    const OUTER: f32 = 0.5;
    const INNER: f32 = 0.2;

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(SPIKES * 2 + 1);
    positions.push([0.0, 0.0, 0.0]);
    for i in 0..SPIKES * 2 {
        // Start at the top spike and walk clockwise.
        let angle = std::f32::consts::FRAC_PI_2 - (i as f32 * std::f32::consts::PI) / SPIKES as f32;
        let r = if i % 2 == 0 { OUTER } else { INNER };
        positions.push([angle.cos() * r, angle.sin() * r, 0.0]);
    }
    fan_mesh(positions)
}

/// Classic parametric heart outline, normalized to a unit diameter. The fan
/// center sits inside both lobes, so center-fanning covers the full area.
fn heart_mesh() -> Mesh {
    const SEGMENTS: usize = 32;
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(SEGMENTS + 1);
    positions.push([0.0, 0.0, 0.0]);
    for i in 0..SEGMENTS {
        let t = i as f32 / SEGMENTS as f32 * std::f32::consts::TAU;
        let x = 16.0 * t.sin().powi(3);
        let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
        positions.push([x / 34.0, (y + 2.5) / 34.0, 0.0]);
    }
    fan_mesh(positions)
}

/// Triangle fan: positions[0] is the center, the rest the perimeter in order.
fn fan_mesh(positions: Vec<[f32; 3]>) -> Mesh {
    let n = positions.len() as u32;
    let normals = vec![[0.0, 0.0, 1.0]; positions.len()];
    let uvs: Vec<[f32; 2]> = positions
        .iter()
        .map(|p| [p[0] + 0.5, 0.5 - p[1]])
        .collect();
    let mut indices: Vec<u32> = Vec::with_capacity(((n - 1) * 3) as usize);
    for i in 1..n {
        let next = if i + 1 < n { i + 1 } else { 1 };
        indices.extend_from_slice(&[0, next, i]);
    }
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_fan_has_ten_perimeter_points() {
        let mesh = star_mesh();
        assert_eq!(mesh.count_vertices(), 11);
        match mesh.indices() {
            Some(Indices::U32(idx)) => assert_eq!(idx.len(), 30),
            other => panic!("unexpected indices: {other:?}"),
        }
    }

    #[test]
    fn shapes_fit_the_unit_diameter() {
        for mesh in [star_mesh(), heart_mesh()] {
            let Some(bevy::render::mesh::VertexAttributeValues::Float32x3(positions)) =
                mesh.attribute(Mesh::ATTRIBUTE_POSITION)
            else {
                panic!("positions missing");
            };
            for p in positions {
                assert!(p[0].abs() <= 0.5 + 1e-4, "x out of band: {p:?}");
                assert!(p[1].abs() <= 0.5 + 1e-4, "y out of band: {p:?}");
            }
        }
    }
}
