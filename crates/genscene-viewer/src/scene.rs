//! Scene environment - camera, lights, and fixed decorations
//!
//! The grid, ground plane, and starfield are constant across every
//! document; the lights and background color are re-derived whenever the
//! current document changes.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;
use genscene_core::{LightKind, SceneLight};
use tracing::warn;

use crate::app::{CameraSettings, CurrentScene};

/// Scene-unit light intensities map to Bevy's physical units through these
/// factors: an intensity of 0.5 gives the ambient/point levels the viewer
/// is tuned for, 1.0 the directional level.
const AMBIENT_BRIGHTNESS_SCALE: f32 = 400.0;
const DIRECTIONAL_ILLUMINANCE_SCALE: f32 = 5_000.0;
const POINT_INTENSITY_SCALE: f32 = 200_000.0;

/// Fallback when a document carries an unparseable background color
const DEFAULT_BACKGROUND: Color = Color::srgb(0.06, 0.06, 0.06);

/// Height of the ground plane and grid below the scene origin
const GROUND_HEIGHT: f32 = -2.0;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene).add_systems(
            Update,
            (update_camera, sync_lights, update_background),
        );
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Marker component for lights spawned from the current document
#[derive(Component)]
pub struct SceneLightEntity;

/// Marker component for grid lines
#[derive(Component)]
pub struct GridLine;

/// Parse a "#rrggbb" style color, which is how documents encode colors
pub fn parse_color(hex: &str) -> Option<Color> {
    Srgba::hex(hex).ok().map(Color::from)
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Camera - Y is up, matching the document coordinate system
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: 50_f32.to_radians(),
            near: 0.1,
            far: 1000.0,
            ..default()
        }),
        Transform::from_xyz(0.0, 2.0, 8.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
    ));

    // Ground plane, catches shadows from the directional light
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(60.0, 60.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.04, 0.04, 0.05),
            perceptual_roughness: 1.0,
            metallic: 0.0,
            ..default()
        })),
        Transform::from_translation(Vec3::new(0.0, GROUND_HEIGHT - 0.02, 0.0)),
    ));

    // Reference grid on the ground plane
    let grid_size = 15;
    let grid_spacing = 1.0;
    let grid_extent = grid_size as f32 * grid_spacing;
    let thickness = 0.02;

    let line_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.3, 0.3, 0.3, 0.5),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    let line_mesh_x = meshes.add(Cuboid::new(grid_extent * 2.0, thickness, thickness));
    let line_mesh_z = meshes.add(Cuboid::new(thickness, thickness, grid_extent * 2.0));

    // Lines along X (varying Z)
    for i in -grid_size..=grid_size {
        let z = i as f32 * grid_spacing;
        commands.spawn((
            Mesh3d(line_mesh_x.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_translation(Vec3::new(0.0, GROUND_HEIGHT, z)),
            GridLine,
        ));
    }

    // Lines along Z (varying X)
    for i in -grid_size..=grid_size {
        let x = i as f32 * grid_spacing;
        commands.spawn((
            Mesh3d(line_mesh_z.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_translation(Vec3::new(x, GROUND_HEIGHT, 0.0)),
            GridLine,
        ));
    }

    // Starfield backdrop
    commands.spawn((
        Mesh3d(meshes.add(starfield_mesh(5000, 100.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.85, 0.95),
            unlit: true,
            ..default()
        })),
        Transform::IDENTITY,
    ));
}

/// A dome of points surrounding the scene
fn starfield_mesh(count: usize, radius: f32) -> Mesh {
    let mut state: u32 = 0x9e37_79b9;
    let mut positions = Vec::with_capacity(count);
    for _ in 0..count {
        let u = lcg(&mut state);
        let v = lcg(&mut state);
        let w = lcg(&mut state);

        // Uniform direction on the sphere, depth jittered inward
        let y = 2.0 * u - 1.0;
        let theta = std::f32::consts::TAU * v;
        let ring = (1.0 - y * y).sqrt();
        let r = radius * (0.6 + 0.4 * w);
        positions.push([r * ring * theta.cos(), r * y, r * ring * theta.sin()]);
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::PointList,
        bevy::asset::RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh
}

fn lcg(state: &mut u32) -> f32 {
    *state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    (*state >> 8) as f32 / 16_777_216.0
}

/// Fold every ambient entry into the single scene-wide ambient term Bevy
/// supports: the first entry's color, intensities summed. An empty light
/// list gives a black scene, not an error.
fn fold_ambient(lights: &[SceneLight]) -> (Color, f32) {
    let mut color = None;
    let mut total = 0.0;
    for light in lights.iter().filter(|l| l.kind == LightKind::Ambient) {
        color.get_or_insert_with(|| parse_color(&light.color).unwrap_or(Color::WHITE));
        total += light.intensity;
    }
    (color.unwrap_or(Color::WHITE), total)
}

/// Rebuild light sources whenever the document changes
fn sync_lights(
    mut commands: Commands,
    scene: Res<CurrentScene>,
    mut ambient: ResMut<AmbientLight>,
    existing: Query<Entity, With<SceneLightEntity>>,
) {
    if !scene.is_changed() {
        return;
    }

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let (ambient_color, ambient_total) = fold_ambient(&scene.0.lights);
    ambient.color = ambient_color;
    ambient.brightness = ambient_total * AMBIENT_BRIGHTNESS_SCALE;

    for (index, light) in scene.0.lights.iter().enumerate() {
        let color = parse_color(&light.color).unwrap_or(Color::WHITE);
        match light.kind {
            // Already folded into the ambient resource above
            LightKind::Ambient => {}
            LightKind::Directional => {
                let Some(position) = light.position else {
                    warn!(index, "Directional light has no position, skipping");
                    continue;
                };
                commands.spawn((
                    DirectionalLight {
                        illuminance: light.intensity * DIRECTIONAL_ILLUMINANCE_SCALE,
                        color,
                        shadows_enabled: true,
                        ..default()
                    },
                    Transform::from_translation(Vec3::from_array(position))
                        .looking_at(Vec3::ZERO, Vec3::Y),
                    SceneLightEntity,
                ));
            }
            LightKind::Point => {
                let Some(position) = light.position else {
                    warn!(index, "Point light has no position, skipping");
                    continue;
                };
                commands.spawn((
                    PointLight {
                        intensity: light.intensity * POINT_INTENSITY_SCALE,
                        color,
                        shadows_enabled: false,
                        ..default()
                    },
                    Transform::from_translation(Vec3::from_array(position)),
                    SceneLightEntity,
                ));
            }
        }
    }
}

/// Apply the document's background color to the clear color
fn update_background(scene: Res<CurrentScene>, mut clear_color: ResMut<ClearColor>) {
    if !scene.is_changed() {
        return;
    }

    clear_color.0 = parse_color(&scene.0.background_color).unwrap_or_else(|| {
        warn!(
            color = %scene.0.background_color,
            "Invalid background color, using default"
        );
        DEFAULT_BACKGROUND
    });
}

/// Orbit/pan/zoom camera control
fn update_camera(
    mut camera_query: Query<&mut Transform, With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut mouse_wheel: EventReader<MouseWheel>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    mut contexts: bevy_egui::EguiContexts,
) {
    // Don't fight the UI for the pointer
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input())
        .unwrap_or(false);

    let mut total_motion = Vec2::ZERO;
    for motion in mouse_motion.read() {
        total_motion += motion.delta;
    }

    // Orbit with left mouse drag
    if mouse_button.pressed(MouseButton::Left) && !egui_wants_pointer {
        settings.azimuth -= total_motion.x * settings.sensitivity;
        settings.elevation =
            (settings.elevation + total_motion.y * settings.sensitivity).clamp(-1.5, 1.5);
    }

    // Pan with right mouse drag in the view plane
    if mouse_button.pressed(MouseButton::Right) && !egui_wants_pointer {
        let right = Vec3::new(settings.azimuth.cos(), 0.0, -settings.azimuth.sin());
        let up = Vec3::Y;
        let pan_speed = settings.distance * 0.002;
        settings.target_focus -= right * total_motion.x * pan_speed;
        settings.target_focus += up * total_motion.y * pan_speed;
    }

    // Zoom with scroll
    if !egui_wants_pointer {
        for scroll in mouse_wheel.read() {
            let zoom_factor = 1.0 - scroll.y * settings.zoom_speed * 0.3;
            settings.target_distance = (settings.target_distance * zoom_factor).clamp(1.0, 60.0);
        }
    } else {
        // Consume scroll so it doesn't accumulate while over the UI
        for _ in mouse_wheel.read() {}
    }

    // Smooth interpolation for zoom and re-centering
    let dt = time.delta_secs();
    let lerp_factor = 1.0 - (-settings.smooth_factor * 60.0 * dt).exp();
    settings.distance += (settings.target_distance - settings.distance) * lerp_factor;
    settings.target = settings.target + (settings.target_focus - settings.target) * lerp_factor;

    // Spherical coordinates with Y up
    if let Ok(mut transform) = camera_query.single_mut() {
        let x = settings.distance * settings.azimuth.sin() * settings.elevation.cos();
        let y = settings.distance * settings.elevation.sin();
        let z = settings.distance * settings.azimuth.cos() * settings.elevation.cos();

        transform.translation = settings.target + Vec3::new(x, y, z);
        transform.look_at(settings.target, Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        let color = parse_color("#ff0000").unwrap();
        let srgba = Srgba::from(color);
        assert!((srgba.red - 1.0).abs() < 1e-5);
        assert!(srgba.green.abs() < 1e-5);

        assert!(parse_color("not-a-color").is_none());
        assert!(parse_color("").is_none());
    }

    #[test]
    fn test_fold_ambient_empty_lights() {
        let (color, total) = fold_ambient(&[]);
        assert_eq!(color, Color::WHITE);
        assert_eq!(total, 0.0);
    }

    #[test]
    fn test_fold_ambient_sums_intensities() {
        let lights = vec![
            SceneLight {
                kind: LightKind::Ambient,
                color: "#ff0000".to_string(),
                intensity: 0.5,
                position: None,
            },
            SceneLight {
                kind: LightKind::Directional,
                color: "#ffffff".to_string(),
                intensity: 1.0,
                position: Some([5.0, 5.0, 5.0]),
            },
            SceneLight {
                kind: LightKind::Ambient,
                color: "#00ff00".to_string(),
                intensity: 0.25,
                position: None,
            },
        ];

        let (color, total) = fold_ambient(&lights);
        // First ambient entry wins the color; directional does not count
        assert_eq!(color, parse_color("#ff0000").unwrap());
        assert!((total - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_starfield_mesh_point_count() {
        let mesh = starfield_mesh(512, 100.0);
        assert_eq!(mesh.primitive_topology(), PrimitiveTopology::PointList);
        assert_eq!(mesh.count_vertices(), 512);
    }
}
