//! Document objects - meshes, materials, animation, and hover highlighting
//!
//! Each object entry in the current document maps to one entity keyed by
//! its id. When the document changes, entities whose entry is unchanged
//! are kept as-is; removed ids are despawned and new ids spawned, so
//! unrelated updates never rebuild a mesh.

use bevy::asset::embedded_asset;
use bevy::pbr::wireframe::{Wireframe, WireframeColor, WireframePlugin};
use bevy::prelude::*;
use bevy::render::mesh::{Indices, MeshBuilder};
use bevy::render::render_resource::{AsBindGroup, PrimitiveTopology, ShaderRef};
use bevy_picking::hover::PickingInteraction;
use bevy_picking::Pickable;
use genscene_core::{animate, MaterialKind, SceneObject, ShapeKind};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::app::CurrentScene;
use crate::scene::parse_color;

/// Fallback when an object carries an unparseable color
const FALLBACK_OBJECT_COLOR: Color = Color::srgb(0.8, 0.8, 0.8);

pub struct ObjectsPlugin;

impl Plugin for ObjectsPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "normal.wgsl");
        app.add_plugins(MaterialPlugin::<NormalMaterial>::default())
            .add_plugins(WireframePlugin::default())
            .add_systems(
                Update,
                (sync_objects, animate_objects, update_hover_highlight),
            );
    }
}

/// Marker component for entities spawned from document objects
#[derive(Component)]
pub struct SceneObjectEntity {
    /// The document entry this entity was built from
    pub object: SceneObject,
}

/// Shades by surface normal direction; no uniforms needed
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone, Default)]
pub struct NormalMaterial {}

impl Material for NormalMaterial {
    fn fragment_shader() -> ShaderRef {
        "embedded://genscene_viewer/normal.wgsl".into()
    }
}

/// Ids whose existing entity can be kept for the new object list: present
/// with a field-for-field identical entry. Everything else is despawned
/// and respawned.
fn reusable_ids(existing: &[SceneObject], objects: &[SceneObject]) -> HashSet<String> {
    let wanted: HashMap<&str, &SceneObject> = objects
        .iter()
        .map(|object| (object.id.as_str(), object))
        .collect();
    existing
        .iter()
        .filter(|spawned| {
            wanted
                .get(spawned.id.as_str())
                .is_some_and(|object| *object == *spawned)
        })
        .map(|spawned| spawned.id.clone())
        .collect()
}

/// Rebuild object entities whenever the document changes
fn sync_objects(
    mut commands: Commands,
    scene: Res<CurrentScene>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut normal_materials: ResMut<Assets<NormalMaterial>>,
    existing: Query<(Entity, &SceneObjectEntity)>,
) {
    if !scene.is_changed() {
        return;
    }

    let current: Vec<SceneObject> = existing
        .iter()
        .map(|(_, spawned)| spawned.object.clone())
        .collect();
    let keep = reusable_ids(&current, &scene.0.objects);

    for (entity, spawned) in existing.iter() {
        if !keep.contains(&spawned.object.id) {
            commands.entity(entity).despawn();
        }
    }

    for object in &scene.0.objects {
        if keep.contains(&object.id) {
            continue;
        }
        spawn_object(
            &mut commands,
            object,
            &mut meshes,
            &mut materials,
            &mut normal_materials,
        );
    }

    debug!(
        objects = scene.0.objects.len(),
        reused = keep.len(),
        "Scene objects synchronized"
    );
}

fn spawn_object(
    commands: &mut Commands,
    object: &SceneObject,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    normal_materials: &mut Assets<NormalMaterial>,
) {
    let color = object_color(object);
    let mut entity = commands.spawn((
        Mesh3d(meshes.add(shape_mesh(object.shape))),
        base_transform(object),
        SceneObjectEntity {
            object: object.clone(),
        },
        Pickable::default(),
        PickingInteraction::default(),
    ));

    match object.material {
        MaterialKind::Standard => {
            entity.insert(MeshMaterial3d(
                materials.add(standard_material(object, color, false)),
            ));
        }
        MaterialKind::Physical => {
            entity.insert(MeshMaterial3d(
                materials.add(standard_material(object, color, true)),
            ));
        }
        MaterialKind::Normal => {
            entity.insert(MeshMaterial3d(normal_materials.add(NormalMaterial::default())));
        }
        MaterialKind::Wireframe => {
            // Edges only: invisible fill plus a colored wireframe overlay
            entity.insert((
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::NONE,
                    alpha_mode: AlphaMode::Blend,
                    unlit: true,
                    ..default()
                })),
                Wireframe,
                WireframeColor { color },
            ));
        }
    }
}

pub fn object_color(object: &SceneObject) -> Color {
    parse_color(&object.color).unwrap_or(FALLBACK_OBJECT_COLOR)
}

fn base_transform(object: &SceneObject) -> Transform {
    Transform {
        translation: Vec3::from_array(object.position),
        rotation: Quat::from_euler(
            EulerRot::XYZ,
            object.rotation[0],
            object.rotation[1],
            object.rotation[2],
        ),
        scale: Vec3::from_array(object.scale),
    }
}

fn standard_material(object: &SceneObject, color: Color, clearcoat: bool) -> StandardMaterial {
    let mut material = StandardMaterial {
        base_color: color.with_alpha(object.opacity),
        perceptual_roughness: object.roughness,
        metallic: object.metalness,
        ..default()
    };
    if object.opacity < 1.0 {
        material.alpha_mode = AlphaMode::Blend;
    }
    if clearcoat {
        material.clearcoat = 1.0;
        material.clearcoat_perceptual_roughness = 0.1;
    }
    material
}

/// Geometry per shape, fixed construction parameters chosen for a
/// consistent default visual density
fn shape_mesh(shape: ShapeKind) -> Mesh {
    match shape {
        ShapeKind::Box => Mesh::from(Cuboid::new(1.0, 1.0, 1.0)),
        ShapeKind::Sphere => Sphere::new(0.5).mesh().uv(32, 32),
        ShapeKind::Cylinder => Cylinder::new(0.5, 1.0).mesh().resolution(32).build(),
        ShapeKind::Cone => Cone {
            radius: 0.5,
            height: 1.0,
        }
        .mesh()
        .resolution(32)
        .build(),
        // Inner radius 0.3, outer 0.7: ring radius 0.5, tube radius 0.2
        ShapeKind::Torus => Torus::new(0.3, 0.7)
            .mesh()
            .minor_resolution(16)
            .major_resolution(100)
            .build(),
        ShapeKind::Icosahedron => Sphere::new(0.5)
            .mesh()
            .ico(0)
            .unwrap_or_else(|_| Sphere::new(0.5).mesh().build()),
        ShapeKind::Dodecahedron => dodecahedron_mesh(0.5),
    }
}

/// Regular dodecahedron, flat shaded. Bevy has no primitive for it, so the
/// mesh is built from the classic golden-ratio vertex table: cube corners
/// plus three mutually perpendicular golden rectangles.
fn dodecahedron_mesh(radius: f32) -> Mesh {
    const PHI: f32 = 1.618_034;
    const INV: f32 = 1.0 / PHI;

    let corners: [[f32; 3]; 20] = [
        [-1.0, -1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, -1.0],
        [1.0, 1.0, 1.0],
        [0.0, -INV, -PHI],
        [0.0, -INV, PHI],
        [0.0, INV, -PHI],
        [0.0, INV, PHI],
        [-INV, -PHI, 0.0],
        [-INV, PHI, 0.0],
        [INV, -PHI, 0.0],
        [INV, PHI, 0.0],
        [-PHI, 0.0, -INV],
        [PHI, 0.0, -INV],
        [-PHI, 0.0, INV],
        [PHI, 0.0, INV],
    ];

    // The 12 pentagons, wound counter-clockwise viewed from outside
    const FACES: [[usize; 5]; 12] = [
        [3, 11, 7, 15, 13],
        [7, 19, 17, 6, 15],
        [17, 4, 8, 10, 6],
        [8, 0, 16, 2, 10],
        [0, 12, 1, 18, 16],
        [6, 10, 2, 13, 15],
        [2, 16, 18, 3, 13],
        [18, 1, 9, 11, 3],
        [4, 14, 12, 0, 8],
        [11, 9, 5, 19, 7],
        [19, 5, 14, 4, 17],
        [1, 12, 14, 5, 9],
    ];

    // Every corner lies on a sphere of radius sqrt(3)
    let scale = radius / 3.0_f32.sqrt();

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(FACES.len() * 5);
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(FACES.len() * 5);
    let mut indices: Vec<u32> = Vec::with_capacity(FACES.len() * 9);

    for face in FACES {
        let base = positions.len() as u32;
        let verts: Vec<Vec3> = face
            .iter()
            .map(|&i| Vec3::from_array(corners[i]) * scale)
            .collect();

        let normal = (verts[1] - verts[0])
            .cross(verts[2] - verts[0])
            .normalize()
            .to_array();

        for vert in &verts {
            positions.push(vert.to_array());
            normals.push(normal);
        }

        // Fan triangulation of the pentagon
        for i in 1..4u32 {
            indices.extend_from_slice(&[base, base + i, base + i + 1]);
        }
    }

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        bevy::asset::RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

/// Apply the per-frame animation formulas to animated objects. The current
/// transform is a pure function of the base transform and elapsed time, so
/// nothing drifts between frames.
fn animate_objects(time: Res<Time>, mut objects: Query<(&SceneObjectEntity, &mut Transform)>) {
    let elapsed = time.elapsed_secs();
    for (spawned, mut transform) in objects.iter_mut() {
        let object = &spawned.object;
        let Some(animation) = &object.animation else {
            continue;
        };

        let position = animate::animated_position(object.position, animation, elapsed);
        let rotation = animate::animated_rotation(object.rotation, animation, elapsed);
        let scale = animate::animated_scale(object.scale, animation, elapsed);

        transform.translation = Vec3::from_array(position);
        transform.rotation = Quat::from_euler(EulerRot::XYZ, rotation[0], rotation[1], rotation[2]);
        transform.scale = Vec3::from_array(scale);
    }
}

/// Recolor objects pure white while the pointer is over them. Visual only;
/// the document is never touched.
fn update_hover_highlight(
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut objects: Query<
        (
            &PickingInteraction,
            &SceneObjectEntity,
            Option<&MeshMaterial3d<StandardMaterial>>,
            Option<&mut WireframeColor>,
        ),
        Changed<PickingInteraction>,
    >,
) {
    for (interaction, spawned, material_handle, wireframe_color) in objects.iter_mut() {
        let object = &spawned.object;
        // Normal-shaded objects ignore color entirely
        if object.material == MaterialKind::Normal {
            continue;
        }

        let hovered = !matches!(interaction, PickingInteraction::None);
        let color = if hovered {
            Color::WHITE
        } else {
            object_color(object)
        };

        if let Some(mut wireframe) = wireframe_color {
            wireframe.color = color;
            continue;
        }

        if let Some(handle) = material_handle {
            if let Some(material) = materials.get_mut(&handle.0) {
                material.base_color = color.with_alpha(object.opacity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genscene_core::SceneDocument;

    #[test]
    fn test_dodecahedron_mesh_counts() {
        let mesh = dodecahedron_mesh(0.5);
        // 12 pentagons, 5 vertices each, fanned into 3 triangles
        assert_eq!(mesh.count_vertices(), 60);
        let indices = mesh.indices().unwrap();
        assert_eq!(indices.len(), 108);
    }

    #[test]
    fn test_dodecahedron_vertices_on_sphere() {
        let radius = 0.5;
        let mesh = dodecahedron_mesh(radius);
        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|values| values.as_float3())
            .unwrap();
        for position in positions {
            let length = Vec3::from_array(*position).length();
            assert!((length - radius).abs() < 1e-4, "vertex off sphere: {length}");
        }
    }

    #[test]
    fn test_rerender_same_document_reuses_everything() {
        let objects = SceneDocument::demo().objects;
        let keep = reusable_ids(&objects, &objects);
        assert_eq!(keep.len(), objects.len());
        assert!(keep.contains("demo-cube"));
    }

    #[test]
    fn test_changed_entry_is_rebuilt() {
        let objects = SceneDocument::demo().objects;
        let mut updated = objects.clone();
        updated[0].color = "#ff0000".to_string();
        assert!(reusable_ids(&objects, &updated).is_empty());
    }

    #[test]
    fn test_empty_document_keeps_nothing() {
        let objects = SceneDocument::demo().objects;
        assert!(reusable_ids(&objects, &[]).is_empty());
        assert!(reusable_ids(&[], &[]).is_empty());
    }

    #[test]
    fn test_base_transform_from_document() {
        let object = &SceneDocument::demo().objects[0];
        let transform = base_transform(object);
        assert_eq!(transform.translation, Vec3::ZERO);
        assert_eq!(transform.scale, Vec3::splat(1.5));
    }

    #[test]
    fn test_object_color_fallback() {
        let mut object = SceneDocument::demo().objects[0].clone();
        object.color = "chartreuse".to_string();
        assert_eq!(object_color(&object), FALLBACK_OBJECT_COLOR);
    }
}
