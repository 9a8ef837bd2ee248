//! Scene document types and validation
//!
//! A scene document is the JSON record the generation service returns for a
//! prompt: a titled collection of primitive objects and light sources, plus
//! a background color. Documents are immutable once produced; a new
//! generation replaces the whole document.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Duplicate object id: {0}")]
    DuplicateId(String),
    #[error("Object {id}: {field} is {value}, expected a value in 0.0..=1.0")]
    MaterialParamOutOfRange {
        id: String,
        field: &'static str,
        value: f32,
    },
    #[error("Light {index}: intensity is negative ({intensity})")]
    NegativeIntensity { index: usize, intensity: f32 },
    #[error("Light {index}: a {kind} light requires a position")]
    MissingLightPosition { index: usize, kind: LightKind },
}

/// Primitive shapes the renderer knows how to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Box,
    Sphere,
    Cylinder,
    Cone,
    Torus,
    Icosahedron,
    Dodecahedron,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Box,
        ShapeKind::Sphere,
        ShapeKind::Cylinder,
        ShapeKind::Cone,
        ShapeKind::Torus,
        ShapeKind::Icosahedron,
        ShapeKind::Dodecahedron,
    ];
}

/// Material behavior applied to an object's mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    /// Physically-inspired shading from color, roughness, and metalness
    Standard,
    /// As standard, with a fixed clear-coat layer for glass/car-paint looks
    Physical,
    /// Shades by surface normal direction, ignoring color and material params
    Normal,
    /// Edges only, in the object's color
    Wireframe,
}

impl MaterialKind {
    pub const ALL: [MaterialKind; 4] = [
        MaterialKind::Standard,
        MaterialKind::Physical,
        MaterialKind::Normal,
        MaterialKind::Wireframe,
    ];
}

/// Light source categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Ambient,
    Directional,
    Point,
}

impl LightKind {
    pub const ALL: [LightKind; 3] = [LightKind::Ambient, LightKind::Directional, LightKind::Point];
}

impl std::fmt::Display for LightKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LightKind::Ambient => write!(f, "ambient"),
            LightKind::Directional => write!(f, "directional"),
            LightKind::Point => write!(f, "point"),
        }
    }
}

/// Optional per-object animation. Rotation rates are per-frame angular
/// increments as emitted by the generation service (tuned for a 60 Hz
/// frame); the renderer normalizes them to wall-clock time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_z: Option<f32>,
    /// Bob up and down around the base height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float: Option<bool>,
    /// Scale in and out slightly on all axes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulse: Option<bool>,
}

/// One primitive in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    /// Unique within a document; the renderer's stable identity key
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub shape: ShapeKind,
    pub position: [f32; 3],
    /// Euler XYZ, radians
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    /// Hex color string, e.g. "#6366f1"
    pub color: String,
    pub material: MaterialKind,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default = "default_metalness")]
    pub metalness: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

fn default_roughness() -> f32 {
    0.5
}

fn default_metalness() -> f32 {
    0.5
}

fn default_opacity() -> f32 {
    1.0
}

/// One light source. Lights have no identity; they are addressed by
/// position in the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLight {
    pub kind: LightKind,
    /// Hex color string
    pub color: String,
    pub intensity: f32,
    /// Required for directional and point lights, ignored for ambient
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
}

/// The root scene record, replaced wholesale on each successful generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    pub title: String,
    pub description: String,
    /// Hex color string for the viewport background
    pub background_color: String,
    pub lights: Vec<SceneLight>,
    pub objects: Vec<SceneObject>,
}

impl SceneDocument {
    /// Parse a document from its JSON text form
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Serialize the document to pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check the domain invariants the wire schema cannot express:
    /// unique object ids, material parameters within [0, 1], non-negative
    /// light intensity, and a position on every light that needs one.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let mut seen = HashSet::new();
        for object in &self.objects {
            if !seen.insert(object.id.as_str()) {
                return Err(DocumentError::DuplicateId(object.id.clone()));
            }
            for (field, value) in [
                ("roughness", object.roughness),
                ("metalness", object.metalness),
                ("opacity", object.opacity),
            ] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(DocumentError::MaterialParamOutOfRange {
                        id: object.id.clone(),
                        field,
                        value,
                    });
                }
            }
        }

        for (index, light) in self.lights.iter().enumerate() {
            if light.intensity < 0.0 {
                return Err(DocumentError::NegativeIntensity {
                    index,
                    intensity: light.intensity,
                });
            }
            if light.kind != LightKind::Ambient && light.position.is_none() {
                return Err(DocumentError::MissingLightPosition {
                    index,
                    kind: light.kind,
                });
            }
        }

        Ok(())
    }

    /// The built-in document shown before the first generation
    pub fn demo() -> Self {
        Self {
            title: "Welcome to GenScene".to_string(),
            description: "Enter a prompt to generate a 3D scene.".to_string(),
            background_color: "#101010".to_string(),
            lights: vec![
                SceneLight {
                    kind: LightKind::Ambient,
                    color: "#ffffff".to_string(),
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
                    kind: LightKind::Point,
                    color: "#ff0000".to_string(),
                    intensity: 0.5,
                    position: Some([-5.0, -5.0, -5.0]),
                },
            ],
            objects: vec![SceneObject {
                id: "demo-cube".to_string(),
                name: Some("Spinning Cube".to_string()),
                shape: ShapeKind::Box,
                position: [0.0, 0.0, 0.0],
                rotation: [0.0, 0.0, 0.0],
                scale: [1.5, 1.5, 1.5],
                color: "#6366f1".to_string(),
                material: MaterialKind::Standard,
                roughness: 0.2,
                metalness: 0.8,
                opacity: 1.0,
                animation: Some(Animation {
                    rotate_x: Some(0.005),
                    rotate_y: Some(0.01),
                    rotate_z: None,
                    float: Some(true),
                    pulse: None,
                }),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let document = SceneDocument::demo();
        let json = document.to_json_pretty().unwrap();
        let parsed = SceneDocument::from_json(&json).unwrap();
        assert_eq!(document, parsed);
    }

    #[test]
    fn test_parse_with_defaults() {
        let json = r#"{
            "title": "Minimal",
            "description": "One sphere",
            "backgroundColor": "#000000",
            "lights": [],
            "objects": [{
                "id": "s1",
                "shape": "sphere",
                "position": [0, 1, 0],
                "rotation": [0, 0, 0],
                "scale": [1, 1, 1],
                "color": "#ff8800",
                "material": "standard"
            }]
        }"#;

        let document = SceneDocument::from_json(json).unwrap();
        let object = &document.objects[0];
        assert_eq!(object.shape, ShapeKind::Sphere);
        assert_eq!(object.roughness, 0.5);
        assert_eq!(object.metalness, 0.5);
        assert_eq!(object.opacity, 1.0);
        assert!(object.name.is_none());
        assert!(object.animation.is_none());
    }

    #[test]
    fn test_unknown_shape_rejected() {
        let json = r#"{
            "title": "t", "description": "d", "backgroundColor": "#000000",
            "lights": [],
            "objects": [{
                "id": "x", "shape": "prism",
                "position": [0,0,0], "rotation": [0,0,0], "scale": [1,1,1],
                "color": "#ffffff", "material": "standard"
            }]
        }"#;
        assert!(SceneDocument::from_json(json).is_err());
    }

    #[test]
    fn test_unknown_material_rejected() {
        let json = r#"{
            "title": "t", "description": "d", "backgroundColor": "#000000",
            "lights": [],
            "objects": [{
                "id": "x", "shape": "box",
                "position": [0,0,0], "rotation": [0,0,0], "scale": [1,1,1],
                "color": "#ffffff", "material": "chrome"
            }]
        }"#;
        assert!(SceneDocument::from_json(json).is_err());
    }

    #[test]
    fn test_wrong_vector_arity_rejected() {
        let json = r#"{
            "title": "t", "description": "d", "backgroundColor": "#000000",
            "lights": [],
            "objects": [{
                "id": "x", "shape": "box",
                "position": [0,0], "rotation": [0,0,0], "scale": [1,1,1],
                "color": "#ffffff", "material": "standard"
            }]
        }"#;
        assert!(SceneDocument::from_json(json).is_err());
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let mut document = SceneDocument::demo();
        let mut copy = document.objects[0].clone();
        copy.name = Some("Second".to_string());
        document.objects.push(copy);

        assert!(matches!(
            document.validate(),
            Err(DocumentError::DuplicateId(id)) if id == "demo-cube"
        ));
    }

    #[test]
    fn test_validate_material_params() {
        let mut document = SceneDocument::demo();
        document.objects[0].roughness = 1.5;
        assert!(matches!(
            document.validate(),
            Err(DocumentError::MaterialParamOutOfRange { field: "roughness", .. })
        ));
    }

    #[test]
    fn test_validate_lights() {
        let mut document = SceneDocument::demo();
        document.lights[0].intensity = -0.1;
        assert!(matches!(
            document.validate(),
            Err(DocumentError::NegativeIntensity { index: 0, .. })
        ));

        let mut document = SceneDocument::demo();
        document.lights[1].position = None;
        assert!(matches!(
            document.validate(),
            Err(DocumentError::MissingLightPosition {
                index: 1,
                kind: LightKind::Directional
            })
        ));
    }

    #[test]
    fn test_demo_document() {
        let document = SceneDocument::demo();
        document.validate().unwrap();

        // The demo is the manual-test fixture: one spinning box under an
        // ambient light.
        assert_eq!(document.objects.len(), 1);
        assert_eq!(document.objects[0].shape, ShapeKind::Box);
        let animation = document.objects[0].animation.as_ref().unwrap();
        assert!(animation.rotate_y.is_some());
        assert!(document
            .lights
            .iter()
            .any(|light| light.kind == LightKind::Ambient));
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(SceneDocument::demo()).unwrap();
        assert!(json.get("backgroundColor").is_some());
        let animation = &json["objects"][0]["animation"];
        assert!(animation.get("rotateY").is_some());
        assert!(animation.get("rotate_y").is_none());
        assert_eq!(json["lights"][0]["kind"], "ambient");
        assert_eq!(json["objects"][0]["shape"], "box");
    }
}
