//! Machine-readable response schema for the generation service
//!
//! The generation service is asked for structured output constrained to the
//! scene document shape. This schema must stay in lockstep with the types
//! in [`crate::document`], field for field; the tests below enforce that.

use serde_json::{json, Value};

/// The structured-output schema transmitted with every generation request
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": {
                "type": "STRING",
                "description": "Short title of the generated scene"
            },
            "description": {
                "type": "STRING",
                "description": "Short explanation of what was generated"
            },
            "backgroundColor": {
                "type": "STRING",
                "description": "Hex color code for the background"
            },
            "lights": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "kind": {
                            "type": "STRING",
                            "enum": ["ambient", "directional", "point"]
                        },
                        "position": {
                            "type": "ARRAY",
                            "items": { "type": "NUMBER" },
                            "description": "[x, y, z] coordinates. Required for directional/point."
                        },
                        "intensity": { "type": "NUMBER" },
                        "color": { "type": "STRING", "description": "Hex color" }
                    },
                    "required": ["kind", "intensity", "color"]
                }
            },
            "objects": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING", "description": "Unique id within the scene" },
                        "name": { "type": "STRING" },
                        "shape": {
                            "type": "STRING",
                            "enum": [
                                "box", "sphere", "cylinder", "cone",
                                "torus", "icosahedron", "dodecahedron"
                            ]
                        },
                        "position": {
                            "type": "ARRAY",
                            "items": { "type": "NUMBER" },
                            "description": "[x, y, z]"
                        },
                        "rotation": {
                            "type": "ARRAY",
                            "items": { "type": "NUMBER" },
                            "description": "[x, y, z] in radians"
                        },
                        "scale": {
                            "type": "ARRAY",
                            "items": { "type": "NUMBER" },
                            "description": "[x, y, z]"
                        },
                        "color": { "type": "STRING", "description": "Hex color" },
                        "material": {
                            "type": "STRING",
                            "enum": ["standard", "physical", "normal", "wireframe"],
                            "description": "Use 'standard' for most objects, 'physical' for metals/glass."
                        },
                        "roughness": { "type": "NUMBER", "description": "0.0 to 1.0" },
                        "metalness": { "type": "NUMBER", "description": "0.0 to 1.0" },
                        "opacity": { "type": "NUMBER", "description": "0.0 to 1.0" },
                        "animation": {
                            "type": "OBJECT",
                            "properties": {
                                "rotateX": {
                                    "type": "NUMBER",
                                    "description": "Rotation speed factor (e.g., 0.01)"
                                },
                                "rotateY": { "type": "NUMBER" },
                                "rotateZ": { "type": "NUMBER" },
                                "float": {
                                    "type": "BOOLEAN",
                                    "description": "If true, object bobs up and down"
                                },
                                "pulse": {
                                    "type": "BOOLEAN",
                                    "description": "If true, object scales in and out slightly"
                                }
                            }
                        }
                    },
                    "required": [
                        "id", "shape", "position", "rotation",
                        "scale", "color", "material"
                    ]
                }
            }
        },
        "required": ["title", "description", "objects", "lights", "backgroundColor"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{LightKind, MaterialKind, SceneDocument, ShapeKind};

    fn enum_values(schema: &Value, path: &[&str]) -> Vec<String> {
        let mut node = schema;
        for key in path {
            node = &node[key];
        }
        node.as_array()
            .expect("enum array missing")
            .iter()
            .map(|v| v.as_str().expect("enum entry").to_string())
            .collect()
    }

    #[test]
    fn test_shape_enum_in_lockstep() {
        let schema = response_schema();
        let listed = enum_values(
            &schema,
            &["properties", "objects", "items", "properties", "shape", "enum"],
        );
        assert_eq!(listed.len(), ShapeKind::ALL.len());
        for kind in ShapeKind::ALL {
            let name = serde_json::to_value(kind).unwrap();
            assert!(
                listed.iter().any(|v| v == name.as_str().unwrap()),
                "schema missing shape {kind:?}"
            );
        }
    }

    #[test]
    fn test_material_enum_in_lockstep() {
        let schema = response_schema();
        let listed = enum_values(
            &schema,
            &["properties", "objects", "items", "properties", "material", "enum"],
        );
        assert_eq!(listed.len(), MaterialKind::ALL.len());
        for kind in MaterialKind::ALL {
            let name = serde_json::to_value(kind).unwrap();
            assert!(listed.iter().any(|v| v == name.as_str().unwrap()));
        }
    }

    #[test]
    fn test_light_enum_in_lockstep() {
        let schema = response_schema();
        let listed = enum_values(
            &schema,
            &["properties", "lights", "items", "properties", "kind", "enum"],
        );
        assert_eq!(listed.len(), LightKind::ALL.len());
        for kind in LightKind::ALL {
            let name = serde_json::to_value(kind).unwrap();
            assert!(listed.iter().any(|v| v == name.as_str().unwrap()));
        }
    }

    #[test]
    fn test_field_names_in_lockstep() {
        let schema = response_schema();
        let document = serde_json::to_value(SceneDocument::demo()).unwrap();

        for key in document.as_object().unwrap().keys() {
            assert!(
                schema["properties"].get(key).is_some(),
                "schema missing document field {key}"
            );
        }
        let object_schema = &schema["properties"]["objects"]["items"]["properties"];
        for key in document["objects"][0].as_object().unwrap().keys() {
            assert!(
                object_schema.get(key).is_some(),
                "schema missing object field {key}"
            );
        }
        let light_schema = &schema["properties"]["lights"]["items"]["properties"];
        for key in document["lights"][1].as_object().unwrap().keys() {
            assert!(
                light_schema.get(key).is_some(),
                "schema missing light field {key}"
            );
        }
        let animation_schema =
            &object_schema["animation"]["properties"];
        for key in document["objects"][0]["animation"].as_object().unwrap().keys() {
            assert!(
                animation_schema.get(key).is_some(),
                "schema missing animation field {key}"
            );
        }
    }
}
