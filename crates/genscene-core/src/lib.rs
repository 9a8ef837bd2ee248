//! GenScene Core - Scene document schema and animation math
//!
//! This crate provides the foundational types for the GenScene system:
//! - The scene document: primitive objects, materials, and lights as
//!   returned by the generation service
//! - Document validation beyond what the wire schema guarantees
//! - The machine-readable response schema sent to the generation service
//! - Pure per-frame animation functions evaluated from elapsed time

pub mod animate;
pub mod document;
pub mod schema;

pub use document::{
    Animation, DocumentError, LightKind, MaterialKind, SceneDocument, SceneLight, SceneObject,
    ShapeKind,
};
pub use schema::response_schema;
