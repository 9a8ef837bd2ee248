//! GenScene Generator - Prompt-to-document generation
//!
//! This crate turns a natural-language prompt into a scene document by
//! calling the Gemini generateContent API with a fixed system instruction
//! and a structured-output schema. One request per prompt: no retries, no
//! caching, no streaming. Failures never yield a partial document.

pub mod client;

pub use client::{
    parse_document, GenerateError, GenerationConfig, SceneGenerator, API_KEY_ENV,
};
