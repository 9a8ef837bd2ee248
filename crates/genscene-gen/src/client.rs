//! Gemini generateContent client

use genscene_core::{response_schema, DocumentError, SceneDocument};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default endpoint of the generation service
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Fixed behavioral contract given to the model. Not user-editable.
const SYSTEM_INSTRUCTION: &str = "\
You are a 3D scene architect. Your goal is to visualize the user's prompt by \
composing a 3D scene using primitive shapes (box, sphere, cylinder, etc.).

GUIDELINES:
1. CREATIVITY: Since you can only use primitives, you must be creative. Build \
complex objects by stacking, rotating, and scaling multiple primitives.
   - Example: To make a \"Tree\", use a brown cylinder for the trunk and \
multiple green spheres or cones for leaves.
   - Example: To make a \"Car\", use boxes for the body and cylinders (rotated \
90deg) for wheels.
2. SCALE: Keep the scene centered around (0,0,0). Normal object size is around \
1 unit.
3. MATERIALS: Use roughness and metalness to convey texture. High metalness \
for robots, low roughness for plastic.
4. ANIMATION: Add subtle animations (rotateY for spinning, float for hovering) \
to make the scene alive.
5. LIGHTING: Always provide good lighting (usually a mix of ambient and \
directional) so shapes are visible.
6. COMPOSITION: Do not just place one object. If the user asks for a \
\"forest\", generate multiple trees.

Return ONLY the JSON object matching the schema.";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("API key is missing. Set the {API_KEY_ENV} environment variable")]
    MissingCredential,
    #[error("Generation request failed: {0}")]
    Service(#[from] reqwest::Error),
    #[error("Generation service returned an empty response")]
    EmptyResponse,
    #[error("Generated scene is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Generated scene is invalid: {0}")]
    InvalidDocument(#[from] DocumentError),
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Generation request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the generation service
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Sampling temperature. Kept low so structural validity wins over
    /// creative variance.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_temperature() -> f32 {
    0.4
}

fn default_timeout_secs() -> u64 {
    30
}

/// Client for the generation service
pub struct SceneGenerator {
    client: reqwest::Client,
    config: GenerationConfig,
    api_key: Option<String>,
}

impl SceneGenerator {
    /// Create a generator with an explicit credential. `None` is allowed so
    /// the viewer can start without a key; the missing credential surfaces
    /// on the first generation attempt, before any network call.
    pub fn new(config: GenerationConfig, api_key: Option<String>) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Create a generator reading the credential from the environment
    pub fn from_env(config: GenerationConfig) -> Result<Self, GenerateError> {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty());
        Self::new(config, api_key)
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a scene document for a prompt. All-or-nothing: any failure
    /// leaves the caller's current document untouched.
    pub async fn generate(&self, prompt: &str) -> Result<SceneDocument, GenerateError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GenerateError::MissingCredential);
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base, self.config.model
        );
        let request = GenerateContentRequest::new(prompt, self.config.temperature);

        info!(
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "Requesting scene generation"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let reply: GenerateContentResponse = response.json().await?;
        let text = reply.candidate_text().ok_or(GenerateError::EmptyResponse)?;
        debug!(chars = text.len(), "Received scene payload");

        parse_document(&text)
    }

    /// Run [`Self::generate`] to completion on a throwaway current-thread
    /// runtime. For worker threads and one-shot CLI use.
    pub fn generate_blocking(&self, prompt: &str) -> Result<SceneDocument, GenerateError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(self.generate(prompt))
    }
}

/// Parse and validate the model's JSON payload
pub fn parse_document(text: &str) -> Result<SceneDocument, GenerateError> {
    let document = SceneDocument::from_json(text)?;
    document.validate()?;
    Ok(document)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationParameters,
}

impl GenerateContentRequest {
    fn new(prompt: &str, temperature: f32) -> Self {
        Self {
            system_instruction: Content::from_text(SYSTEM_INSTRUCTION),
            contents: vec![Content::from_text(prompt)],
            generation_config: GenerationParameters {
                temperature,
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationParameters {
    temperature: f32,
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn from_text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any
    fn candidate_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credential_fails_before_network() {
        // An unroutable api_base would produce a Service error if any
        // request were attempted.
        let config = GenerationConfig {
            api_base: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        };
        let generator = SceneGenerator::new(config, None).unwrap();

        let result = generator.generate("a red cube").await;
        assert!(matches!(result, Err(GenerateError::MissingCredential)));
    }

    #[test]
    fn test_parse_document_rejects_invalid_json() {
        let result = parse_document("this is not json");
        assert!(matches!(result, Err(GenerateError::Parse(_))));
    }

    #[test]
    fn test_parse_document_rejects_invalid_semantics() {
        // Structurally valid, but the same id appears twice.
        let json = r#"{
            "title": "t", "description": "d", "backgroundColor": "#101010",
            "lights": [],
            "objects": [
                {"id": "a", "shape": "box", "position": [0,0,0],
                 "rotation": [0,0,0], "scale": [1,1,1],
                 "color": "#ffffff", "material": "standard"},
                {"id": "a", "shape": "sphere", "position": [1,0,0],
                 "rotation": [0,0,0], "scale": [1,1,1],
                 "color": "#ffffff", "material": "standard"}
            ]
        }"#;
        let result = parse_document(json);
        assert!(matches!(result, Err(GenerateError::InvalidDocument(_))));
    }

    #[test]
    fn test_parse_document_accepts_demo() {
        let json = SceneDocument::demo().to_json_pretty().unwrap();
        let document = parse_document(&json).unwrap();
        assert_eq!(document, SceneDocument::demo());
    }

    #[test]
    fn test_candidate_text_empty_cases() {
        let reply: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(reply.candidate_text().is_none());

        let reply: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": []}}]}"#).unwrap();
        assert!(reply.candidate_text().is_none());
    }

    #[test]
    fn test_candidate_text_joins_parts() {
        let reply: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(reply.candidate_text().unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_request_wire_format() {
        let request = GenerateContentRequest::new("a tiny forest", 0.4);
        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("systemInstruction").is_some());
        assert_eq!(
            json["contents"][0]["parts"][0]["text"], "a tiny forest"
        );
        let generation_config = &json["generationConfig"];
        assert_eq!(generation_config["responseMimeType"], "application/json");
        assert!(generation_config["responseSchema"].is_object());
        let temperature = generation_config["temperature"].as_f64().unwrap();
        assert!((temperature - 0.4).abs() < 1e-6);
    }
}
