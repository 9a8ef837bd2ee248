//! Configuration loading

use anyhow::Result;
use genscene_gen::GenerationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Load configuration from file, falling back to defaults when absent
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert_eq!(config.generation.temperature, 0.4);
        assert_eq!(config.generation.timeout_secs, 30);
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genscene.toml");
        std::fs::write(
            &path,
            r#"
[generation]
model = "gemini-2.5-pro"
timeout_secs = 60
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.generation.model, "gemini-2.5-pro");
        assert_eq!(config.generation.timeout_secs, 60);
        // Untouched fields keep their defaults
        assert_eq!(config.generation.temperature, 0.4);
    }
}
