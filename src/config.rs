use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout for source document retrieval.
    pub timeout_seconds: u64,
    /// Attempts per fetch before the source is reported unavailable.
    pub retry_attempts: u32,
    /// Linear backoff between attempts.
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct GeminiConfig {
    pub model: String,
    /// Upper bound on a single normalization call; these regularly run
    /// minutes per document.
    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            retry_attempts: 3,
            retry_backoff_ms: 500,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-pro".to_string(),
            timeout_seconds: 300,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{config_path}': {e}"
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Loads `config.toml` when present, otherwise falls back to defaults.
    pub fn load_or_default() -> Self {
        if Path::new("config.toml").exists() {
            match Self::load() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable config.toml: {e}");
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    /// Gemini API key comes from the environment, not the config file.
    pub fn gemini_api_key() -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}
