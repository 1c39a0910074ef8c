use std::{env, fmt, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::core::FacturaError;

/// Environment variable read when the config file carries no API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Gemini connection and generation settings.
///
/// Every field has a default, so an empty TOML file is a valid config:
///
/// ```toml
/// model = "gemini-2.5-pro"
/// timeout_secs = 180
///
/// [generation]
/// temperature = 0.1
/// max_output_tokens = 8192
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; falls back to `GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub generation: GenerationSettings,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("generation", &self.generation)
            .finish()
    }
}

fn default_model() -> String {
    super::DEFAULT_MODELS[0].to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

/// Sampling settings; low temperature for faithful transcription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_temperature() -> f32 {
    0.1
}

fn default_top_p() -> f32 {
    0.95
}

fn default_top_k() -> u32 {
    40
}

fn default_max_output_tokens() -> u32 {
    8192
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            generation: GenerationSettings::default(),
        }
    }
}

impl GeminiConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FacturaError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, FacturaError> {
        toml::from_str(content).map_err(|e| FacturaError::Config(e.to_string()))
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// The configured key, else `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// `FacturaError::Config` when neither is set to a non-blank value.
    pub fn resolve_api_key(&self) -> Result<String, FacturaError> {
        pick_api_key(self.api_key.as_deref(), || env::var(API_KEY_ENV).ok())
    }
}

fn pick_api_key(
    configured: Option<&str>,
    from_env: impl FnOnce() -> Option<String>,
) -> Result<String, FacturaError> {
    configured
        .filter(|k| !k.trim().is_empty())
        .map(str::to_string)
        .or_else(|| from_env().filter(|k| !k.trim().is_empty()))
        .ok_or_else(|| {
            FacturaError::Config(format!(
                "no Gemini API key: set `api_key` or the {API_KEY_ENV} environment variable"
            ))
        })
}
