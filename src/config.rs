//! Client configuration.
//!
//! A config is built once, validated when the client is constructed, and
//! read-only afterwards. Defaults match a stock local Ollama install.

use crate::errors::OllamaError;

/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "mistral:7b";

/// Default Ollama API base URL.
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Configuration for an [`OllamaClient`](crate::OllamaClient).
///
/// All fields are fixed at construction. Sampling parameters apply to every
/// generation and chat request the client issues.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Model name in Ollama format (e.g. `"mistral:7b"`).
    pub model: String,
    /// Base URL of the Ollama server.
    pub host: String,
    /// Sampling temperature, 0.0 (deterministic) to 1.0 (creative).
    pub temperature: f32,
    /// Maximum number of tokens in the response (`options.num_predict`).
    pub max_tokens: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            temperature: 0.7,
            max_tokens: 2048,
        }
    }
}

impl OllamaConfig {
    /// Config for a specific model, with default host and sampling settings.
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Set the server base URL.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the response token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Validate field ranges. Called by the client constructor.
    pub fn validate(&self) -> Result<(), OllamaError> {
        if self.model.trim().is_empty() {
            return Err(OllamaError::InvalidConfig {
                reason: "model name is empty".into(),
            });
        }
        if self.host.trim().is_empty() {
            return Err(OllamaError::InvalidConfig {
                reason: "host is empty".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(OllamaError::InvalidConfig {
                reason: format!("temperature {} outside 0.0..=1.0", self.temperature),
            });
        }
        if self.max_tokens == 0 {
            return Err(OllamaError::InvalidConfig {
                reason: "max_tokens must be positive".into(),
            });
        }
        Ok(())
    }

    /// The host URL without a trailing slash, for joining API paths.
    pub(crate) fn base_url(&self) -> &str {
        self.host.trim_end_matches('/')
    }
}
