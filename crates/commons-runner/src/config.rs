//! LLM backend configuration.

use serde::Deserialize;

/// Which chat-completion API family to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// OpenAI-compatible chat completions API (OpenAI, DeepSeek, Ollama).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
}

/// Connection settings for an LLM backend.
///
/// Usually read from the scenario file's `llm` section; the API key
/// should come from the environment instead of the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LlmBackendConfig {
    /// The API family.
    pub backend_type: BackendType,
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub api_url: String,
    /// API key. Overridden by `COMMONS_LLM_API_KEY` when set.
    #[serde(default)]
    pub api_key: String,
    /// Model identifier passed through to the API.
    pub model: String,
}

impl LlmBackendConfig {
    /// Apply environment overrides.
    ///
    /// `COMMONS_LLM_API_KEY`, `COMMONS_LLM_API_URL`, and
    /// `COMMONS_LLM_MODEL` take precedence over file values, so
    /// credentials never need to live in scenario files.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("COMMONS_LLM_API_KEY") {
            self.api_key = key;
        }
        if let Ok(url) = std::env::var("COMMONS_LLM_API_URL") {
            self.api_url = url;
        }
        if let Ok(model) = std::env::var("COMMONS_LLM_MODEL") {
            self.model = model;
        }
    }
}
