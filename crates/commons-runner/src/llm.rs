//! LLM backend abstraction and implementations.
//!
//! Enum-based dispatch over chat-completion backends, with concrete
//! implementations for OpenAI-compatible APIs and the Anthropic Messages
//! API. All backends communicate over blocking `reqwest` HTTP; the engine
//! loop is synchronous, one decision at a time.
//!
//! The runner does not care which model is behind the API -- it sends a
//! conversation and expects a text reply containing JSON.

use commons_types::Role;

use crate::config::{BackendType, LlmBackendConfig};
use crate::error::RunnerError;

/// One turn of the conversation sent to a backend.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Speaker role; only [`Role::User`] and [`Role::Assistant`] appear
    /// here, the system briefing travels separately.
    pub role: Role,
    /// The turn text.
    pub content: String,
}

/// A complete request: system text plus the alternating conversation.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System message establishing the agent's situation.
    pub system: String,
    /// The conversation turns, oldest first.
    pub turns: Vec<ChatTurn>,
}

const fn wire_role(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

/// An LLM backend that can process a conversation and return a reply.
pub enum LlmBackend {
    /// OpenAI-compatible chat completions API.
    OpenAi(OpenAiBackend),
    /// Anthropic Messages API.
    Anthropic(AnthropicBackend),
}

impl LlmBackend {
    /// Create a backend from configuration.
    #[must_use]
    pub fn from_config(config: &LlmBackendConfig) -> Self {
        match config.backend_type {
            BackendType::OpenAi => Self::OpenAi(OpenAiBackend::new(config)),
            BackendType::Anthropic => Self::Anthropic(AnthropicBackend::new(config)),
        }
    }

    /// Send a conversation to the LLM and return the reply text.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::LlmBackend`] if the HTTP call fails or the
    /// reply cannot be extracted.
    pub fn complete(&self, request: &ChatRequest) -> Result<String, RunnerError> {
        match self {
            Self::OpenAi(backend) => backend.complete(request),
            Self::Anthropic(backend) => backend.complete(request),
        }
    }

    /// Human-readable name for logging.
    #[must_use]
    pub const fn name(&self) -> &str {
        match self {
            Self::OpenAi(_) => "openai-compatible",
            Self::Anthropic(_) => "anthropic",
        }
    }
}

/// Backend for OpenAI-compatible chat completions APIs.
///
/// Works with OpenAI, DeepSeek, and Ollama endpoints. Sends requests to
/// `{api_url}/chat/completions`.
pub struct OpenAiBackend {
    client: reqwest::blocking::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    /// Create a new OpenAI-compatible backend.
    #[must_use]
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    fn complete(&self, request: &ChatRequest) -> Result<String, RunnerError> {
        let url = format!("{}/chat/completions", self.api_url);

        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": request.system,
        })];
        messages.extend(request.turns.iter().map(|turn| {
            serde_json::json!({
                "role": wire_role(turn.role),
                "content": turn.content,
            })
        }));
        let body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "temperature": 0.7,
            "max_tokens": 512,
            "response_format": {"type": "json_object"}
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| RunnerError::LlmBackend(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(RunnerError::LlmBackend(format!(
                "OpenAI returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| RunnerError::LlmBackend(format!("OpenAI response parse failed: {e}")))?;

        extract_openai_content(&json)
    }
}

/// Extract the text content from an OpenAI chat completions response.
fn extract_openai_content(json: &serde_json::Value) -> Result<String, RunnerError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            RunnerError::LlmBackend(
                "OpenAI response missing choices[0].message.content".to_owned(),
            )
        })
}

/// Backend for the Anthropic Messages API.
///
/// Anthropic uses a different request format from OpenAI:
/// - `x-api-key` header instead of `Authorization: Bearer`
/// - system is a top-level field, not a message
/// - the reply lives at `content[0].text`
pub struct AnthropicBackend {
    client: reqwest::blocking::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    /// Create a new Anthropic Messages API backend.
    #[must_use]
    pub fn new(config: &LlmBackendConfig) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    fn complete(&self, request: &ChatRequest) -> Result<String, RunnerError> {
        let url = format!("{}/messages", self.api_url);

        let messages: Vec<serde_json::Value> = request
            .turns
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": wire_role(turn.role),
                    "content": turn.content,
                })
            })
            .collect();
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 512,
            "system": request.system,
            "messages": messages,
        });

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| RunnerError::LlmBackend(format!("Anthropic request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(RunnerError::LlmBackend(format!(
                "Anthropic returned {status}: {error_body}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| {
                RunnerError::LlmBackend(format!("Anthropic response parse failed: {e}"))
            })?;

        extract_anthropic_content(&json)
    }
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_content(json: &serde_json::Value) -> Result<String, RunnerError> {
    json.get("content")
        .and_then(|c| c.get(0))
        .and_then(|b| b.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            RunnerError::LlmBackend("Anthropic response missing content[0].text".to_owned())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_openai_content_valid() {
        let json = serde_json::json!({
            "choices": [{
                "message": {
                    "content": "{\"reasoning\": \"resting\", \"action\": {\"action\": \"skip_turn\"}}"
                }
            }]
        });
        let result = extract_openai_content(&json);
        assert!(result.is_ok());
        assert!(result.unwrap_or_default().contains("skip_turn"));
    }

    #[test]
    fn extract_openai_content_missing_choices() {
        let json = serde_json::json!({"error": "rate_limit"});
        assert!(extract_openai_content(&json).is_err());
    }

    #[test]
    fn extract_anthropic_content_valid() {
        let json = serde_json::json!({
            "content": [{
                "type": "text",
                "text": "{\"reasoning\": \"low energy\", \"action\": {\"action\": \"take\", \"target\": \"agent_1\", \"amount\": 10}}"
            }]
        });
        let result = extract_anthropic_content(&json);
        assert!(result.is_ok());
        assert!(result.unwrap_or_default().contains("take"));
    }

    #[test]
    fn extract_anthropic_content_missing() {
        let json = serde_json::json!({"content": []});
        assert!(extract_anthropic_content(&json).is_err());
    }

    #[test]
    fn from_config_dispatches_correctly() {
        let openai_config = LlmBackendConfig {
            backend_type: BackendType::OpenAi,
            api_url: "https://api.openai.com/v1".to_owned(),
            api_key: "test".to_owned(),
            model: "test-model".to_owned(),
        };
        assert_eq!(LlmBackend::from_config(&openai_config).name(), "openai-compatible");

        let anthropic_config = LlmBackendConfig {
            backend_type: BackendType::Anthropic,
            api_url: "https://api.anthropic.com/v1".to_owned(),
            api_key: "test".to_owned(),
            model: "test-model".to_owned(),
        };
        assert_eq!(LlmBackend::from_config(&anthropic_config).name(), "anthropic");
    }
}
