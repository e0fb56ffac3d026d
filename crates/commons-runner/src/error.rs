//! Error types for the LLM runner.
//!
//! Uses `thiserror` for typed errors that surface through the whole
//! pipeline: configuration, prompt rendering, HTTP calls, response parsing.

/// Errors that can occur while obtaining an LLM decision.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Failed to render the turn prompt template.
    #[error("template render error: {0}")]
    Template(String),

    /// An LLM backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    LlmBackend(String),

    /// The model reply could not be parsed into a valid decision.
    #[error("response parse error: {0}")]
    Parse(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
