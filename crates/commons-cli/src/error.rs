//! Binary-level error type.

use commons_engine::{ConfigError, EngineError};
use commons_runner::RunnerError;

/// Errors surfaced by the binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Scenario loading failed.
    #[error("scenario error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// Engine setup or the run itself failed.
    #[error("engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },

    /// LLM strategy setup failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: RunnerError,
    },

    /// Writing run artifacts failed.
    #[error("io error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Serializing run artifacts failed.
    #[error("serialization error: {source}")]
    Serde {
        /// The underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// The scenario's `llm` section could not be parsed.
    #[error("llm config error: {source}")]
    LlmConfig {
        /// The underlying YAML error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for CliError {
    fn from(source: serde_yml::Error) -> Self {
        Self::LlmConfig { source }
    }
}
