//! LLM-backed decision strategy.
//!
//! Implements [`DecisionStrategy`](commons_engine::DecisionStrategy) on top
//! of chat-completion HTTP APIs. The agent's transcript -- briefing,
//! environment notices, and its own prior replies -- is forwarded verbatim
//! as the conversation, followed by a rendered turn prompt asking for a
//! JSON decision. The raw reply is handed back to the engine so it lands
//! in the transcript through the event log.
//!
//! # Modules
//!
//! - [`config`] -- backend selection and credentials
//! - [`error`] -- [`RunnerError`]
//! - [`llm`] -- blocking HTTP backends (OpenAI-compatible, Anthropic)
//! - [`parse`] -- recovery-parsing of model replies into decisions
//! - [`prompt`] -- `minijinja` turn prompt rendering
//! - [`strategy`] -- the [`LlmStrategy`] glue

pub mod config;
pub mod error;
pub mod llm;
pub mod parse;
pub mod prompt;
pub mod strategy;

pub use config::{BackendType, LlmBackendConfig};
pub use error::RunnerError;
pub use llm::{ChatRequest, ChatTurn, LlmBackend};
pub use parse::parse_decision;
pub use prompt::PromptBuilder;
pub use strategy::LlmStrategy;
