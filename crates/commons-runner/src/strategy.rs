//! The LLM-backed [`DecisionStrategy`] implementation.

use commons_engine::{DecisionStrategy, StrategyError, StrategyOutput};
use commons_types::Observation;
use tracing::debug;

use crate::config::LlmBackendConfig;
use crate::error::RunnerError;
use crate::llm::LlmBackend;
use crate::parse::parse_decision;
use crate::prompt::PromptBuilder;

/// Obtains decisions from a chat-completion backend.
///
/// The raw reply is returned to the engine as the assistant reply so it
/// enters the transcript through the event log; the parsed [`Decision`]
/// drives the action.
///
/// [`Decision`]: commons_types::Decision
pub struct LlmStrategy {
    backend: LlmBackend,
    prompts: PromptBuilder,
}

impl LlmStrategy {
    /// Build the strategy from backend configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if the turn template fails to
    /// compile.
    pub fn from_config(config: &LlmBackendConfig) -> Result<Self, RunnerError> {
        Ok(Self {
            backend: LlmBackend::from_config(config),
            prompts: PromptBuilder::new()?,
        })
    }
}

impl DecisionStrategy for LlmStrategy {
    fn decide(&mut self, observation: &Observation) -> Result<StrategyOutput, StrategyError> {
        let request = self
            .prompts
            .build_request(observation)
            .map_err(|e| StrategyError::Backend {
                message: e.to_string(),
            })?;
        let reply = self
            .backend
            .complete(&request)
            .map_err(|e| StrategyError::Backend {
                message: e.to_string(),
            })?;
        debug!(
            agent_id = %observation.agent.id,
            backend = self.backend.name(),
            reply_bytes = reply.len(),
            "model replied"
        );
        let decision = parse_decision(&reply).map_err(|e| StrategyError::Malformed {
            message: e.to_string(),
        })?;
        Ok(StrategyOutput {
            decision,
            assistant_reply: Some(reply),
        })
    }
}
