//! Engine error types.

use commons_events::ApplyError;
use commons_types::WorldError;
use thiserror::Error;

use crate::strategy::StrategyError;

/// Errors that can occur while setting up or running a simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The scenario configuration is internally inconsistent.
    #[error("invalid scenario configuration: {reason}")]
    InvalidConfiguration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// An agent references a strategy id absent from the registry.
    #[error("agent {agent_id} references unknown strategy `{strategy}`")]
    UnsupportedStrategy {
        /// The agent with the unresolved strategy.
        agent_id: String,
        /// The strategy id that could not be resolved.
        strategy: String,
    },

    /// A world-state lookup failed.
    #[error("world error: {source}")]
    World {
        /// The underlying lookup error.
        #[from]
        source: WorldError,
    },

    /// Applying an event to the world state failed.
    #[error("event application failed: {source}")]
    Apply {
        /// The underlying apply error.
        #[from]
        source: ApplyError,
    },

    /// A decision strategy failed; the run cannot continue.
    #[error("strategy failure for agent {agent_id}: {source}")]
    Strategy {
        /// The agent whose strategy failed.
        agent_id: String,
        /// The underlying strategy error.
        source: StrategyError,
    },

    /// Checked arithmetic overflowed during scoring.
    #[error("arithmetic overflow in {context}")]
    Overflow {
        /// The computation that overflowed.
        context: String,
    },
}
