//! The canonical world state shared by the engine and the event processor.
//!
//! [`WorldState`] is the single mutable record of a run. It is exclusively
//! owned by the simulation engine; every mutation flows through the event
//! catalog in `commons-events`. The helpers here are read-only lookups plus
//! the narrow mutable accessors the event apply step needs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::AgentRecord;

/// Errors from world-state lookups.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A lookup referenced an agent id absent from the configured set.
    /// Indicates a caller bug, not a recoverable condition.
    #[error("unknown agent: {agent_id}")]
    UnknownAgent {
        /// The id that matched no configured agent.
        agent_id: String,
    },
}

/// The canonical mutable world state of one simulation run.
///
/// Agent order in [`WorldState::agents`] is the turn order within a round
/// and is fixed for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldState {
    /// All agents in turn order. Agents are never removed, only marked
    /// deceased.
    pub agents: Vec<AgentRecord>,
    /// Total number of rounds this run is configured for.
    pub total_rounds: u32,
    /// Fixed energy cost every agent pays per turn.
    pub usage_rate: i64,
    /// Remaining shared energy pool. Non-negative by construction: grants
    /// never exceed the pool.
    pub pool: u64,
    /// Id of the agent granted a pool share each round.
    pub receiver_id: String,
    /// Current round, 0-based, advanced at round boundaries. Never exceeds
    /// [`WorldState::total_rounds`].
    pub current_round: u32,
}

impl WorldState {
    /// Look up an agent by id.
    pub fn agent(&self, agent_id: &str) -> Option<&AgentRecord> {
        self.agents.iter().find(|a| a.id == agent_id)
    }

    /// Look up an agent by id, mutably.
    pub fn agent_mut(&mut self, agent_id: &str) -> Option<&mut AgentRecord> {
        self.agents.iter_mut().find(|a| a.id == agent_id)
    }

    /// Look up an agent by id, only if it is alive.
    pub fn alive_agent(&self, agent_id: &str) -> Option<&AgentRecord> {
        self.agent(agent_id).filter(|a| a.is_alive())
    }

    /// Look up an agent by id mutably, only if it is alive.
    pub fn alive_agent_mut(&mut self, agent_id: &str) -> Option<&mut AgentRecord> {
        self.agent_mut(agent_id).filter(|a| a.is_alive())
    }

    /// Number of currently alive agents.
    pub fn alive_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// Ids of all agents in turn order, alive and deceased alike.
    pub fn turn_order(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.id.clone()).collect()
    }

    /// Ids of currently alive agents, in turn order.
    pub fn alive_ids(&self) -> Vec<String> {
        self.agents
            .iter()
            .filter(|a| a.is_alive())
            .map(|a| a.id.clone())
            .collect()
    }

    /// Ids of deceased agents, in turn order.
    pub fn deceased_ids(&self) -> Vec<String> {
        self.agents
            .iter()
            .filter(|a| !a.is_alive())
            .map(|a| a.id.clone())
            .collect()
    }
}
