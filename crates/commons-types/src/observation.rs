//! The restricted view of world state handed to decision strategies.
//!
//! An [`Observation`] is rebuilt fresh on every request and never aliases
//! mutable engine state. It exposes the requesting agent's own record (with
//! transcript) plus the ids of its peers partitioned by life status and the
//! round/pool metadata -- and nothing else. Other agents' transcripts never
//! leak.

use serde::{Deserialize, Serialize};

use crate::agent::AgentRecord;
use crate::world::{WorldError, WorldState};

/// The agent-specific read-only view passed to a decision strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// The requesting agent's own record, transcript included.
    pub agent: AgentRecord,
    /// Ids of other currently alive agents, in turn order.
    pub alive_peers: Vec<String>,
    /// Ids of deceased agents, in turn order.
    pub deceased_peers: Vec<String>,
    /// Current round, 0-based.
    pub current_round: u32,
    /// Total rounds configured for the run.
    pub total_rounds: u32,
    /// Fixed per-turn energy cost.
    pub usage_rate: i64,
    /// Id of the designated receiver agent.
    pub receiver_id: String,
    /// Remaining shared energy pool.
    pub pool: u64,
}

/// Build the observation for one agent.
///
/// The requesting agent is excluded from both peer lists.
///
/// # Errors
///
/// Returns [`WorldError::UnknownAgent`] if `agent_id` matches no configured
/// agent.
pub fn build_observation(
    agent_id: &str,
    world: &WorldState,
) -> Result<Observation, WorldError> {
    let agent = world
        .agent(agent_id)
        .ok_or_else(|| WorldError::UnknownAgent {
            agent_id: agent_id.to_owned(),
        })?
        .clone();

    let alive_peers = world
        .agents
        .iter()
        .filter(|a| a.is_alive() && a.id != agent_id)
        .map(|a| a.id.clone())
        .collect();

    let deceased_peers = world
        .agents
        .iter()
        .filter(|a| !a.is_alive() && a.id != agent_id)
        .map(|a| a.id.clone())
        .collect();

    Ok(Observation {
        agent,
        alive_peers,
        deceased_peers,
        current_round: world.current_round,
        total_rounds: world.total_rounds,
        usage_rate: world.usage_rate,
        receiver_id: world.receiver_id.clone(),
        pool: world.pool,
    })
}
