//! Per-agent state: energy, life status, and the message transcript.
//!
//! Each agent is identified by a unique string id and owns an append-only
//! transcript of messages. The transcript doubles as the audit trail of what
//! the agent has been told and as the conversational context handed to
//! LLM-backed decision strategies. It is never shared across agents.

use serde::{Deserialize, Serialize};

/// Whether an agent is alive or has died.
///
/// The transition is one-way: `Alive -> Deceased` exactly once, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// The agent is alive and takes turns.
    Alive,
    /// The agent has died. Its energy is frozen at the value it held at
    /// the moment of death and it takes no further turns.
    Deceased,
}

/// The speaker role of a transcript message.
///
/// Mirrors the chat-completion roles used by LLM backends so transcripts
/// can be forwarded to a model without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The setup briefing injected at simulation start.
    System,
    /// Notices from the environment and speech from other agents.
    User,
    /// The agent's own recorded replies.
    Assistant,
}

/// One entry in an agent's transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who produced the message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl Message {
    /// Build an environment notice. Notices carry the `user` role with a
    /// `from system:` content prefix, matching the wire format LLM
    /// backends expect.
    pub fn notice(content: &str) -> Self {
        Self {
            role: Role::User,
            content: format!("from system: {content}"),
        }
    }
}

/// One agent's record in the world state.
///
/// Created once at simulation setup and never destroyed -- death only flips
/// [`AgentRecord::status`] to [`AgentStatus::Deceased`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Unique string identifier, stable for the run.
    pub id: String,
    /// Current energy. May be negative transiently between metabolism and
    /// the death check that resolves it.
    pub energy: i64,
    /// Identifier of the decision strategy governing this agent, resolved
    /// against the engine's strategy registry at setup.
    pub strategy: String,
    /// Alive or deceased.
    pub status: AgentStatus,
    /// Append-only ordered transcript of messages visible to this agent.
    pub transcript: Vec<Message>,
}

impl AgentRecord {
    /// Create a new alive agent with an empty transcript.
    pub const fn new(id: String, energy: i64, strategy: String) -> Self {
        Self {
            id,
            energy,
            strategy,
            status: AgentStatus::Alive,
            transcript: Vec::new(),
        }
    }

    /// Whether the agent is currently alive.
    pub const fn is_alive(&self) -> bool {
        matches!(self.status, AgentStatus::Alive)
    }

    /// Append a message to the transcript.
    pub fn push_message(&mut self, role: Role, content: String) {
        self.transcript.push(Message { role, content });
    }

    /// Append an environment notice to the transcript.
    pub fn push_notice(&mut self, content: &str) {
        self.transcript.push(Message::notice(content));
    }
}
