//! The closed action set and the decision wrapper.
//!
//! An agent's turn resolves to exactly one [`Action`]. The set is closed:
//! anything outside it is rejected at the deserialization boundary, so the
//! engine never sees an unrecognized action kind.

use serde::{Deserialize, Serialize};

/// One action chosen by an agent on its turn.
///
/// Serialized with an `action` tag in snake case, e.g.
/// `{"action": "give", "target": "agent_1", "amount": 50}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Broadcast a message to every other alive agent.
    Speak {
        /// The message text delivered to each peer.
        message: String,
    },
    /// Transfer energy from the actor to a named target.
    ///
    /// The transferred amount is clamped to what the actor actually holds.
    Give {
        /// Id of the receiving agent.
        target: String,
        /// Requested amount of energy to transfer.
        amount: i64,
    },
    /// Transfer energy from a named target to the actor.
    ///
    /// The transferred amount is clamped to what the target actually holds.
    Take {
        /// Id of the agent taken from.
        target: String,
        /// Requested amount of energy to transfer.
        amount: i64,
    },
    /// Do nothing this turn.
    SkipTurn,
}

impl Action {
    /// Short name of the action kind, for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Speak { .. } => "speak",
            Self::Give { .. } => "give",
            Self::Take { .. } => "take",
            Self::SkipTurn => "skip_turn",
        }
    }
}

/// An agent's decision for one turn: free-text reasoning plus the chosen
/// action. Returned by decision strategies and recorded verbatim in the
/// event log for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// The agent's stated reasoning for its choice.
    pub reasoning: String,
    /// The single action the agent selected.
    pub action: Action,
}
