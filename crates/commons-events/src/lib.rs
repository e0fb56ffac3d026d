//! Event sourcing for the Commons simulation.
//!
//! Every state change in a run is an immutable [`Event`] appended to an
//! [`EventLog`]. Events are the source of truth: given a serialized initial
//! [`WorldState`] and its log, [`replay`] reconstructs the final state
//! byte-for-byte with no decision strategy involved.
//!
//! # Modules
//!
//! - [`event`] -- The closed tagged union of event kinds and the single
//!   exhaustive [`Event::apply`] dispatch owning all state mutation.
//! - [`log`] -- The append-only, serializable [`EventLog`].
//! - [`replay`] -- The apply protocol shared by live execution and replay.
//!
//! [`WorldState`]: commons_types::WorldState

pub mod event;
pub mod log;
pub mod replay;

pub use event::Event;
pub use log::EventLog;
pub use replay::{apply_all, replay};

use thiserror::Error;

/// Errors from applying an event to a world state.
///
/// These are protocol violations: the loop emitted events out of order or a
/// stored log does not match its initial state. Expected races (a deceased
/// receiver, an action by a dead agent) are handled inside apply as no-ops
/// and never reach this type.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// A death (or other alive-only operation) targeted an agent that is
    /// not in the alive set.
    #[error("agent not alive: {agent_id}")]
    AgentNotAlive {
        /// The agent the event named.
        agent_id: String,
    },

    /// A grant fired with no rounds remaining. The loop guarantees at least
    /// one remaining round when it emits a grant, so this only occurs when
    /// replaying a log against the wrong initial state.
    #[error("grant with no rounds remaining (round {current_round})")]
    NoRoundsRemaining {
        /// The round counter at the time of the grant.
        current_round: u32,
    },

    /// An energy computation overflowed its integer type.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Where the overflow happened.
        context: String,
    },
}
