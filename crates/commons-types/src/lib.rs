//! Shared type definitions for the Commons simulation.
//!
//! The Commons simulation pits a fixed population of autonomous agents
//! against a shared, depleting energy pool over a bounded number of rounds.
//! This crate holds the canonical data model every other crate builds on:
//!
//! - [`agent`] -- Per-agent state: energy, life status, and the append-only
//!   message transcript each agent sees.
//! - [`world`] -- The single shared [`WorldState`] record and its read-only
//!   lookup helpers.
//! - [`action`] -- The closed set of actions an agent may take on its turn,
//!   and the [`Decision`] wrapper carrying the agent's reasoning.
//! - [`observation`] -- The restricted, agent-specific view of world state
//!   handed to decision strategies.
//!
//! All types serialize with `serde` so that a world state and its event log
//! round-trip losslessly through JSON.

pub mod action;
pub mod agent;
pub mod observation;
pub mod world;

pub use action::{Action, Decision};
pub use agent::{AgentRecord, AgentStatus, Message, Role};
pub use observation::{Observation, build_observation};
pub use world::{WorldError, WorldState};
