//! The simulation engine: round/turn loop, strategies, and scenario config.
//!
//! The engine owns a [`WorldState`](commons_types::WorldState), an
//! append-only [`EventLog`](commons_events::EventLog), and a
//! [`StrategyRegistry`] mapping strategy ids to decision implementations.
//! Every state mutation during a run flows through
//! [`Event::apply`](commons_events::Event::apply) so that replaying the
//! persisted log over the initial snapshot reproduces the final state
//! byte-for-byte.
//!
//! # Modules
//!
//! - [`briefing`] -- the setup message injected into each agent's transcript
//! - [`config`] -- YAML scenario loading
//! - [`engine`] -- the [`Engine`] and its round/turn loop
//! - [`error`] -- [`EngineError`]
//! - [`strategy`] -- the [`DecisionStrategy`] trait, registry, and built-ins

pub mod briefing;
pub mod config;
pub mod engine;
pub mod error;
pub mod strategy;

pub use config::{AgentSpec, ConfigError, ScenarioConfig};
pub use engine::{Engine, RunReport};
pub use error::EngineError;
pub use strategy::{
    AlwaysSkip, DecisionStrategy, RandomStrategy, StrategyError, StrategyOutput, StrategyRegistry,
};
