//! Scenario configuration loading.
//!
//! A scenario is a YAML file describing the initial world: the round
//! budget, usage rate, shared pool, the designated receiver, and one
//! entry per agent. Structural validation beyond YAML shape (receiver
//! exists, ids unique, strategies resolvable) happens in
//! [`Engine::new`](crate::Engine::new), which sees the strategy registry.

use std::path::Path;

use commons_types::{AgentRecord, WorldState};
use serde::Deserialize;

/// Errors that can occur when loading a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the scenario file from disk.
    #[error("failed to read scenario file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse scenario YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// One agent entry in a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentSpec {
    /// Unique agent id.
    pub id: String,
    /// Starting energy.
    pub energy: i64,
    /// Strategy id, resolved against the engine's registry.
    pub strategy: String,
}

/// A complete scenario description.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScenarioConfig {
    /// Human-readable scenario name, used in logs and output paths.
    #[serde(default = "default_name")]
    pub name: String,
    /// Total number of rounds the simulation may run.
    pub rounds: u32,
    /// Energy each agent loses at the end of its turn.
    pub usage_rate: i64,
    /// Starting size of the shared energy pool.
    pub pool: u64,
    /// Id of the agent receiving the per-round grant.
    pub receiver: String,
    /// The agents, in turn order.
    pub agents: Vec<AgentSpec>,
    /// Seed for the built-in random strategy. Defaults to 0.
    #[serde(default)]
    pub seed: u64,
}

fn default_name() -> String {
    "commons".to_owned()
}

impl ScenarioConfig {
    /// Load a scenario from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::parse(&contents)?)
    }

    /// Parse a scenario from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Build the pre-briefing world state this scenario describes.
    ///
    /// Agents keep the file order as their turn order, all start alive
    /// with empty transcripts, and the round counter starts at zero.
    #[must_use]
    pub fn into_world_state(&self) -> WorldState {
        WorldState {
            agents: self
                .agents
                .iter()
                .map(|spec| {
                    AgentRecord::new(spec.id.clone(), spec.energy, spec.strategy.clone())
                })
                .collect(),
            total_rounds: self.rounds,
            usage_rate: self.usage_rate,
            pool: self.pool,
            receiver_id: self.receiver.clone(),
            current_round: 0,
        }
    }
}
