//! Decision strategy trait, registry, and built-in strategies.
//!
//! During each agent's turn the engine presents its strategy with an
//! [`Observation`] and awaits a [`StrategyOutput`] in response. The
//! [`DecisionStrategy`] trait abstracts the mechanism by which decisions
//! are obtained: an LLM backend, a scripted policy, or a test stub.
//!
//! Strategies are resolved through an explicit [`StrategyRegistry`] value
//! owned by the engine; there is no process-global registry, so tests and
//! concurrent runs cannot interfere with each other.

use std::collections::BTreeMap;

use commons_types::{Action, Decision, Observation};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Errors a decision strategy can fail with.
///
/// Any strategy failure aborts the run: a silent fallback to skipping
/// would corrupt the experiment without a trace.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The strategy's backend (network, model) failed.
    #[error("strategy backend failure: {message}")]
    Backend {
        /// Description of the failure.
        message: String,
    },

    /// The backend responded, but the response could not be understood.
    #[error("malformed strategy response: {message}")]
    Malformed {
        /// Description of what was malformed.
        message: String,
    },
}

/// What a strategy produces for one turn.
#[derive(Debug, Clone)]
pub struct StrategyOutput {
    /// The chosen action with its reasoning.
    pub decision: Decision,
    /// The raw assistant reply, if the strategy is conversational. The
    /// engine records it into the transcript through the event log so
    /// that replay reproduces the conversation.
    pub assistant_reply: Option<String>,
}

/// A source of turn decisions for agents.
pub trait DecisionStrategy {
    /// Decide one turn given the agent's view of the world.
    ///
    /// Takes `&mut self` so stateful strategies (seeded RNGs, HTTP
    /// clients) need no interior mutability.
    ///
    /// # Errors
    ///
    /// Returns [`StrategyError`] if no decision could be produced; the
    /// engine aborts the run.
    fn decide(&mut self, observation: &Observation) -> Result<StrategyOutput, StrategyError>;
}

/// An explicit mapping from strategy ids to implementations.
#[derive(Default)]
pub struct StrategyRegistry {
    strategies: BTreeMap<String, Box<dyn DecisionStrategy>>,
}

impl StrategyRegistry {
    /// Strategy id of the built-in [`AlwaysSkip`] strategy.
    pub const ALWAYS_SKIP: &'static str = "always-skip";
    /// Strategy id of the built-in [`RandomStrategy`].
    pub const RANDOM: &'static str = "random";

    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in strategies, with the random
    /// strategy seeded for reproducibility.
    #[must_use]
    pub fn with_builtins(seed: u64) -> Self {
        let mut registry = Self::new();
        registry.register(Self::ALWAYS_SKIP, Box::new(AlwaysSkip));
        registry.register(Self::RANDOM, Box::new(RandomStrategy::new(seed)));
        registry
    }

    /// Register a strategy under an id, replacing any previous entry.
    pub fn register(&mut self, id: impl Into<String>, strategy: Box<dyn DecisionStrategy>) {
        self.strategies.insert(id.into(), strategy);
    }

    /// Whether a strategy id is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.strategies.contains_key(id)
    }

    /// Look up a strategy for dispatch.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut (dyn DecisionStrategy + 'static)> {
        self.strategies.get_mut(id).map(Box::as_mut)
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("ids", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A strategy that forfeits every turn.
///
/// Used by the baseline scenario to exercise the full round loop with
/// deterministic outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysSkip;

impl DecisionStrategy for AlwaysSkip {
    fn decide(&mut self, _observation: &Observation) -> Result<StrategyOutput, StrategyError> {
        Ok(StrategyOutput {
            decision: Decision {
                reasoning: "I always skip my turn".to_owned(),
                action: Action::SkipTurn,
            },
            assistant_reply: None,
        })
    }
}

/// A seeded uniformly-random strategy.
///
/// Picks one of the four actions with equal probability; transfer targets
/// are drawn from the currently alive peers. With no alive peers it can
/// only speak or skip. Deterministic for a fixed seed and observation
/// sequence, which is what the replay-determinism tests rely on.
#[derive(Debug)]
pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    /// Create a random strategy from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_peer(&mut self, peers: &[String]) -> Option<String> {
        if peers.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..peers.len());
        peers.get(index).cloned()
    }
}

impl DecisionStrategy for RandomStrategy {
    fn decide(&mut self, observation: &Observation) -> Result<StrategyOutput, StrategyError> {
        let roll = self.rng.random_range(0_u8..4);
        let action = match roll {
            0 => Action::Speak {
                message: format!("{} is still here.", observation.agent.id),
            },
            1 => self.random_peer(&observation.alive_peers).map_or(
                Action::SkipTurn,
                |target| Action::Give {
                    target,
                    amount: self.rng.random_range(1..=25),
                },
            ),
            2 => self.random_peer(&observation.alive_peers).map_or(
                Action::SkipTurn,
                |target| Action::Take {
                    target,
                    amount: self.rng.random_range(1..=25),
                },
            ),
            _ => Action::SkipTurn,
        };

        Ok(StrategyOutput {
            decision: Decision {
                reasoning: "chosen uniformly at random".to_owned(),
                action,
            },
            assistant_reply: None,
        })
    }
}
