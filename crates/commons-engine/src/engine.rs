//! The round/turn simulation loop.
//!
//! The [`Engine`] validates the initial world against its strategy
//! registry, injects the setup briefings, snapshots the result as the
//! replay baseline, and then drives rounds until the round budget is
//! exhausted or fewer than two agents remain alive. Every mutation goes
//! through [`Event::apply`] with the event recorded into the log, so the
//! final state is always reproducible from the snapshot plus the log.

use chrono::{DateTime, Utc};
use commons_events::{Event, EventLog, apply_all};
use commons_types::{Role, WorldState, build_observation};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::briefing::briefing_message;
use crate::error::EngineError;
use crate::strategy::StrategyRegistry;

/// Summary of a completed run, written alongside the state and log
/// artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Unique id of this run.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Cumulative turns survived across all agents.
    pub score: u64,
    /// Best achievable score: rounds times agent count.
    pub max_score: u64,
    /// Rounds fully completed, i.e. the final round counter.
    pub rounds_completed: u32,
    /// Ids of the agents alive at the end, in turn order.
    pub survivors: Vec<String>,
    /// Whether the run stopped before the round budget was exhausted.
    pub terminated_early: bool,
}

/// The simulation engine.
pub struct Engine {
    state: WorldState,
    initial: WorldState,
    log: EventLog,
    registry: StrategyRegistry,
}

impl Engine {
    /// Build an engine from a pre-briefing world state and a registry.
    ///
    /// Validates that agent ids are unique, the receiver exists, and
    /// every agent's strategy id resolves in the registry; then injects
    /// each agent's briefing and snapshots the post-briefing state as
    /// the replay baseline.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfiguration`] for structural
    /// problems or [`EngineError::UnsupportedStrategy`] for an
    /// unresolvable strategy id.
    pub fn new(mut state: WorldState, registry: StrategyRegistry) -> Result<Self, EngineError> {
        if state.agents.is_empty() {
            return Err(EngineError::InvalidConfiguration {
                reason: "scenario defines no agents".to_owned(),
            });
        }

        let mut seen = std::collections::BTreeSet::new();
        for agent in &state.agents {
            if !seen.insert(agent.id.clone()) {
                return Err(EngineError::InvalidConfiguration {
                    reason: format!("duplicate agent id `{}`", agent.id),
                });
            }
            if !registry.contains(&agent.strategy) {
                return Err(EngineError::UnsupportedStrategy {
                    agent_id: agent.id.clone(),
                    strategy: agent.strategy.clone(),
                });
            }
        }

        // An empty receiver id is a scenario with no grants; a non-empty
        // one must resolve.
        if !state.receiver_id.is_empty() && state.agent(&state.receiver_id).is_none() {
            return Err(EngineError::InvalidConfiguration {
                reason: format!("receiver `{}` is not an agent", state.receiver_id),
            });
        }

        // Briefings are part of the baseline, not the log: they depend
        // only on the scenario, never on run outcomes.
        let briefings: Vec<(String, String)> = state
            .agents
            .iter()
            .map(|agent| (agent.id.clone(), briefing_message(agent, &state)))
            .collect();
        for (agent_id, briefing) in briefings {
            if let Some(agent) = state.agent_mut(&agent_id) {
                agent.push_message(Role::System, briefing);
            }
        }

        let initial = state.clone();
        Ok(Self {
            state,
            initial,
            log: EventLog::new(),
            registry,
        })
    }

    /// The current world state.
    #[must_use]
    pub const fn state(&self) -> &WorldState {
        &self.state
    }

    /// The post-briefing snapshot replay starts from.
    #[must_use]
    pub const fn initial_state(&self) -> &WorldState {
        &self.initial
    }

    /// The event log recorded so far.
    #[must_use]
    pub const fn log(&self) -> &EventLog {
        &self.log
    }

    /// Cumulative turns survived: the number of `StartTurn` events.
    #[must_use]
    pub fn score(&self) -> u64 {
        let turns = self
            .log
            .events()
            .iter()
            .filter(|event| matches!(event, Event::StartTurn { .. }))
            .count();
        u64::try_from(turns).unwrap_or(u64::MAX)
    }

    /// Best achievable score: every agent surviving every round.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Overflow`] if the product does not fit.
    pub fn max_score(&self) -> Result<u64, EngineError> {
        let agents = u64::try_from(self.initial.agents.len()).unwrap_or(u64::MAX);
        u64::from(self.initial.total_rounds)
            .checked_mul(agents)
            .ok_or_else(|| EngineError::Overflow {
                context: "max score".to_owned(),
            })
    }

    /// Drive the simulation to completion and summarize it.
    ///
    /// Each round grants the receiver its share of the pool, then gives
    /// every alive agent (in turn order) one turn: observation, strategy
    /// decision, action, metabolism, and the death check. A round ends
    /// with `GameOver` and early termination when fewer than two agents
    /// remain, otherwise with `EndRound`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if a strategy fails or an event violates
    /// protocol; the log retains everything applied up to the failure.
    pub fn run(&mut self) -> Result<RunReport, EngineError> {
        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        info!(
            %run_id,
            total_rounds = self.state.total_rounds,
            agents = self.state.agents.len(),
            pool = self.state.pool,
            receiver = %self.state.receiver_id,
            "simulation starting"
        );

        let mut terminated_early = false;
        while self.state.current_round < self.state.total_rounds {
            self.emit(vec![Event::GrantEnergy])?;

            for agent_id in self.state.turn_order() {
                if self.state.alive_agent(&agent_id).is_none() {
                    continue;
                }
                self.take_turn(&agent_id)?;
            }

            if self.state.alive_count() < 2 {
                info!(
                    round = self.state.current_round,
                    alive = self.state.alive_count(),
                    "too few agents alive, stopping early"
                );
                self.emit(vec![Event::GameOver])?;
                terminated_early = true;
                break;
            }

            self.emit(vec![Event::EndRound])?;
        }

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            score: self.score(),
            max_score: self.max_score()?,
            rounds_completed: self.state.current_round,
            survivors: self.state.alive_ids(),
            terminated_early,
        };
        info!(
            %run_id,
            score = report.score,
            max_score = report.max_score,
            rounds_completed = report.rounds_completed,
            survivors = report.survivors.len(),
            terminated_early,
            "simulation finished"
        );
        Ok(report)
    }

    /// Run one agent's turn.
    fn take_turn(&mut self, agent_id: &str) -> Result<(), EngineError> {
        self.emit(vec![Event::StartTurn {
            agent_id: agent_id.to_owned(),
        }])?;

        let observation = build_observation(agent_id, &self.state)?;
        let strategy_id = observation.agent.strategy.clone();
        let strategy =
            self.registry
                .get_mut(&strategy_id)
                .ok_or_else(|| EngineError::UnsupportedStrategy {
                    agent_id: agent_id.to_owned(),
                    strategy: strategy_id.clone(),
                })?;
        let output = strategy
            .decide(&observation)
            .map_err(|source| EngineError::Strategy {
                agent_id: agent_id.to_owned(),
                source,
            })?;
        debug!(
            agent_id,
            strategy = %strategy_id,
            action = output.decision.action.kind(),
            "decision made"
        );

        let mut events = vec![Event::Decision {
            agent_id: agent_id.to_owned(),
            decision: output.decision.clone(),
        }];
        if let Some(reply) = output.assistant_reply {
            events.push(Event::Message {
                agent_id: agent_id.to_owned(),
                role: Role::Assistant,
                content: reply,
            });
        }
        events.push(Event::Action {
            agent_id: agent_id.to_owned(),
            action: output.decision.action,
        });
        events.push(Event::Metabolism {
            agent_id: agent_id.to_owned(),
        });
        self.emit(events)?;

        // Death is only checked here, on the agent's own turn, after
        // metabolism. Energy may go negative mid-round without killing
        // anyone until their turn comes around.
        let energy = self
            .state
            .agent(agent_id)
            .map_or(0, |agent| agent.energy);
        if energy <= 0 {
            info!(agent_id, energy, "agent died");
            self.emit(vec![Event::Death {
                agent_id: agent_id.to_owned(),
            }])?;
        } else {
            self.emit(vec![Event::EndTurn {
                agent_id: agent_id.to_owned(),
            }])?;
        }
        Ok(())
    }

    /// Apply events to the state, recording each into the log.
    fn emit(&mut self, events: Vec<Event>) -> Result<(), EngineError> {
        apply_all(&mut self.state, &mut self.log, events)?;
        Ok(())
    }
}
