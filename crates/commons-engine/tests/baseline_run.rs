//! Integration tests for the baseline scenario.
//!
//! Four always-skip agents, fixed-share grants to agent_0, usage rate
//! 100. Non-receivers starve at the end of round 2, terminating the run
//! early. All the closing numbers here are hand-derivable from the
//! scenario: three grants of 280 each and three turns of metabolism per
//! agent.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use commons_engine::{
    AlwaysSkip, DecisionStrategy, Engine, ScenarioConfig, StrategyError, StrategyOutput,
    StrategyRegistry,
};
use commons_events::Event;
use commons_types::{Action, AgentStatus, Decision, Observation};

const BASELINE: &str = r"
name: baseline
rounds: 10
usage_rate: 100
pool: 2800
receiver: agent_0
agents:
  - id: agent_0
    energy: 300
    strategy: always-skip
  - id: agent_1
    energy: 300
    strategy: always-skip
  - id: agent_2
    energy: 300
    strategy: always-skip
  - id: agent_3
    energy: 300
    strategy: always-skip
";

fn run_baseline() -> (Engine, commons_engine::RunReport) {
    let config = ScenarioConfig::parse(BASELINE).unwrap();
    let mut engine = Engine::new(
        config.into_world_state(),
        StrategyRegistry::with_builtins(config.seed),
    )
    .unwrap();
    let report = engine.run().unwrap();
    (engine, report)
}

#[test]
fn baseline_score_and_termination() {
    let (_, report) = run_baseline();
    assert_eq!(report.score, 12);
    assert_eq!(report.max_score, 40);
    assert_eq!(report.rounds_completed, 2);
    assert!(report.terminated_early);
    assert_eq!(report.survivors, vec!["agent_0"]);
}

#[test]
fn baseline_final_state() {
    let (engine, _) = run_baseline();
    let state = engine.state();

    // Three grants of ceil(pool / remaining) = 280 each.
    assert_eq!(state.pool, 2800 - 3 * 280);
    assert_eq!(state.current_round, 2);

    // Receiver: 300 + 3 x (280 - 100).
    let receiver = state.agent("agent_0").unwrap();
    assert_eq!(receiver.energy, 840);
    assert_eq!(receiver.status, AgentStatus::Alive);

    // Non-receivers starved to exactly zero on their round-2 turns.
    for id in ["agent_1", "agent_2", "agent_3"] {
        let agent = state.agent(id).unwrap();
        assert_eq!(agent.status, AgentStatus::Deceased);
        assert_eq!(agent.energy, 0);
    }
}

#[test]
fn baseline_log_shape() {
    let (engine, _) = run_baseline();
    let events = engine.log().events();

    assert!(matches!(events.last(), Some(Event::GameOver)));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, Event::GameOver))
            .count(),
        1
    );

    // Every turn that started also paid metabolism.
    let start_turns = events
        .iter()
        .filter(|e| matches!(e, Event::StartTurn { .. }))
        .count();
    let metabolisms = events
        .iter()
        .filter(|e| matches!(e, Event::Metabolism { .. }))
        .count();
    assert_eq!(start_turns, 12);
    assert_eq!(metabolisms, 12);

    // Three deaths, all within round 2: no EndRound after the second.
    let deaths = events
        .iter()
        .filter(|e| matches!(e, Event::Death { .. }))
        .count();
    assert_eq!(deaths, 3);
    let end_rounds = events
        .iter()
        .filter(|e| matches!(e, Event::EndRound))
        .count();
    assert_eq!(end_rounds, 2);
}

#[test]
fn deceased_agents_take_no_further_turns() {
    let (engine, _) = run_baseline();
    let mut deceased: Vec<String> = Vec::new();
    for event in engine.log().events() {
        match event {
            Event::StartTurn { agent_id } => {
                assert!(
                    !deceased.contains(agent_id),
                    "{agent_id} started a turn after dying"
                );
            }
            Event::Death { agent_id } => deceased.push(agent_id.clone()),
            _ => {}
        }
    }
    assert_eq!(deceased.len(), 3);
}

/// Plays a fixed sequence of actions, then skips forever.
struct Scripted {
    actions: Vec<Action>,
}

impl DecisionStrategy for Scripted {
    fn decide(&mut self, _observation: &Observation) -> Result<StrategyOutput, StrategyError> {
        let action = if self.actions.is_empty() {
            Action::SkipTurn
        } else {
            self.actions.remove(0)
        };
        Ok(StrategyOutput {
            decision: Decision {
                reasoning: "scripted".to_owned(),
                action,
            },
            assistant_reply: None,
        })
    }
}

#[test]
fn transfer_to_invalid_target_leaves_energy_untouched() {
    let config = ScenarioConfig::parse(
        r"
rounds: 1
usage_rate: 10
pool: 100
receiver: agent_0
agents:
  - id: agent_0
    energy: 200
    strategy: scripted
  - id: agent_1
    energy: 200
    strategy: always-skip
",
    )
    .unwrap();

    let mut registry = StrategyRegistry::new();
    registry.register("always-skip", Box::new(AlwaysSkip));
    registry.register(
        "scripted",
        Box::new(Scripted {
            actions: vec![Action::Give {
                target: "agent_9".to_owned(),
                amount: 50,
            }],
        }),
    );

    let mut engine = Engine::new(config.into_world_state(), registry).unwrap();
    engine.run().unwrap();

    let actor = engine.state().agent("agent_0").unwrap();
    // grant 100, failed give, metabolism 10
    assert_eq!(actor.energy, 200 + 100 - 10);
    assert!(
        actor
            .transcript
            .iter()
            .any(|m| m.content == "from system: target agent_9 is invalid.")
    );
    assert_eq!(engine.state().agent("agent_1").unwrap().energy, 190);
}

#[test]
fn speak_reaches_peer_transcripts() {
    let config = ScenarioConfig::parse(
        r"
rounds: 1
usage_rate: 10
pool: 100
receiver: agent_0
agents:
  - id: agent_0
    energy: 200
    strategy: scripted
  - id: agent_1
    energy: 200
    strategy: always-skip
",
    )
    .unwrap();

    let mut registry = StrategyRegistry::new();
    registry.register("always-skip", Box::new(AlwaysSkip));
    registry.register(
        "scripted",
        Box::new(Scripted {
            actions: vec![Action::Speak {
                message: "save your energy".to_owned(),
            }],
        }),
    );

    let mut engine = Engine::new(config.into_world_state(), registry).unwrap();
    engine.run().unwrap();

    let peer = engine.state().agent("agent_1").unwrap();
    assert!(
        peer.transcript
            .iter()
            .any(|m| m.content == "from agent_0: save your energy")
    );
}
