//! The event catalog: a closed tagged union with one apply dispatch.
//!
//! Each variant carries only the minimal fields needed to re-derive its
//! effect; anything derivable from state (like the grant amount) is computed
//! at apply time so a replayed event reproduces the same effect against any
//! prior-consistent state. [`Event::apply`] is the only place in the
//! workspace that mutates a [`WorldState`].

use commons_types::{Action, Decision, Role, WorldState};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ApplyError;

/// One recorded state transition.
///
/// Serialized with an `event_type` tag in snake case, e.g.
/// `{"event_type": "start_turn", "agent_id": "agent_0"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum Event {
    /// Grant the designated receiver its share of the remaining pool:
    /// `ceil(pool / rounds_remaining)`. No-op if the receiver is deceased.
    GrantEnergy,
    /// Marks the beginning of an agent's turn. No state mutation; scoring
    /// counts these.
    StartTurn {
        /// The agent whose turn is starting.
        agent_id: String,
    },
    /// Records a strategy's decision for audit. No state mutation.
    Decision {
        /// The deciding agent.
        agent_id: String,
        /// The recorded decision, reasoning included.
        decision: Decision,
    },
    /// Apply the effect of the single action an agent chose. No-op if the
    /// actor is no longer alive.
    Action {
        /// The acting agent.
        agent_id: String,
        /// The chosen action.
        action: Action,
    },
    /// Append one message to the named agent's transcript. No-op if the
    /// agent is not alive. Used to route strategy replies through the log
    /// so replay reproduces transcripts.
    Message {
        /// The agent receiving the message.
        agent_id: String,
        /// The speaker role.
        role: Role,
        /// The message text.
        content: String,
    },
    /// Subtract the per-turn usage rate from the named agent's energy, if
    /// it is still alive.
    Metabolism {
        /// The agent paying the turn cost.
        agent_id: String,
    },
    /// Move the named agent from alive to deceased, freezing its energy,
    /// and notify the survivors. Fails if the agent is not alive.
    Death {
        /// The dying agent.
        agent_id: String,
    },
    /// Close an agent's turn: tell it its remaining energy and tell every
    /// other alive agent the turn completed. Only emitted for agents that
    /// survived metabolism.
    EndTurn {
        /// The agent whose turn ended.
        agent_id: String,
    },
    /// Advance the round counter by one.
    EndRound,
    /// Marks early termination when fewer than two agents remain alive.
    /// No state mutation.
    GameOver,
}

impl Event {
    /// Apply this event's effect to the world state.
    ///
    /// The sole mutation point per event kind: live execution and replay
    /// both go through here, so the two paths cannot diverge.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError`] on protocol violations -- a death for a
    /// non-alive agent, a grant with no rounds remaining, or an energy
    /// overflow. Expected races (deceased receiver, action by a dead
    /// agent, invalid transfer target) resolve as no-ops or transcript
    /// notices instead.
    pub fn apply(&self, world: &mut WorldState) -> Result<(), ApplyError> {
        match self {
            Self::GrantEnergy => apply_grant(world),
            Self::StartTurn { .. } | Self::Decision { .. } | Self::GameOver => Ok(()),
            Self::Action { agent_id, action } => apply_action(world, agent_id, action),
            Self::Message {
                agent_id,
                role,
                content,
            } => {
                if let Some(agent) = world.alive_agent_mut(agent_id) {
                    agent.push_message(*role, content.clone());
                }
                Ok(())
            }
            Self::Metabolism { agent_id } => apply_metabolism(world, agent_id),
            Self::Death { agent_id } => apply_death(world, agent_id),
            Self::EndTurn { agent_id } => apply_end_turn(world, agent_id),
            Self::EndRound => {
                world.current_round = world.current_round.checked_add(1).ok_or_else(|| {
                    ApplyError::ArithmeticOverflow {
                        context: "round counter increment".to_owned(),
                    }
                })?;
                Ok(())
            }
        }
    }
}

/// Grant the receiver `ceil(pool / rounds_remaining)` from the pool.
///
/// The pool is only decremented when a live receiver exists; with the
/// receiver deceased the grant is a recorded no-op.
fn apply_grant(world: &mut WorldState) -> Result<(), ApplyError> {
    let remaining = world
        .total_rounds
        .checked_sub(world.current_round)
        .filter(|r| *r > 0)
        .ok_or(ApplyError::NoRoundsRemaining {
            current_round: world.current_round,
        })?;

    let receiver_id = world.receiver_id.clone();
    if world.alive_agent(&receiver_id).is_none() {
        debug!(receiver = %receiver_id, "grant skipped, receiver not alive");
        return Ok(());
    }

    let amount = world.pool.div_ceil(u64::from(remaining));
    world.pool = world
        .pool
        .checked_sub(amount)
        .ok_or_else(|| ApplyError::ArithmeticOverflow {
            context: "pool debit".to_owned(),
        })?;

    let Ok(credit) = i64::try_from(amount) else {
        return Err(ApplyError::ArithmeticOverflow {
            context: "grant amount exceeds energy range".to_owned(),
        });
    };

    if let Some(receiver) = world.alive_agent_mut(&receiver_id) {
        receiver.energy = receiver.energy.checked_add(credit).ok_or_else(|| {
            ApplyError::ArithmeticOverflow {
                context: "receiver energy credit".to_owned(),
            }
        })?;
        receiver.push_notice(&format!(
            "You have been given {amount} units of energy from the environment."
        ));
    }

    Ok(())
}

/// Dispatch one agent action. A dead actor is an expected race: the whole
/// action is a no-op.
fn apply_action(
    world: &mut WorldState,
    agent_id: &str,
    action: &Action,
) -> Result<(), ApplyError> {
    if world.alive_agent(agent_id).is_none() {
        debug!(agent_id, kind = action.kind(), "action dropped, actor not alive");
        return Ok(());
    }

    match action {
        Action::Speak { message } => {
            let broadcast = format!("from {agent_id}: {message}");
            for agent in world.agents.iter_mut().filter(|a| a.is_alive()) {
                if agent.id != agent_id {
                    agent.push_message(Role::User, broadcast.clone());
                }
            }
            Ok(())
        }
        Action::Give { target, amount } => apply_give(world, agent_id, target, *amount),
        Action::Take { target, amount } => apply_take(world, agent_id, target, *amount),
        Action::SkipTurn => Ok(()),
    }
}

/// Clamp a requested transfer to what the holder actually has, never
/// negative.
const fn clamp_transfer(requested: i64, held: i64) -> i64 {
    let capped = if requested < held { requested } else { held };
    if capped < 0 { 0 } else { capped }
}

/// Transfer `min(actor.energy, requested)` from actor to target. A target
/// that is not alive gets the actor an invalid-target notice and no
/// transfer happens.
fn apply_give(
    world: &mut WorldState,
    actor_id: &str,
    target_id: &str,
    requested: i64,
) -> Result<(), ApplyError> {
    let Some(actor) = world.alive_agent(actor_id) else {
        return Ok(());
    };
    let actor_energy = actor.energy;

    if world.alive_agent(target_id).is_none() {
        if let Some(actor) = world.alive_agent_mut(actor_id) {
            actor.push_notice(&format!("target {target_id} is invalid."));
        }
        return Ok(());
    }

    let amount = clamp_transfer(requested, actor_energy);

    if let Some(actor) = world.alive_agent_mut(actor_id) {
        actor.energy = actor.energy.checked_sub(amount).ok_or_else(|| {
            ApplyError::ArithmeticOverflow {
                context: "give debit".to_owned(),
            }
        })?;
        actor.push_notice(&format!("you gave {target_id} {amount} units of energy."));
    }

    if let Some(target) = world.alive_agent_mut(target_id) {
        target.energy = target.energy.checked_add(amount).ok_or_else(|| {
            ApplyError::ArithmeticOverflow {
                context: "give credit".to_owned(),
            }
        })?;
        target.push_notice(&format!(
            "agent {actor_id} gave you {amount} units of energy."
        ));
    }

    Ok(())
}

/// Transfer `min(target.energy, requested)` from target to actor, with the
/// same invalid-target handling as give.
fn apply_take(
    world: &mut WorldState,
    actor_id: &str,
    target_id: &str,
    requested: i64,
) -> Result<(), ApplyError> {
    if world.alive_agent(actor_id).is_none() {
        return Ok(());
    }

    let Some(target) = world.alive_agent(target_id) else {
        if let Some(actor) = world.alive_agent_mut(actor_id) {
            actor.push_notice(&format!("target {target_id} is invalid."));
        }
        return Ok(());
    };
    let amount = clamp_transfer(requested, target.energy);

    if let Some(target) = world.alive_agent_mut(target_id) {
        target.energy = target.energy.checked_sub(amount).ok_or_else(|| {
            ApplyError::ArithmeticOverflow {
                context: "take debit".to_owned(),
            }
        })?;
        target.push_notice(&format!(
            "agent {actor_id} took {amount} units of energy from you."
        ));
    }

    if let Some(actor) = world.alive_agent_mut(actor_id) {
        actor.energy = actor.energy.checked_add(amount).ok_or_else(|| {
            ApplyError::ArithmeticOverflow {
                context: "take credit".to_owned(),
            }
        })?;
        actor.push_notice(&format!(
            "you took {amount} units of energy from {target_id}."
        ));
    }

    Ok(())
}

/// Subtract the per-turn usage rate, only for a still-alive agent.
fn apply_metabolism(world: &mut WorldState, agent_id: &str) -> Result<(), ApplyError> {
    let usage = world.usage_rate;
    if let Some(agent) = world.alive_agent_mut(agent_id) {
        agent.energy = agent.energy.checked_sub(usage).ok_or_else(|| {
            ApplyError::ArithmeticOverflow {
                context: "metabolism debit".to_owned(),
            }
        })?;
    }
    Ok(())
}

/// Mark the agent deceased and notify the survivors.
fn apply_death(world: &mut WorldState, agent_id: &str) -> Result<(), ApplyError> {
    if world.alive_agent(agent_id).is_none() {
        return Err(ApplyError::AgentNotAlive {
            agent_id: agent_id.to_owned(),
        });
    }

    if let Some(agent) = world.agent_mut(agent_id) {
        agent.status = commons_types::AgentStatus::Deceased;
    }

    let notice = format!("Agent {agent_id} has died.");
    for agent in world.agents.iter_mut().filter(|a| a.is_alive()) {
        agent.push_notice(&notice);
    }

    Ok(())
}

/// Close a turn: personalized energy report to the agent, generic broadcast
/// to everyone else alive.
fn apply_end_turn(world: &mut WorldState, agent_id: &str) -> Result<(), ApplyError> {
    for agent in world.agents.iter_mut().filter(|a| a.is_alive()) {
        if agent.id == agent_id {
            let energy = agent.energy;
            agent.push_notice(&format!("You have {energy} energy remaining."));
        } else {
            agent.push_notice(&format!("Agent {agent_id} completed their turn."));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use commons_types::{AgentRecord, AgentStatus};

    use super::*;

    fn make_world() -> WorldState {
        WorldState {
            agents: vec![
                AgentRecord::new("agent_0".to_owned(), 300, "always-skip".to_owned()),
                AgentRecord::new("agent_1".to_owned(), 200, "always-skip".to_owned()),
                AgentRecord::new("agent_2".to_owned(), 100, "always-skip".to_owned()),
            ],
            total_rounds: 10,
            usage_rate: 100,
            pool: 2800,
            receiver_id: "agent_0".to_owned(),
            current_round: 0,
        }
    }

    fn last_notice(world: &WorldState, agent_id: &str) -> String {
        world
            .agent(agent_id)
            .unwrap()
            .transcript
            .last()
            .unwrap()
            .content
            .clone()
    }

    #[test]
    fn grant_credits_receiver_and_debits_pool() {
        let mut world = make_world();
        Event::GrantEnergy.apply(&mut world).unwrap();

        // ceil(2800 / 10) = 280
        assert_eq!(world.pool, 2520);
        assert_eq!(world.agent("agent_0").unwrap().energy, 580);
        assert_eq!(
            last_notice(&world, "agent_0"),
            "from system: You have been given 280 units of energy from the environment."
        );
    }

    #[test]
    fn grant_rounds_up() {
        let mut world = make_world();
        world.pool = 2801;
        Event::GrantEnergy.apply(&mut world).unwrap();
        // ceil(2801 / 10) = 281
        assert_eq!(world.pool, 2520);
        assert_eq!(world.agent("agent_0").unwrap().energy, 581);
    }

    #[test]
    fn grant_with_deceased_receiver_leaves_pool_untouched() {
        let mut world = make_world();
        world.agent_mut("agent_0").unwrap().status = AgentStatus::Deceased;

        Event::GrantEnergy.apply(&mut world).unwrap();
        assert_eq!(world.pool, 2800);
        assert_eq!(world.agent("agent_0").unwrap().energy, 300);
    }

    #[test]
    fn grant_with_no_rounds_remaining_fails() {
        let mut world = make_world();
        world.current_round = 10;
        let result = Event::GrantEnergy.apply(&mut world);
        assert!(matches!(
            result,
            Err(ApplyError::NoRoundsRemaining { current_round: 10 })
        ));
    }

    #[test]
    fn speak_reaches_all_alive_peers_but_not_the_speaker() {
        let mut world = make_world();
        world.agent_mut("agent_2").unwrap().status = AgentStatus::Deceased;

        let event = Event::Action {
            agent_id: "agent_0".to_owned(),
            action: Action::Speak {
                message: "share the pool".to_owned(),
            },
        };
        event.apply(&mut world).unwrap();

        assert!(world.agent("agent_0").unwrap().transcript.is_empty());
        assert_eq!(
            last_notice(&world, "agent_1"),
            "from agent_0: share the pool"
        );
        assert!(world.agent("agent_2").unwrap().transcript.is_empty());
    }

    #[test]
    fn give_transfers_and_notifies_both_parties() {
        let mut world = make_world();
        let event = Event::Action {
            agent_id: "agent_0".to_owned(),
            action: Action::Give {
                target: "agent_1".to_owned(),
                amount: 50,
            },
        };
        event.apply(&mut world).unwrap();

        assert_eq!(world.agent("agent_0").unwrap().energy, 250);
        assert_eq!(world.agent("agent_1").unwrap().energy, 250);
        assert_eq!(
            last_notice(&world, "agent_0"),
            "from system: you gave agent_1 50 units of energy."
        );
        assert_eq!(
            last_notice(&world, "agent_1"),
            "from system: agent agent_0 gave you 50 units of energy."
        );
    }

    #[test]
    fn give_is_clamped_to_actor_holdings() {
        let mut world = make_world();
        let event = Event::Action {
            agent_id: "agent_2".to_owned(),
            action: Action::Give {
                target: "agent_0".to_owned(),
                amount: 500,
            },
        };
        event.apply(&mut world).unwrap();

        assert_eq!(world.agent("agent_2").unwrap().energy, 0);
        assert_eq!(world.agent("agent_0").unwrap().energy, 400);
    }

    #[test]
    fn give_to_invalid_target_only_notifies_actor() {
        let mut world = make_world();
        world.agent_mut("agent_1").unwrap().status = AgentStatus::Deceased;

        for target in ["agent_1", "nobody"] {
            let event = Event::Action {
                agent_id: "agent_0".to_owned(),
                action: Action::Give {
                    target: target.to_owned(),
                    amount: 50,
                },
            };
            event.apply(&mut world).unwrap();

            assert_eq!(world.agent("agent_0").unwrap().energy, 300);
            assert_eq!(world.agent("agent_1").unwrap().energy, 200);
            assert_eq!(
                last_notice(&world, "agent_0"),
                format!("from system: target {target} is invalid.")
            );
        }
    }

    #[test]
    fn take_is_clamped_to_target_holdings() {
        let mut world = make_world();
        let event = Event::Action {
            agent_id: "agent_0".to_owned(),
            action: Action::Take {
                target: "agent_2".to_owned(),
                amount: 9999,
            },
        };
        event.apply(&mut world).unwrap();

        assert_eq!(world.agent("agent_0").unwrap().energy, 400);
        assert_eq!(world.agent("agent_2").unwrap().energy, 0);
        assert_eq!(
            last_notice(&world, "agent_0"),
            "from system: you took 100 units of energy from agent_2."
        );
        assert_eq!(
            last_notice(&world, "agent_2"),
            "from system: agent agent_0 took 100 units of energy from you."
        );
    }

    #[test]
    fn negative_transfer_amounts_move_nothing() {
        let mut world = make_world();
        let event = Event::Action {
            agent_id: "agent_0".to_owned(),
            action: Action::Take {
                target: "agent_1".to_owned(),
                amount: -50,
            },
        };
        event.apply(&mut world).unwrap();
        assert_eq!(world.agent("agent_0").unwrap().energy, 300);
        assert_eq!(world.agent("agent_1").unwrap().energy, 200);
    }

    #[test]
    fn action_by_dead_agent_is_a_noop() {
        let mut world = make_world();
        world.agent_mut("agent_0").unwrap().status = AgentStatus::Deceased;

        let event = Event::Action {
            agent_id: "agent_0".to_owned(),
            action: Action::Take {
                target: "agent_1".to_owned(),
                amount: 50,
            },
        };
        event.apply(&mut world).unwrap();
        assert_eq!(world.agent("agent_1").unwrap().energy, 200);
        assert!(world.agent("agent_1").unwrap().transcript.is_empty());
    }

    #[test]
    fn metabolism_hits_only_the_living() {
        let mut world = make_world();
        Event::Metabolism {
            agent_id: "agent_0".to_owned(),
        }
        .apply(&mut world)
        .unwrap();
        assert_eq!(world.agent("agent_0").unwrap().energy, 200);

        world.agent_mut("agent_1").unwrap().status = AgentStatus::Deceased;
        Event::Metabolism {
            agent_id: "agent_1".to_owned(),
        }
        .apply(&mut world)
        .unwrap();
        assert_eq!(world.agent("agent_1").unwrap().energy, 200);
    }

    #[test]
    fn death_freezes_energy_and_notifies_survivors() {
        let mut world = make_world();
        world.agent_mut("agent_2").unwrap().energy = -40;

        Event::Death {
            agent_id: "agent_2".to_owned(),
        }
        .apply(&mut world)
        .unwrap();

        let deceased = world.agent("agent_2").unwrap();
        assert_eq!(deceased.status, AgentStatus::Deceased);
        assert_eq!(deceased.energy, -40);
        assert_eq!(
            last_notice(&world, "agent_0"),
            "from system: Agent agent_2 has died."
        );
        assert_eq!(
            last_notice(&world, "agent_1"),
            "from system: Agent agent_2 has died."
        );
    }

    #[test]
    fn death_of_a_dead_agent_is_a_protocol_violation() {
        let mut world = make_world();
        world.agent_mut("agent_2").unwrap().status = AgentStatus::Deceased;

        let result = Event::Death {
            agent_id: "agent_2".to_owned(),
        }
        .apply(&mut world);
        assert!(matches!(
            result,
            Err(ApplyError::AgentNotAlive { agent_id }) if agent_id == "agent_2"
        ));
    }

    #[test]
    fn end_turn_reports_energy_and_broadcasts() {
        let mut world = make_world();
        Event::EndTurn {
            agent_id: "agent_1".to_owned(),
        }
        .apply(&mut world)
        .unwrap();

        assert_eq!(
            last_notice(&world, "agent_1"),
            "from system: You have 200 energy remaining."
        );
        assert_eq!(
            last_notice(&world, "agent_0"),
            "from system: Agent agent_1 completed their turn."
        );
    }

    #[test]
    fn end_round_advances_counter() {
        let mut world = make_world();
        Event::EndRound.apply(&mut world).unwrap();
        assert_eq!(world.current_round, 1);
    }

    #[test]
    fn message_event_skips_dead_agents() {
        let mut world = make_world();
        world.agent_mut("agent_0").unwrap().status = AgentStatus::Deceased;

        Event::Message {
            agent_id: "agent_0".to_owned(),
            role: Role::Assistant,
            content: "late reply".to_owned(),
        }
        .apply(&mut world)
        .unwrap();
        assert!(world.agent("agent_0").unwrap().transcript.is_empty());

        Event::Message {
            agent_id: "agent_1".to_owned(),
            role: Role::Assistant,
            content: "reply".to_owned(),
        }
        .apply(&mut world)
        .unwrap();
        assert_eq!(
            world.agent("agent_1").unwrap().transcript.last().unwrap().role,
            Role::Assistant
        );
    }

    #[test]
    fn marker_events_do_not_mutate() {
        let mut world = make_world();
        let before = world.clone();
        for event in [
            Event::StartTurn {
                agent_id: "agent_0".to_owned(),
            },
            Event::Decision {
                agent_id: "agent_0".to_owned(),
                decision: Decision {
                    reasoning: "resting".to_owned(),
                    action: Action::SkipTurn,
                },
            },
            Event::GameOver,
        ] {
            event.apply(&mut world).unwrap();
        }
        assert_eq!(world, before);
    }

    #[test]
    fn event_serde_uses_snake_case_tags() {
        let event = Event::StartTurn {
            agent_id: "agent_0".to_owned(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"event_type":"start_turn","agent_id":"agent_0"}"#);

        let grant: Event = serde_json::from_str(r#"{"event_type":"grant_energy"}"#).unwrap();
        assert_eq!(grant, Event::GrantEnergy);
    }
}
