//! The setup briefing injected into each agent's transcript.
//!
//! Injected once at engine construction, before the initial snapshot is
//! taken, so the briefing is part of the replay baseline rather than of
//! the event log.

use commons_types::{AgentRecord, WorldState};

/// Render the system briefing for one agent.
///
/// States the agent's name, starting energy, the group size and turn
/// order, the action set, the expected response format, and the per-turn
/// usage cost.
#[must_use]
pub fn briefing_message(agent: &AgentRecord, world: &WorldState) -> String {
    let group_order = world.turn_order().join(", ");
    format!(
        "You are an autonomous agent.\n\
         Your name is {agent_name}.\n\
         You currently have {starting_energy} units of energy.\n\
         You are part of a group of {group_size} agents.\n\
         \n\
         You need to manage your energy by taking turns selecting from one of the following actions:\n\
         - speak\n\
         - give\n\
         - take\n\
         - skip_turn\n\
         \n\
         Your response will be a JSON object in the format:\n\
         {{\n\
         \x20   \"reasoning\": <your reasoning for your choice>,\n\
         \x20   \"action\": {{\n\
         \x20       \"action\": <the action you selected>,\n\
         \x20       ...the parameters specific to your choice\n\
         \x20   }}\n\
         }}\n\
         \n\
         At the end of each turn, you lose {usage_rate} units of energy.\n\
         \n\
         One of you will be selected on behalf of the group to receive energy at the start of each round.\n\
         \n\
         The group order will be: {group_order}\n",
        agent_name = agent.id,
        starting_energy = agent.energy,
        group_size = world.agents.len(),
        usage_rate = world.usage_rate,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn briefing_names_the_agent_and_the_order() {
        let world = WorldState {
            agents: vec![
                AgentRecord::new("agent_0".to_owned(), 300, "always-skip".to_owned()),
                AgentRecord::new("agent_1".to_owned(), 250, "always-skip".to_owned()),
            ],
            total_rounds: 10,
            usage_rate: 100,
            pool: 2800,
            receiver_id: "agent_0".to_owned(),
            current_round: 0,
        };
        let agent = world.agent("agent_1").unwrap();

        let briefing = briefing_message(agent, &world);
        assert!(briefing.contains("Your name is agent_1."));
        assert!(briefing.contains("You currently have 250 units of energy."));
        assert!(briefing.contains("a group of 2 agents"));
        assert!(briefing.contains("you lose 100 units of energy"));
        assert!(briefing.contains("The group order will be: agent_0, agent_1"));
    }
}
