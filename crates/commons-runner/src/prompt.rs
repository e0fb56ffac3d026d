//! Turn prompt rendering via `minijinja`.
//!
//! The briefing in the transcript establishes the rules once; the turn
//! prompt gives the model the current numbers (round, pool, energy, who
//! is alive) and asks for a JSON decision. The template is compiled in
//! rather than loaded from disk -- there is exactly one prompt and it is
//! part of the experiment definition.

use commons_types::{Observation, Role};
use minijinja::Environment;

use crate::error::RunnerError;
use crate::llm::{ChatRequest, ChatTurn};

const TURN_TEMPLATE: &str = "\
It is your turn, {{ agent.id }}.

Round {{ current_round + 1 }} of {{ total_rounds }}. The shared pool holds \
{{ pool }} units of energy and {{ receiver_id }} receives the grant each round.
You currently have {{ agent.energy }} units of energy.
{%- if alive_peers %}
Other agents still alive: {{ alive_peers | join(', ') }}.
{%- else %}
No other agents are alive.
{%- endif %}
{%- if deceased_peers %}
Deceased: {{ deceased_peers | join(', ') }}.
{%- endif %}

Respond with a single JSON object in the format described in your briefing.
";

/// Renders turn prompts and assembles backend requests from transcripts.
pub struct PromptBuilder {
    env: Environment<'static>,
}

impl PromptBuilder {
    /// Template name of the turn prompt.
    const TURN: &'static str = "turn";

    /// Create a builder with the compiled-in turn template.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] if the template fails to compile.
    pub fn new() -> Result<Self, RunnerError> {
        let mut env = Environment::new();
        env.add_template(Self::TURN, TURN_TEMPLATE)
            .map_err(|e| RunnerError::Template(format!("failed to add turn template: {e}")))?;
        Ok(Self { env })
    }

    /// Render the turn prompt for an observation.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Template`] on render failure or
    /// [`RunnerError::Serde`] if the observation cannot be serialized.
    pub fn render_turn_prompt(&self, observation: &Observation) -> Result<String, RunnerError> {
        let context = serde_json::to_value(observation)?;
        self.env
            .get_template(Self::TURN)
            .map_err(|e| RunnerError::Template(format!("missing turn template: {e}")))?
            .render(context)
            .map_err(|e| RunnerError::Template(format!("turn render failed: {e}")))
    }

    /// Assemble a complete backend request for one turn.
    ///
    /// Leading system messages in the transcript become the request's
    /// system text; the remaining transcript is forwarded as conversation
    /// turns, with the rendered turn prompt appended as the final user
    /// turn.
    ///
    /// # Errors
    ///
    /// Propagates turn prompt rendering failures.
    pub fn build_request(&self, observation: &Observation) -> Result<ChatRequest, RunnerError> {
        let mut system_parts = Vec::new();
        let mut turns = Vec::new();
        for message in &observation.agent.transcript {
            if message.role == Role::System && turns.is_empty() {
                system_parts.push(message.content.clone());
            } else {
                turns.push(ChatTurn {
                    role: message.role,
                    content: message.content.clone(),
                });
            }
        }
        turns.push(ChatTurn {
            role: Role::User,
            content: self.render_turn_prompt(observation)?,
        });

        Ok(ChatRequest {
            system: system_parts.join("\n\n"),
            turns,
        })
    }
}
