//! Parsing model replies into typed decisions.
//!
//! The model returns raw text, ideally a JSON object matching the format
//! the briefing asks for. This module extracts and validates that text
//! into a [`Decision`], with recovery strategies for the common ways
//! models wrap their JSON. A reply that still cannot be understood is an
//! error: silently substituting a skip would let a broken backend
//! masquerade as a passive agent.

use commons_types::{Action, Decision};

use crate::error::RunnerError;

/// Parse a raw model reply into a validated [`Decision`].
///
/// Recovery strategies, in order:
/// 1. direct JSON parse
/// 2. extract JSON from a markdown code block
/// 3. strip trailing commas and retry
/// 4. code block extraction, then strip trailing commas
///
/// # Errors
///
/// Returns [`RunnerError::Parse`] if no strategy yields a valid decision.
pub fn parse_decision(raw: &str) -> Result<Decision, RunnerError> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        return convert_value(value);
    }

    if let Some(block) = extract_json_from_codeblock(trimmed)
        && let Ok(value) = serde_json::from_str::<serde_json::Value>(block)
    {
        return convert_value(value);
    }

    let cleaned = strip_trailing_commas(trimmed);
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned) {
        return convert_value(value);
    }

    if let Some(block) = extract_json_from_codeblock(trimmed) {
        let cleaned_inner = strip_trailing_commas(block);
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&cleaned_inner) {
            return convert_value(value);
        }
    }

    Err(RunnerError::Parse(format!(
        "all parse strategies failed for: {trimmed}"
    )))
}

/// Convert a parsed JSON value into a decision.
///
/// Accepts the canonical `{reasoning, action: {action, ...}}` shape, an
/// `action` given as a bare string, and the legacy nested
/// `{reasoning, decision: {action, params}}` shape.
fn convert_value(value: serde_json::Value) -> Result<Decision, RunnerError> {
    if let Ok(decision) = serde_json::from_value::<Decision>(value.clone()) {
        return Ok(decision);
    }

    let Some(object) = value.as_object() else {
        return Err(RunnerError::Parse("reply is not a JSON object".to_owned()));
    };
    let reasoning = object
        .get("reasoning")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_owned();

    if let Some(name) = object.get("action").and_then(serde_json::Value::as_str) {
        return Ok(Decision {
            reasoning,
            action: action_from_parts(name, &serde_json::Value::Null)?,
        });
    }

    if let Some(nested) = object.get("decision") {
        let name = nested
            .get("action")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                RunnerError::Parse("nested decision is missing an action name".to_owned())
            })?;
        let params = nested
            .get("params")
            .cloned()
            .unwrap_or(serde_json::Value::Null);
        return Ok(Decision {
            reasoning,
            action: action_from_parts(name, &params)?,
        });
    }

    Err(RunnerError::Parse(
        "reply carries neither an action nor a nested decision".to_owned(),
    ))
}

/// Build a typed [`Action`] from an action name and loose parameters.
fn action_from_parts(name: &str, params: &serde_json::Value) -> Result<Action, RunnerError> {
    let normalized = normalize_action_name(name);
    let mut merged = serde_json::Map::new();
    merged.insert("action".to_owned(), serde_json::Value::String(normalized));
    if let Some(map) = params.as_object() {
        for (key, value) in map {
            merged.insert(key.clone(), value.clone());
        }
    }
    serde_json::from_value::<Action>(serde_json::Value::Object(merged))
        .map_err(|e| RunnerError::Parse(format!("invalid action `{name}`: {e}")))
}

/// Normalize common model spellings to the snake_case action tags.
fn normalize_action_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    match lower.as_str() {
        "skipturn" | "skip" => "skip_turn".to_owned(),
        _ => lower,
    }
}

/// Extract the contents of the first markdown code block, if any.
fn extract_json_from_codeblock(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once("```")?;
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let (block, _) = rest.split_once("```")?;
    Some(block.trim())
}

/// Strip trailing commas before closing braces and brackets, a common
/// model output error.
fn strip_trailing_commas(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ',' {
            let mut whitespace = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() {
                    whitespace.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if !matches!(chars.peek(), Some(&('}' | ']'))) {
                result.push(',');
            }
            result.push_str(&whitespace);
        } else {
            result.push(c);
        }
    }
    result
}
