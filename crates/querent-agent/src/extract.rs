//! Answer extraction for single-shot assistant results.
//!
//! The result shape is not fixed, so extraction walks a short list of rules in
//! precedence order. Each rule checks the shape it needs and declines otherwise;
//! if none applies the whole result is stringified.

use crate::assistant::Assistant;
use crate::render::stringify;
use crate::strategy::AgentOutcome;
use querent_core::{ConversationMessage, QuerentResult};
use serde_json::Value;
use tracing::debug;

type ExtractionRule = fn(&Value) -> Option<String>;

const RULES: &[(&str, ExtractionRule)] = &[
    ("output", from_output_field),
    ("messages", from_last_message),
];

/// Invoke the assistant once and extract its answer. Never produces steps.
pub async fn extract(
    assistant: &dyn Assistant,
    conversation: &[ConversationMessage],
) -> QuerentResult<AgentOutcome> {
    let result = assistant.invoke(conversation).await?;
    Ok(AgentOutcome {
        response: extract_response(&result),
        stream_modes: Vec::new(),
    })
}

/// Apply the extraction rules to an invoke result. Never fails.
pub fn extract_response(result: &Value) -> String {
    RULES
        .iter()
        .find_map(|(name, rule)| {
            let text = rule(result)?;
            debug!(rule = *name, "Extracted invoke answer");
            Some(text)
        })
        .unwrap_or_else(|| stringify(result))
}

fn from_output_field(result: &Value) -> Option<String> {
    let output = result.as_object()?.get("output")?;
    (!is_empty_value(output)).then(|| stringify(output))
}

/// Content of the last message, as plain text.
fn from_last_message(result: &Value) -> Option<String> {
    let last = result.as_object()?.get("messages")?.as_array()?.last()?;
    match last.as_object().and_then(|message| message.get("content")) {
        Some(content) => Some(stringify(content)),
        None => Some(stringify(last)),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
