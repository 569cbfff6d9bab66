//! Display strings for raw assistant output.

use crate::stream::TokenChunk;
use querent_core::{ConversationMessage, Role};

/// Render a partial token chunk.
///
/// Text wins over tool-call fragments. An empty string means the chunk carried
/// nothing worth recording.
pub fn render_token_chunk(chunk: &TokenChunk) -> String {
    if !chunk.text.is_empty() {
        return chunk.text.clone();
    }
    if !chunk.tool_call_chunks.is_empty() {
        return serde_json::to_string(&chunk.tool_call_chunks)
            .unwrap_or_else(|_| format!("{:?}", chunk.tool_call_chunks));
    }
    String::new()
}

/// Render a completed role-tagged message.
pub fn render_completed_message(message: &ConversationMessage) -> String {
    match message.role {
        Role::Assistant if !message.tool_calls.is_empty() => {
            let calls = serde_json::to_string(&message.tool_calls)
                .unwrap_or_else(|_| format!("{:?}", message.tool_calls));
            format!("Tool Calls: {calls}")
        }
        Role::Assistant => message.content.clone(),
        Role::Tool => format!("Tool Result: {}", message.content),
        Role::System | Role::User => {
            serde_json::to_string(message).unwrap_or_else(|_| message.content.clone())
        }
    }
}

/// Best-effort text for an arbitrary JSON value: strings bare, everything else as JSON.
pub fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
