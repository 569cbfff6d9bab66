use crate::tool::{ToolCall, ToolResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role of the participant that authored a [`ConversationMessage`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A system-level instruction.
    System,
    /// A human end-user.
    User,
    /// The model.
    Assistant,
    /// Output produced by a tool invocation.
    Tool,
}

impl Role {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single role-tagged message exchanged with the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Author of the message.
    pub role: Role,
    /// Text content; empty for pure tool-call turns.
    #[serde(default)]
    pub content: String,
    /// Tool invocations requested by an assistant message, in emission order.
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    /// For tool messages: the id of the call this message answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For tool messages: the name of the tool that produced the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ConversationMessage {
    /// A plain message with no tool metadata.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    /// A system instruction.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// An assistant text reply.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// An assistant message that requests tool invocations.
    pub fn assistant_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// A tool message answering the call identified by `call_id`.
    pub fn tool(call_id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            name: Some(name.into()),
            ..Self::new(Role::Tool, content)
        }
    }

    /// Backfill a tool execution outcome as a tool message.
    pub fn from_tool_result(result: &ToolResult, name: impl Into<String>) -> Self {
        let content = if result.is_error {
            format!("Error: {}", result.content)
        } else {
            result.content.clone()
        };
        Self::tool(result.call_id.clone(), name, content)
    }

    /// True for an assistant message that carries no tool calls, i.e. a bare answer.
    pub fn is_final_answer(&self) -> bool {
        self.role == Role::Assistant && self.tool_calls.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = ConversationMessage::user("What time is it?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "What time is it?");
        assert!(msg.tool_calls.is_empty());
        assert!(msg.tool_call_id.is_none());
    }

    #[test]
    fn test_is_final_answer() {
        assert!(ConversationMessage::assistant("It is noon.").is_final_answer());
        assert!(!ConversationMessage::user("hi").is_final_answer());

        let call = ToolCall {
            id: "call_1".into(),
            name: "get_current_datetime".into(),
            arguments: serde_json::json!({}),
        };
        let with_calls = ConversationMessage::assistant_with_tool_calls("", vec![call]);
        assert!(!with_calls.is_final_answer());
    }

    #[test]
    fn test_from_tool_result_marks_errors() {
        let ok = ConversationMessage::from_tool_result(&ToolResult::success("c1", "42"), "calc");
        assert_eq!(ok.role, Role::Tool);
        assert_eq!(ok.content, "42");
        assert_eq!(ok.tool_call_id.as_deref(), Some("c1"));
        assert_eq!(ok.name.as_deref(), Some("calc"));

        let err = ConversationMessage::from_tool_result(&ToolResult::error("c2", "boom"), "calc");
        assert_eq!(err.content, "Error: boom");
    }

    #[test]
    fn test_message_deserializes_without_optional_fields() {
        let msg: ConversationMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"Hello!"}"#).unwrap();
        assert!(msg.is_final_answer());
        assert_eq!(msg.content, "Hello!");
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), "\"tool\"");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
