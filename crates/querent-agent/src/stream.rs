use futures_util::Stream;
use indexmap::IndexMap;
use querent_core::{ConversationMessage, QuerentResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;

/// The channels multiplexed in an assistant's event sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamMode {
    /// Partial text or tool-call fragments from the model.
    Token,
    /// Per-step state snapshots, keyed by step name.
    StepUpdate,
    /// Free-form progress notices.
    Custom,
}

impl StreamMode {
    /// Every mode, in trace order.
    pub const ALL: [StreamMode; 3] = [StreamMode::Token, StreamMode::StepUpdate, StreamMode::Custom];

    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamMode::Token => "token",
            StreamMode::StepUpdate => "step-update",
            StreamMode::Custom => "custom",
        }
    }
}

impl fmt::Display for StreamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fragment of an in-progress tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallChunk {
    /// Position of the call within the model turn.
    pub index: u32,
    /// Call id; only on the first fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Tool name; only on the first fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Partial JSON arguments.
    #[serde(default)]
    pub arguments: String,
}

/// Payload of a token event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenChunk {
    /// Text fragment, possibly empty.
    #[serde(default)]
    pub text: String,
    /// Tool-call fragments carried by this chunk.
    #[serde(default)]
    pub tool_call_chunks: Vec<ToolCallChunk>,
}

impl TokenChunk {
    /// A text-only chunk.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tool_call_chunks: Vec::new(),
        }
    }

    /// A chunk carrying one tool-call fragment.
    pub fn tool_call(chunk: ToolCallChunk) -> Self {
        Self {
            text: String::new(),
            tool_call_chunks: vec![chunk],
        }
    }
}

/// Partial state produced by one step. Only `messages` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Messages produced by the step, last one newest.
    #[serde(default)]
    pub messages: Vec<ConversationMessage>,
    /// Any other state keys, kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StateSnapshot {
    /// Snapshot holding only `messages`.
    pub fn with_messages(messages: Vec<ConversationMessage>) -> Self {
        Self {
            messages,
            extra: serde_json::Map::new(),
        }
    }
}

/// One event in the assistant's multiplexed output, tagged by mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "payload", rename_all = "kebab-case")]
pub enum StreamEvent {
    /// A partial output fragment.
    Token(TokenChunk),
    /// Step name → snapshot, in the order the steps reported.
    StepUpdate(IndexMap<String, StateSnapshot>),
    /// A free-form progress notice.
    Custom(serde_json::Value),
}

impl StreamEvent {
    /// Which mode this event belongs to.
    pub fn mode(&self) -> StreamMode {
        match self {
            StreamEvent::Token(_) => StreamMode::Token,
            StreamEvent::StepUpdate(_) => StreamMode::StepUpdate,
            StreamEvent::Custom(_) => StreamMode::Custom,
        }
    }

    /// A step update reported by a single step.
    pub fn step_update(step: impl Into<String>, messages: Vec<ConversationMessage>) -> Self {
        let mut steps = IndexMap::new();
        steps.insert(step.into(), StateSnapshot::with_messages(messages));
        StreamEvent::StepUpdate(steps)
    }
}

/// Lazy, finite, non-restartable event sequence. An `Err` item aborts the drain.
pub type EventStream = Pin<Box<dyn Stream<Item = QuerentResult<StreamEvent>> + Send>>;
