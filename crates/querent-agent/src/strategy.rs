use crate::aggregate::aggregate;
use crate::assistant::Assistant;
use crate::extract::extract;
use parking_lot::RwLock;
use querent_core::{ConversationMessage, QuerentError, QuerentResult, StreamModeInfo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// What a strategy hands back to the processor on success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentOutcome {
    /// Final answer text.
    pub response: String,
    /// Non-empty modes in fixed order.
    pub stream_modes: Vec<StreamModeInfo>,
}

/// How the assistant's output is turned into an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStrategy {
    /// Drain the event stream and keep a per-mode trace.
    #[default]
    Stream,
    /// One blocking call, answer only.
    Invoke,
}

impl ResponseStrategy {
    /// Wire name: `stream` or `invoke`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStrategy::Stream => "stream",
            ResponseStrategy::Invoke => "invoke",
        }
    }

    /// Run this strategy against `assistant`.
    pub async fn run(
        self,
        assistant: &dyn Assistant,
        conversation: &[ConversationMessage],
    ) -> QuerentResult<AgentOutcome> {
        match self {
            ResponseStrategy::Stream => aggregate(assistant, conversation).await,
            ResponseStrategy::Invoke => extract(assistant, conversation).await,
        }
    }
}

impl fmt::Display for ResponseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseStrategy {
    type Err = QuerentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stream" => Ok(ResponseStrategy::Stream),
            "invoke" => Ok(ResponseStrategy::Invoke),
            other => Err(QuerentError::Config(format!(
                "unknown response strategy '{other}' (expected 'stream' or 'invoke')"
            ))),
        }
    }
}

/// The replaceable default strategy for the primary query route.
///
/// Readers take a copy once per request; a concurrent `set` only affects
/// requests that read afterwards.
#[derive(Debug, Default)]
pub struct StrategySelector {
    current: RwLock<ResponseStrategy>,
}

impl StrategySelector {
    /// Selector starting at `initial`.
    pub fn new(initial: ResponseStrategy) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Snapshot of the current default.
    pub fn current(&self) -> ResponseStrategy {
        *self.current.read()
    }

    /// Replace the default and return the previous one.
    pub fn set(&self, strategy: ResponseStrategy) -> ResponseStrategy {
        let previous = std::mem::replace(&mut *self.current.write(), strategy);
        info!(from = %previous, to = %strategy, "Default response strategy changed");
        previous
    }
}
