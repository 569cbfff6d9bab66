use crate::assistant::Assistant;
use crate::render::{render_completed_message, render_token_chunk, stringify};
use crate::strategy::AgentOutcome;
use crate::stream::{StreamEvent, StreamMode};
use futures_util::StreamExt;
use querent_core::{ConversationMessage, QuerentResult, StepInfo, StreamModeInfo};
use tracing::debug;

/// Step label used for token chunks.
pub const TOKEN_STEP: &str = "Token";

/// Reduces a multiplexed event sequence into an answer plus per-mode traces.
///
/// Events are folded in emission order. The answer is the rendered text of the
/// most recent step-update whose last message is a bare assistant answer.
#[derive(Debug, Default)]
pub struct StreamAggregator {
    token: Vec<StepInfo>,
    step_update: Vec<StepInfo>,
    custom: Vec<StepInfo>,
    final_response: String,
}

impl StreamAggregator {
    /// An empty aggregator with no candidate answer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one event into its mode's step list.
    pub fn observe(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Token(chunk) => {
                let rendered = render_token_chunk(&chunk);
                if !rendered.is_empty() {
                    self.token.push(StepInfo::new(TOKEN_STEP, rendered));
                }
            }
            StreamEvent::StepUpdate(steps) => {
                for (step, snapshot) in steps {
                    let Some(last) = snapshot.messages.last() else {
                        continue;
                    };
                    let rendered = render_completed_message(last);
                    if last.is_final_answer() {
                        self.final_response.clone_from(&rendered);
                    }
                    self.step_update.push(StepInfo::new(step, rendered));
                }
            }
            StreamEvent::Custom(payload) => {
                self.custom.push(StepInfo::new("", stringify(&payload)));
            }
        }
    }

    /// Current answer candidate; empty until a bare assistant answer is seen.
    pub fn final_response(&self) -> &str {
        &self.final_response
    }

    /// Assemble the outcome. Modes without steps are dropped; the rest keep
    /// the order token, step-update, custom.
    pub fn finish(self) -> AgentOutcome {
        let stream_modes = [
            (StreamMode::Token, self.token),
            (StreamMode::StepUpdate, self.step_update),
            (StreamMode::Custom, self.custom),
        ]
        .into_iter()
        .filter(|(_, steps)| !steps.is_empty())
        .map(|(mode, steps)| StreamModeInfo {
            mode: mode.as_str().to_string(),
            steps,
        })
        .collect();

        AgentOutcome {
            response: self.final_response,
            stream_modes,
        }
    }
}

/// Drain the assistant's event sequence for `conversation` and reduce it.
///
/// The first `Err` item aborts the drain and is returned as-is.
pub async fn aggregate(
    assistant: &dyn Assistant,
    conversation: &[ConversationMessage],
) -> QuerentResult<AgentOutcome> {
    let mut events = assistant.stream(conversation, &StreamMode::ALL);
    let mut aggregator = StreamAggregator::new();
    let mut seen = 0usize;

    while let Some(event) = events.next().await {
        let event = event?;
        seen += 1;
        debug!(mode = %event.mode(), seen, "Stream event");
        aggregator.observe(event);
    }

    debug!(events = seen, "Stream drained");
    Ok(aggregator.finish())
}
