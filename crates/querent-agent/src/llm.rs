use crate::backends::openai::OpenAiBackend;
use crate::backends::LlmBackend;
use crate::config::ModelConfig;
use crate::stream::{TokenChunk, ToolCallChunk};
use querent_core::{ConversationMessage, QuerentResult, ToolCall};
use querent_skills::SkillDescriptor;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A completed model turn: either a bare answer or a request to call tools.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmResponse {
    /// Final text; the turn ends the loop.
    Done(String),
    /// The model wants tools run.
    ToolUse {
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    },
}

impl LlmResponse {
    /// The assistant message that records this turn in the conversation.
    pub fn into_message(self) -> ConversationMessage {
        match self {
            LlmResponse::Done(text) => ConversationMessage::assistant(text),
            LlmResponse::ToolUse {
                content,
                tool_calls,
            } => ConversationMessage::assistant_with_tool_calls(
                content.unwrap_or_default(),
                tool_calls,
            ),
        }
    }
}

/// Incremental output of a streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionDelta {
    /// A text fragment.
    Text(String),
    /// A tool-call fragment.
    ToolCall(ToolCallChunk),
}

impl From<CompletionDelta> for TokenChunk {
    fn from(delta: CompletionDelta) -> Self {
        match delta {
            CompletionDelta::Text(text) => TokenChunk::text(text),
            CompletionDelta::ToolCall(chunk) => TokenChunk::tool_call(chunk),
        }
    }
}

/// Deltas as they arrive, and a handle resolving to the whole turn.
pub type CompletionStream = (
    mpsc::Receiver<CompletionDelta>,
    JoinHandle<QuerentResult<LlmResponse>>,
);

/// LLM client that dispatches to the provider backend.
pub struct LlmClient {
    backend: Box<dyn LlmBackend>,
}

impl LlmClient {
    /// Build a client for `config`. Fails when no credential can be resolved.
    pub fn new(config: ModelConfig) -> QuerentResult<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self {
            backend: Box::new(OpenAiBackend::new(config, api_key)),
        })
    }

    /// Create from a pre-built backend (for custom providers and tests).
    pub fn from_backend(backend: Box<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// One non-streaming completion.
    pub async fn chat(
        &self,
        messages: &[ConversationMessage],
        tools: &[SkillDescriptor],
    ) -> QuerentResult<LlmResponse> {
        self.backend.chat(messages, tools).await
    }

    /// Streaming completion: deltas arrive on the receiver, the aggregated
    /// turn resolves from the join handle once the receiver is drained.
    pub async fn chat_stream(
        &self,
        messages: &[ConversationMessage],
        tools: &[SkillDescriptor],
    ) -> QuerentResult<CompletionStream> {
        self.backend.chat_stream(messages, tools).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_use_into_message() {
        let call = ToolCall {
            id: "c1".into(),
            name: "get_current_datetime".into(),
            arguments: serde_json::json!({}),
        };
        let msg = LlmResponse::ToolUse {
            content: None,
            tool_calls: vec![call.clone()],
        }
        .into_message();
        assert_eq!(msg.content, "");
        assert_eq!(msg.tool_calls, vec![call]);
        assert!(!msg.is_final_answer());

        assert!(LlmResponse::Done("ok".into()).into_message().is_final_answer());
    }

    #[test]
    fn test_delta_into_token_chunk() {
        let chunk: TokenChunk = CompletionDelta::Text("Hel".into()).into();
        assert_eq!(chunk.text, "Hel");
        assert!(chunk.tool_call_chunks.is_empty());
    }
}
