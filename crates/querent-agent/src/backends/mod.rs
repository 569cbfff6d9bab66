/// OpenAI-compatible `/chat/completions` backend.
pub mod openai;

use crate::llm::{CompletionStream, LlmResponse};
use async_trait::async_trait;
use querent_core::{ConversationMessage, QuerentResult};
use querent_skills::SkillDescriptor;

/// Trait for chat-completions provider backends.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Non-streaming chat completion.
    async fn chat(
        &self,
        messages: &[ConversationMessage],
        tools: &[SkillDescriptor],
    ) -> QuerentResult<LlmResponse>;

    /// Streaming chat completion.
    ///
    /// Returns a receiver for deltas and a join handle that resolves to the
    /// aggregated turn.
    async fn chat_stream(
        &self,
        messages: &[ConversationMessage],
        tools: &[SkillDescriptor],
    ) -> QuerentResult<CompletionStream>;
}
