use crate::stream::{EventStream, StreamMode};
use async_trait::async_trait;
use querent_core::{ConversationMessage, QuerentResult};

/// A tool-using reasoning component that answers a conversation.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Single blocking call. The shape of the result is not fixed; callers
    /// inspect it defensively.
    async fn invoke(&self, conversation: &[ConversationMessage]) -> QuerentResult<serde_json::Value>;

    /// Start a run and return its event sequence, restricted to `modes`.
    fn stream(&self, conversation: &[ConversationMessage], modes: &[StreamMode]) -> EventStream;
}

/// Builds a fresh [`Assistant`] per query. Instances are never cached.
pub trait AssistantFactory: Send + Sync {
    /// A new assistant, or a config error when one cannot be built.
    fn build(&self) -> QuerentResult<Box<dyn Assistant>>;
}

impl<F> AssistantFactory for F
where
    F: Fn() -> QuerentResult<Box<dyn Assistant>> + Send + Sync,
{
    fn build(&self) -> QuerentResult<Box<dyn Assistant>> {
        self()
    }
}
