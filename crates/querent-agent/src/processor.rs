use crate::assistant::AssistantFactory;
use crate::strategy::{AgentOutcome, ResponseStrategy};
use querent_core::{ConversationMessage, QueryResult, QuerentResult};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// System instruction that opens every conversation.
pub const SYSTEM_INSTRUCTION: &str = "You are Querent, a helpful assistant. Answer the user's \
    question accurately and concisely. You have access to tools; call them whenever they help \
    you answer, for example to look up the current date and time.";

/// Turns a user question into a [`QueryResult`] using one fixed strategy.
///
/// This is the failure boundary: errors from building the assistant or from
/// the strategy become `QueryResult::error`, never a panic or an `Err`.
#[derive(Clone)]
pub struct QueryProcessor {
    factory: Arc<dyn AssistantFactory>,
    strategy: ResponseStrategy,
}

impl QueryProcessor {
    /// Processor bound to `strategy`, building assistants from `factory`.
    pub fn new(factory: Arc<dyn AssistantFactory>, strategy: ResponseStrategy) -> Self {
        Self { factory, strategy }
    }

    /// The strategy this processor runs.
    pub fn strategy(&self) -> ResponseStrategy {
        self.strategy
    }

    /// The two-message conversation sent for `query`.
    pub fn build_conversation(query: &str) -> Vec<ConversationMessage> {
        vec![
            ConversationMessage::system(SYSTEM_INSTRUCTION),
            ConversationMessage::user(query),
        ]
    }

    /// Answer `query`. Every failure lands in `QueryResult::error` with an empty trace.
    pub async fn process(&self, query: &str) -> QueryResult {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        info!(
            request_id = %request_id,
            strategy = %self.strategy,
            query_len = query.len(),
            "Processing query"
        );

        match self.run(query).await {
            Ok(outcome) => {
                info!(
                    request_id = %request_id,
                    response_len = outcome.response.len(),
                    modes = outcome.stream_modes.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Query completed"
                );
                QueryResult::success(outcome.response, outcome.stream_modes)
            }
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Query failed"
                );
                QueryResult::failure(&e)
            }
        }
    }

    async fn run(&self, query: &str) -> QuerentResult<AgentOutcome> {
        let conversation = Self::build_conversation(query);
        let assistant = self.factory.build()?;
        self.strategy.run(assistant.as_ref(), &conversation).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use querent_core::Role;

    #[test]
    fn test_conversation_shape() {
        let conversation = QueryProcessor::build_conversation("What time is it?");
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation[0].role, Role::System);
        assert_eq!(conversation[0].content, SYSTEM_INSTRUCTION);
        assert_eq!(conversation[1].role, Role::User);
        assert_eq!(conversation[1].content, "What time is it?");
    }
}
