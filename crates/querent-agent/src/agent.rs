use crate::assistant::{Assistant, AssistantFactory};
use crate::config::ModelConfig;
use crate::llm::LlmClient;
use crate::stream::{EventStream, StreamEvent, StreamMode};
use async_trait::async_trait;
use querent_core::{ConversationMessage, QuerentError, QuerentResult, ToolCall, ToolResult};
use querent_skills::{SkillDescriptor, SkillRegistry};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

/// Step name for model turns in step updates.
pub const MODEL_STEP: &str = "model";
/// Step name for tool rounds in step updates.
pub const TOOLS_STEP: &str = "tools";

/// A tool-using assistant: prompt → model → tool calls → execute → backfill → repeat.
pub struct ToolAgent {
    inner: Arc<AgentLoop>,
}

struct AgentLoop {
    llm: LlmClient,
    skills: Arc<SkillRegistry>,
    max_turns: u32,
}

impl ToolAgent {
    /// Build an agent for `config`. Fails with a config error when no
    /// credential is available.
    pub fn new(config: ModelConfig, skills: Arc<SkillRegistry>) -> QuerentResult<Self> {
        let max_turns = config.max_turns;
        let llm = LlmClient::new(config)?;
        Ok(Self::with_client(llm, skills, max_turns))
    }

    /// Wrap an existing client, mostly for tests against a fake server.
    pub fn with_client(llm: LlmClient, skills: Arc<SkillRegistry>, max_turns: u32) -> Self {
        Self {
            inner: Arc::new(AgentLoop {
                llm,
                skills,
                max_turns,
            }),
        }
    }
}

#[async_trait]
impl Assistant for ToolAgent {
    async fn invoke(&self, conversation: &[ConversationMessage]) -> QuerentResult<serde_json::Value> {
        let messages = self.inner.run_to_completion(conversation.to_vec()).await?;
        Ok(serde_json::json!({ "messages": serde_json::to_value(&messages)? }))
    }

    fn stream(&self, conversation: &[ConversationMessage], modes: &[StreamMode]) -> EventStream {
        let (tx, rx) = mpsc::channel::<QuerentResult<StreamEvent>>(256);
        let failure_tx = tx.clone();
        let agent = self.inner.clone();
        let conversation = conversation.to_vec();
        let emitter = Emitter {
            tx,
            modes: modes.to_vec(),
        };

        // The loop runs in its own task so a panic surfaces as a JoinError
        // here instead of silently closing the channel.
        tokio::spawn(async move {
            let run = tokio::spawn(async move { agent.run_streaming(conversation, &emitter).await });
            let failure = match run.await {
                Ok(Ok(())) => return,
                Ok(Err(e)) => e,
                Err(e) => QuerentError::Upstream(format!("agent run aborted: {e}")),
            };
            warn!(error = %failure, "Streaming run failed");
            let _ = failure_tx.send(Err(failure)).await;
        });

        Box::pin(ReceiverStream::new(rx))
    }
}

/// Forwards events for the requested modes to the consumer.
struct Emitter {
    tx: mpsc::Sender<QuerentResult<StreamEvent>>,
    modes: Vec<StreamMode>,
}

impl Emitter {
    async fn emit(&self, event: StreamEvent) -> QuerentResult<()> {
        if !self.modes.contains(&event.mode()) {
            return Ok(());
        }
        self.tx
            .send(Ok(event))
            .await
            .map_err(|_| QuerentError::Upstream("stream consumer went away".to_string()))
    }
}

impl AgentLoop {
    fn tool_descriptors(&self) -> Vec<SkillDescriptor> {
        self.skills.list_descriptors().into_iter().cloned().collect()
    }

    fn max_turns_exceeded(&self) -> QuerentError {
        warn!(max_turns = self.max_turns, "Agent loop reached max turns");
        QuerentError::Upstream(format!(
            "Agent loop exceeded maximum of {} turns",
            self.max_turns
        ))
    }

    /// Run the loop with blocking completions; returns the full transcript.
    async fn run_to_completion(
        &self,
        mut messages: Vec<ConversationMessage>,
    ) -> QuerentResult<Vec<ConversationMessage>> {
        let tools = self.tool_descriptors();

        for turn in 0..self.max_turns {
            info!(turn, "Agent loop turn");
            let reply = self.llm.chat(&messages, &tools).await?.into_message();
            let tool_calls = reply.tool_calls.clone();
            messages.push(reply);

            if tool_calls.is_empty() {
                info!(turns = turn + 1, "Agent loop completed");
                return Ok(messages);
            }

            for call in tool_calls {
                messages.push(self.execute_tool(call).await);
            }
        }

        Err(self.max_turns_exceeded())
    }

    /// Run the loop with streaming completions, emitting events as it goes.
    async fn run_streaming(
        &self,
        mut messages: Vec<ConversationMessage>,
        emitter: &Emitter,
    ) -> QuerentResult<()> {
        let tools = self.tool_descriptors();

        for turn in 0..self.max_turns {
            info!(turn, "Agent loop turn (streaming)");
            let (mut deltas, handle) = self.llm.chat_stream(&messages, &tools).await?;

            while let Some(delta) = deltas.recv().await {
                emitter.emit(StreamEvent::Token(delta.into())).await?;
            }

            let reply = handle
                .await
                .map_err(|e| QuerentError::Upstream(format!("completion task failed: {e}")))??
                .into_message();
            emitter
                .emit(StreamEvent::step_update(MODEL_STEP, vec![reply.clone()]))
                .await?;

            if reply.tool_calls.is_empty() {
                info!(turns = turn + 1, "Agent loop completed");
                return Ok(());
            }

            let tool_calls = reply.tool_calls.clone();
            messages.push(reply);

            let mut results = Vec::with_capacity(tool_calls.len());
            for call in tool_calls {
                emitter
                    .emit(StreamEvent::Custom(serde_json::json!({
                        "tool": call.name,
                        "status": "started",
                    })))
                    .await?;
                let result = self.execute_tool(call).await;
                results.push(result.clone());
                messages.push(result);
            }
            emitter
                .emit(StreamEvent::step_update(TOOLS_STEP, results))
                .await?;
        }

        Err(self.max_turns_exceeded())
    }

    /// Execute one call. Failures become error tool messages for the model to see.
    async fn execute_tool(&self, call: ToolCall) -> ConversationMessage {
        info!(tool = %call.name, call_id = %call.id, "Executing tool call");
        let name = call.name.clone();
        let call_id = call.id.clone();

        let result = match self.skills.execute(call).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, tool = %name, "Tool execution failed");
                ToolResult::error(call_id, e.to_string())
            }
        };

        ConversationMessage::from_tool_result(&result, name)
    }
}

/// Builds a fresh [`ToolAgent`] per query.
pub struct ToolAgentFactory {
    config: ModelConfig,
    skills: Arc<SkillRegistry>,
}

impl ToolAgentFactory {
    /// Factory that builds agents from `config` sharing one skill registry.
    pub fn new(config: ModelConfig, skills: Arc<SkillRegistry>) -> Self {
        Self { config, skills }
    }
}

impl AssistantFactory for ToolAgentFactory {
    fn build(&self) -> QuerentResult<Box<dyn Assistant>> {
        let agent = ToolAgent::new(self.config.clone(), self.skills.clone())?;
        info!(
            provider = ?self.config.provider,
            model = %self.config.model_id,
            "Assistant constructed"
        );
        Ok(Box::new(agent))
    }
}
