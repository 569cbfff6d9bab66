//! The Querent assistant layer.
//!
//! A [`QueryProcessor`] turns a user question into a [`querent_core::QueryResult`]:
//! it builds the conversation, obtains a fresh [`Assistant`] from an
//! [`AssistantFactory`], and reduces the assistant's output with the selected
//! [`ResponseStrategy`]:
//!
//! - [`ResponseStrategy::Stream`] drains the multiplexed [`StreamEvent`] sequence
//!   through a [`StreamAggregator`] into an answer plus a per-mode step trace.
//! - [`ResponseStrategy::Invoke`] makes one blocking call and pulls the answer
//!   out of the variable-shaped result (see [`extract`]).
//!
//! [`ToolAgent`] is the concrete assistant: a tool loop over an
//! OpenAI-compatible chat-completions backend and a skill registry.

/// The concrete tool-using assistant.
pub mod agent;
/// Stream reduction into an answer and a trace.
pub mod aggregate;
/// The assistant contract.
pub mod assistant;
/// Chat-completions transports.
pub mod backends;
/// Model and provider settings.
pub mod config;
/// Single-shot answer extraction.
pub mod extract;
/// Provider-agnostic LLM client.
pub mod llm;
/// The per-query orchestrator.
pub mod processor;
/// Display strings for event payloads.
pub mod render;
/// Stream versus invoke selection.
pub mod strategy;
/// Multiplexed event types.
pub mod stream;

pub use agent::{ToolAgent, ToolAgentFactory};
pub use aggregate::StreamAggregator;
pub use assistant::{Assistant, AssistantFactory};
pub use config::{LlmProvider, ModelConfig};
pub use processor::QueryProcessor;
pub use strategy::{AgentOutcome, ResponseStrategy, StrategySelector};
pub use stream::{EventStream, StateSnapshot, StreamEvent, StreamMode, TokenChunk, ToolCallChunk};
