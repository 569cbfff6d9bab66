//! Core types and error definitions for Querent.
//!
//! This crate provides the foundational types shared across all Querent crates:
//! the conversation model handed to the assistant, tool-call descriptors, the
//! normalized query result returned to callers, and the unified error type.
//!
//! # Main types
//!
//! - [`QuerentError`]: Unified error enum for all Querent subsystems.
//! - [`QuerentResult`]: Convenience alias for `Result<T, QuerentError>`.
//! - [`Role`] / [`ConversationMessage`]: A role-tagged message in a conversation.
//! - [`ToolCall`] / [`ToolResult`]: Tool invocation request and its outcome.
//! - [`QueryResult`]: Final answer plus ordered step trace, or an error.

/// Error type.
pub mod error;
/// Conversation messages.
pub mod message;
/// Query results and traces.
pub mod query;
/// Tool calls and results.
pub mod tool;

pub use error::{QuerentError, QuerentResult};
pub use message::{ConversationMessage, Role};
pub use query::{QueryResult, StepInfo, StreamModeInfo};
pub use tool::{ToolCall, ToolResult};
