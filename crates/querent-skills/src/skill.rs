use async_trait::async_trait;
use querent_core::{QuerentResult, ToolCall, ToolResult};
use serde::{Deserialize, Serialize};

/// Metadata describing a skill's interface, as advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillDescriptor {
    /// Name the model calls the tool by.
    pub name: String,
    /// What the tool does, shown to the model.
    pub description: String,
    /// JSON Schema of the call arguments.
    pub parameters_schema: serde_json::Value,
}

/// Trait that all skills must implement.
#[async_trait]
pub trait Skill: Send + Sync {
    /// Interface advertised to the model.
    fn descriptor(&self) -> &SkillDescriptor;

    /// Run one call. A tool-level failure may be an `Ok` error result.
    async fn execute(&self, call: ToolCall) -> QuerentResult<ToolResult>;
}
