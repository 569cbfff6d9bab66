use crate::registry::SkillRegistry;
use crate::skill::{Skill, SkillDescriptor};
use async_trait::async_trait;
use querent_core::{QuerentResult, ToolCall, ToolResult};
use std::sync::Arc;

/// Register the standard set of built-in skills.
pub fn register_builtins(registry: &mut SkillRegistry) {
    registry.register(Arc::new(CurrentDateTimeSkill::new()));
}

/// Returns the current local date and time as `%Y-%m-%d %H:%M:%S`.
pub struct CurrentDateTimeSkill {
    descriptor: SkillDescriptor,
}

impl CurrentDateTimeSkill {
    /// The skill with its descriptor.
    pub fn new() -> Self {
        Self {
            descriptor: SkillDescriptor {
                name: "get_current_datetime".to_string(),
                description: "Returns the current date and time.".to_string(),
                parameters_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "query": {
                            "type": "string",
                            "description": "Ignored; may be empty"
                        }
                    },
                    "required": []
                }),
            },
        }
    }
}

impl Default for CurrentDateTimeSkill {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Skill for CurrentDateTimeSkill {
    fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    async fn execute(&self, call: ToolCall) -> QuerentResult<ToolResult> {
        let now = chrono::Local::now();
        Ok(ToolResult::success(
            call.id,
            now.format("%Y-%m-%d %H:%M:%S").to_string(),
        ))
    }
}
