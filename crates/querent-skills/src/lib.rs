//! Tools (skills) the Querent assistant may call while reasoning.
//!
//! - [`Skill`]: trait implemented by every tool.
//! - [`SkillRegistry`]: name-indexed set of skills the agent advertises to the model.
//! - [`builtins`]: ready-to-use skills, see [`register_builtins()`].

/// Built-in skills.
pub mod builtins;
/// Skill lookup and dispatch.
pub mod registry;
/// The skill trait.
pub mod skill;

pub use builtins::{register_builtins, CurrentDateTimeSkill};
pub use registry::SkillRegistry;
pub use skill::{Skill, SkillDescriptor};
