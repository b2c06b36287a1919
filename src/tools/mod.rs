//! Agent-facing tool adapters over the iVIT-T API.

pub mod ivit;
pub mod registry;
pub mod tool;

pub use ivit::{DefaultParamsTool, ListModelsTool, ListProjectsTool, SharedService, TrainingTool};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolContext, ToolOutput, ToolSchema, UserIdentity};
