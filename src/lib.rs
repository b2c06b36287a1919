pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod tools;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::IvitClient;
pub use crate::config::ServiceConfig;
pub use crate::core::workflow::TrainingSubmissionWorkflow;
pub use crate::domain::model::{SubmissionReceipt, TrainingRequest};
pub use crate::tools::{ToolContext, ToolRegistry};
pub use crate::utils::error::{IvitError, Result};
