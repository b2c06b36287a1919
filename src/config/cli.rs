use crate::config::toml_config::TomlConfig;
use crate::config::ServiceConfig;
use crate::tools::{ToolContext, UserIdentity};
use crate::utils::error::Result;
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "ivit-tools")]
#[command(about = "Tool adapters for the iVIT-T training service")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "iVIT-T base URL, e.g. http://172.16.92.144")]
    pub base_url: Option<String>,

    #[arg(long, global = true, help = "iVIT-T port")]
    pub port: Option<u16>,

    #[arg(long, global = true, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, short, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit JSON logs")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List all projects
    Projects,
    /// List the models available to a project
    Models {
        #[arg(long)]
        project: String,
    },
    /// Show a project's default training parameters
    Defaults {
        #[arg(long)]
        project: String,
    },
    /// Start a new training iteration
    Train {
        #[arg(long)]
        project: String,
        #[arg(long, allow_negative_numbers = true)]
        batch_size: Option<i64>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        step: Option<i64>,
        #[arg(long, help = "Input shape, e.g. \"[64, 64, 3]\"")]
        input_shape: Option<String>,
    },
    /// Print the JSON schemas of every tool
    Tools,
    /// Run a tool by name with JSON arguments, as an agent platform would
    Invoke {
        tool: String,
        #[arg(default_value = "{}")]
        args: String,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(long)]
        user_name: Option<String>,
        #[arg(long)]
        user_email: Option<String>,
        #[arg(long)]
        model_id: Option<String>,
    },
}

impl CliConfig {
    pub fn load_file(&self) -> Result<Option<TomlConfig>> {
        self.config.as_ref().map(TomlConfig::from_file).transpose()
    }

    /// 檔案 → 環境變數 → 命令列參數，後者覆蓋前者
    pub fn service_config(&self, file: Option<&TomlConfig>) -> Result<ServiceConfig> {
        Ok(self.apply_flags(ServiceConfig::from_sources(file)?))
    }

    /// 命令列參數覆蓋已組好的設定
    pub fn apply_flags(&self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_seconds = timeout;
        }
        config
    }

    /// Maps the subcommand onto a tool name and its JSON arguments.
    /// `None` for commands that do not call a tool.
    pub fn tool_call(&self) -> Result<Option<(String, Value)>> {
        let call = match &self.command {
            Command::Projects => ("get_ivit_project".to_string(), json!({})),
            Command::Models { project } => {
                ("get_ivit_models".to_string(), json!({ "project_name": project }))
            }
            Command::Defaults { project } => (
                "get_ivit_default_param".to_string(),
                json!({ "project_name": project }),
            ),
            Command::Train {
                project,
                batch_size,
                model,
                step,
                input_shape,
            } => {
                let mut args = Map::new();
                args.insert("project_name".to_string(), json!(project));
                if let Some(batch_size) = batch_size {
                    args.insert("batch_size".to_string(), json!(batch_size));
                }
                if let Some(model) = model {
                    args.insert("model".to_string(), json!(model));
                }
                if let Some(step) = step {
                    args.insert("step".to_string(), json!(step));
                }
                if let Some(input_shape) = input_shape {
                    args.insert("input_shape".to_string(), json!(input_shape));
                }
                ("training_new_iteration".to_string(), Value::Object(args))
            }
            Command::Invoke { tool, args, .. } => (tool.clone(), serde_json::from_str(args)?),
            Command::Tools => return Ok(None),
        };
        Ok(Some(call))
    }

    pub fn tool_context(&self) -> ToolContext {
        match &self.command {
            Command::Invoke {
                user_id,
                user_name,
                user_email,
                model_id,
                ..
            } => {
                let mut ctx = ToolContext::new();
                if user_id.is_some() || user_name.is_some() || user_email.is_some() {
                    ctx = ctx.with_user(UserIdentity {
                        id: user_id.clone(),
                        name: user_name.clone(),
                        email: user_email.clone(),
                    });
                }
                if let Some(model_id) = model_id {
                    ctx = ctx.with_model_id(model_id.clone());
                }
                ctx
            }
            _ => ToolContext::new(),
        }
    }
}
