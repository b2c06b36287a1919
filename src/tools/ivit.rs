use crate::core::workflow::{find_project, TrainingSubmissionWorkflow};
use crate::core::{TrainingMethod, TrainingRequest, TrainingService};
use crate::tools::tool::{
    optional_int, optional_int_list, optional_str, require_str, Tool, ToolContext, ToolOutput,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

pub type SharedService = Arc<dyn TrainingService>;

fn project_name_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "project_name": {
                "type": "string",
                "description": "Exact name of the iVIT-T project."
            }
        },
        "required": ["project_name"]
    })
}

/// `get_ivit_project`
pub struct ListProjectsTool {
    service: SharedService,
}

impl ListProjectsTool {
    pub fn new(service: SharedService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ListProjectsTool {
    fn name(&self) -> &str {
        "get_ivit_project"
    }

    fn description(&self) -> &str {
        "Get all projects from iVIT-T, keyed by project UUID."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _params: Value, _ctx: &ToolContext) -> Result<ToolOutput> {
        let listing = self.service.list_projects().await?;

        if listing.is_empty() {
            return Ok(ToolOutput::success(json!({
                "message": "No project in iVIT",
                "projects": []
            })));
        }

        Ok(ToolOutput::success(serde_json::to_value(&listing)?))
    }
}

/// `get_ivit_models`
pub struct ListModelsTool {
    service: SharedService,
}

impl ListModelsTool {
    pub fn new(service: SharedService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for ListModelsTool {
    fn name(&self) -> &str {
        "get_ivit_models"
    }

    fn description(&self) -> &str {
        "List the models that can be trained for an iVIT-T project."
    }

    fn parameters_schema(&self) -> Value {
        project_name_schema()
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolOutput> {
        let project_name = require_str(&params, "project_name")?;
        let project = find_project(&self.service, project_name).await?;
        let models = self.service.list_models(&project.id).await?;

        Ok(ToolOutput::success(json!({
            "project_name": project.name,
            "project_uuid": project.id,
            "models": models.models,
        })))
    }
}

/// `get_ivit_default_param`
pub struct DefaultParamsTool {
    service: SharedService,
}

impl DefaultParamsTool {
    pub fn new(service: SharedService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for DefaultParamsTool {
    fn name(&self) -> &str {
        "get_ivit_default_param"
    }

    fn description(&self) -> &str {
        "Get the default Quick Training parameters (model, step, input shape) of an iVIT-T project."
    }

    fn parameters_schema(&self) -> Value {
        project_name_schema()
    }

    async fn execute(&self, params: Value, _ctx: &ToolContext) -> Result<ToolOutput> {
        let project_name = require_str(&params, "project_name")?;
        let project = find_project(&self.service, project_name).await?;
        let method = TrainingMethod::QuickTraining;
        let defaults = self.service.default_parameters(&project.id, method).await?;

        Ok(ToolOutput::success(json!({
            "project_name": project.name,
            "project_uuid": project.id,
            "training_method": method.as_str(),
            "training_param": defaults,
        })))
    }
}

/// `training_new_iteration`
pub struct TrainingTool {
    workflow: TrainingSubmissionWorkflow<SharedService>,
}

impl TrainingTool {
    pub fn new(service: SharedService) -> Self {
        Self {
            workflow: TrainingSubmissionWorkflow::new(service),
        }
    }

    /// 嚴格解析代理傳入的參數，格式錯誤直接拒絕
    pub fn parse_request(params: &Value) -> Result<TrainingRequest> {
        Ok(TrainingRequest {
            project_name: require_str(params, "project_name")?.to_string(),
            batch_size: optional_int(params, "batch_size")?,
            model: optional_str(params, "model")?,
            step: optional_int(params, "step")?,
            input_shape: optional_int_list(params, "input_shape")?,
        })
    }
}

#[async_trait]
impl Tool for TrainingTool {
    fn name(&self) -> &str {
        "training_new_iteration"
    }

    fn description(&self) -> &str {
        "Start a new Quick Training iteration for an iVIT-T project. \
         Missing or invalid parameters fall back to the project's defaults \
         (batch size falls back to 1)."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_name": {
                    "type": "string",
                    "description": "Exact name of the iVIT-T project to train."
                },
                "batch_size": {
                    "type": "integer",
                    "description": "Training batch size, a positive integer."
                },
                "model": {
                    "type": "string",
                    "description": "Model to train, e.g. yolov4-tiny. Must be one of the project's available models."
                },
                "step": {
                    "type": "integer",
                    "description": "Number of training steps, a positive integer."
                },
                "input_shape": {
                    "type": "array",
                    "items": {"type": "integer"},
                    "description": "Input shape as [height, width, channels]."
                }
            },
            "required": ["project_name"]
        })
    }

    async fn execute(&self, params: Value, ctx: &ToolContext) -> Result<ToolOutput> {
        let request = Self::parse_request(&params)?;
        tracing::info!(
            user = ctx.caller_label(),
            email = ctx.caller_email().unwrap_or("-"),
            model_id = ctx.model_id.as_deref().unwrap_or("-"),
            "🚀 Training requested for '{}'",
            request.project_name
        );

        let receipt = self.workflow.submit(&request).await?;
        Ok(ToolOutput::text(receipt.to_string()))
    }
}
