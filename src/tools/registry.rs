use crate::tools::ivit::{
    DefaultParamsTool, ListModelsTool, ListProjectsTool, SharedService, TrainingTool,
};
use crate::tools::tool::{Tool, ToolContext, ToolOutput, ToolSchema};
use crate::utils::error::IvitError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Tools exposed to the agent platform, looked up by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 註冊全部 iVIT-T 工具
    pub fn ivit(service: SharedService) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ListProjectsTool::new(service.clone())));
        registry.register(Arc::new(ListModelsTool::new(service.clone())));
        registry.register(Arc::new(DefaultParamsTool::new(service.clone())));
        registry.register(Arc::new(TrainingTool::new(service)));
        registry
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!("Tool '{}' registered twice, keeping the latest", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(|tool| tool.schema()).collect()
    }

    /// Runs a tool and turns every failure into a user-facing message, so
    /// nothing but text crosses back to the agent platform.
    pub async fn invoke(&self, name: &str, params: Value, ctx: &ToolContext) -> ToolOutput {
        let started = Instant::now();

        let Some(tool) = self.get(name) else {
            let err = IvitError::UnknownToolError {
                name: name.to_string(),
            };
            tracing::warn!("❌ {}", err);
            return ToolOutput::from_error(&err);
        };

        tracing::debug!("🔧 {} invoking '{}' with {}", ctx.caller_label(), name, params);

        let output = match tool.execute(params, ctx).await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(
                    "❌ Tool '{}' failed: {} (Category: {:?}, Severity: {:?})",
                    name,
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::debug!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                ToolOutput::from_error(&e)
            }
        };

        output.with_duration(started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        AvailableModelSet, DefaultParameterSet, ProjectListing, TrainingMethod, TrainingService,
        TrainingSubmission,
    };
    use crate::utils::error::{ErrorSeverity, Result};
    use async_trait::async_trait;
    use serde_json::json;

    struct OfflineService;

    #[async_trait]
    impl TrainingService for OfflineService {
        async fn list_projects(&self) -> Result<ProjectListing> {
            Err(IvitError::HttpStatusError { status: 502 })
        }

        async fn list_models(&self, _project_id: &str) -> Result<AvailableModelSet> {
            Err(IvitError::HttpStatusError { status: 502 })
        }

        async fn default_parameters(
            &self,
            _project_id: &str,
            _method: TrainingMethod,
        ) -> Result<DefaultParameterSet> {
            Err(IvitError::HttpStatusError { status: 502 })
        }

        async fn submit_training(&self, _submission: &TrainingSubmission) -> Result<String> {
            Err(IvitError::HttpStatusError { status: 502 })
        }
    }

    #[test]
    fn test_ivit_registry_lists_all_tools() {
        let registry = ToolRegistry::ivit(Arc::new(OfflineService));

        assert_eq!(
            registry.names(),
            vec![
                "get_ivit_default_param",
                "get_ivit_models",
                "get_ivit_project",
                "training_new_iteration",
            ]
        );

        for schema in registry.schemas() {
            assert_eq!(schema.parameters["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_invoke_converts_errors_to_messages() {
        let registry = ToolRegistry::ivit(Arc::new(OfflineService));

        let output = registry
            .invoke(
                "training_new_iteration",
                json!({"project_name": "fruit"}),
                &ToolContext::new(),
            )
            .await;

        assert!(output.is_error);
        assert_eq!(output.as_text(), "HTTP Error: 502");
        assert_eq!(output.severity, Some(ErrorSeverity::Medium));
    }

    #[test]
    fn test_invoke_unknown_tool() {
        let registry = ToolRegistry::ivit(Arc::new(OfflineService));
        let output = tokio_test::block_on(registry.invoke(
            "delete_everything",
            json!({}),
            &ToolContext::new(),
        ));

        assert!(output.is_error);
        assert!(output.as_text().contains("delete_everything"));
        assert_eq!(output.severity, Some(ErrorSeverity::High));
    }
}
