use crate::core::{
    AvailableModelSet, DefaultParameterSet, Project, ProjectListing, SubmissionReceipt,
    TrainingMethod, TrainingParameters, TrainingRequest, TrainingService, TrainingSubmission,
};
use crate::utils::error::{IvitError, Result};
use crate::utils::validation::Validate;

/// 使用者未提供有效 batch size 時的固定值（不使用伺服器預設）
pub const FALLBACK_BATCH_SIZE: u32 = 1;

/// Resolves a project by name, reconciles caller parameters with the
/// project's server defaults and submits one Quick Training job.
pub struct TrainingSubmissionWorkflow<S: TrainingService> {
    service: S,
    method: TrainingMethod,
}

impl<S: TrainingService> TrainingSubmissionWorkflow<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            method: TrainingMethod::QuickTraining,
        }
    }

    pub async fn submit(&self, request: &TrainingRequest) -> Result<SubmissionReceipt> {
        let project = find_project(&self.service, &request.project_name).await?;

        // 預設參數與可用模型缺一不可
        let defaults = self
            .service
            .default_parameters(&project.id, self.method)
            .await?;
        let models = self.service.list_models(&project.id).await?;

        let parameters = build_parameters(request, &defaults, &models)?;
        let submission = TrainingSubmission {
            project_uuid: project.id.clone(),
            training_parameter: parameters,
        };
        tracing::debug!("📤 Submitting training payload: {:?}", submission);

        let task_uuid = match self.service.submit_training(&submission).await {
            Ok(task_uuid) => task_uuid,
            Err(e) => {
                tracing::error!("❌ Training submission for '{}' failed: {}", project.name, e);
                return Err(e);
            }
        };

        tracing::info!(
            "✅ Training for '{}' submitted, task UUID {}",
            project.name,
            task_uuid
        );

        Ok(SubmissionReceipt {
            task_uuid,
            project,
            parameters: submission.training_parameter,
            submitted_at: chrono::Utc::now(),
        })
    }
}

/// 取得專案清單並以名稱解析出唯一的專案
pub async fn find_project<S>(service: &S, project_name: &str) -> Result<Project>
where
    S: TrainingService + ?Sized,
{
    let listing = service.list_projects().await?;
    let project = resolve_in_listing(&listing, project_name)?;
    tracing::info!("🔎 Resolved project '{}' to {}", project.name, project.id);
    Ok(project)
}

/// Exact-name lookup. Duplicate names are rejected rather than guessed.
pub fn resolve_in_listing(listing: &ProjectListing, project_name: &str) -> Result<Project> {
    let mut matches = listing.find_by_name(project_name);
    match matches.len() {
        0 => Err(IvitError::ProjectNotFoundError {
            name: project_name.to_string(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(IvitError::AmbiguousProjectError {
            name: project_name.to_string(),
            candidates: matches.into_iter().map(|p| p.id).collect(),
        }),
    }
}

/// Applies the per-field fallback policy and validates the result.
pub fn build_parameters(
    request: &TrainingRequest,
    defaults: &DefaultParameterSet,
    models: &AvailableModelSet,
) -> Result<TrainingParameters> {
    let batch_size = positive(request.batch_size).unwrap_or(FALLBACK_BATCH_SIZE);

    let step = match positive(request.step) {
        Some(step) => step,
        None => positive(Some(defaults.step)).ok_or_else(|| {
            IvitError::ParameterConstructionError {
                reason: format!("default step {} is not a positive integer", defaults.step),
            }
        })?,
    };

    let input_shape = match request.input_shape.as_deref().and_then(shape) {
        Some(input_shape) => input_shape,
        None => shape(&defaults.input_shape).ok_or_else(|| {
            IvitError::ParameterConstructionError {
                reason: format!(
                    "default input_shape {:?} is not 3 positive integers",
                    defaults.input_shape
                ),
            }
        })?,
    };

    let parameters = TrainingParameters {
        training_method: TrainingMethod::QuickTraining,
        model: select_model(request.model.as_deref(), defaults, models)?,
        batch_size,
        step,
        input_shape,
    };
    parameters.validate()?;

    Ok(parameters)
}

/// An empty model set means the server gave nothing to validate against.
/// Otherwise the chosen model, fallback included, must be in the set.
fn select_model(
    requested: Option<&str>,
    defaults: &DefaultParameterSet,
    models: &AvailableModelSet,
) -> Result<String> {
    let available = |model: &str| models.is_empty() || models.contains(model);
    let requested = requested.map(str::trim).filter(|m| !m.is_empty());

    match requested {
        Some(model) if available(model) => return Ok(model.to_string()),
        Some(model) => tracing::warn!(
            "⚠️ Model '{}' is not available for this project, using default '{}'",
            model,
            defaults.model
        ),
        None => tracing::info!("ℹ️ No model given, using default '{}'", defaults.model),
    }

    if !available(defaults.model.as_str()) {
        return Err(IvitError::ParameterConstructionError {
            reason: format!(
                "default model '{}' is not available, expected one of: {}",
                defaults.model,
                models.models.join(", ")
            ),
        });
    }
    Ok(defaults.model.clone())
}

fn positive(value: Option<i64>) -> Option<u32> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
}

fn shape(values: &[i64]) -> Option<[u32; 3]> {
    match values {
        [h, w, c] => Some([positive(Some(*h))?, positive(Some(*w))?, positive(Some(*c))?]),
        _ => None,
    }
}
