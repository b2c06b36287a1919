use crate::utils::error::{IvitError, Result};
use crate::utils::validation::Validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 目前 iVIT-T 只支援的訓練方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingMethod {
    #[default]
    #[serde(rename = "Quick Training")]
    QuickTraining,
}

impl TrainingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingMethod::QuickTraining => "Quick Training",
        }
    }
}

impl fmt::Display for TrainingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the project listing. Fields other than `project_name` are
/// kept as-is so the listing tool can show them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub project_name: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectListing {
    pub projects: BTreeMap<String, ProjectInfo>,
}

impl ProjectListing {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    /// 以專案名稱精確比對，回傳所有符合的專案
    pub fn find_by_name(&self, project_name: &str) -> Vec<Project> {
        self.projects
            .iter()
            .filter(|(_, info)| info.project_name == project_name)
            .map(|(id, info)| Project {
                id: id.clone(),
                name: info.project_name.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Server-side fallbacks for a project. Kept loosely typed because the
/// values are only trusted after the assembled parameters are validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultParameterSet {
    pub model: String,
    pub step: i64,
    pub input_shape: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableModelSet {
    pub models: Vec<String>,
}

impl AvailableModelSet {
    pub fn new(models: Vec<String>) -> Self {
        Self { models }
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingParameters {
    pub training_method: TrainingMethod,
    pub model: String,
    pub batch_size: u32,
    pub step: u32,
    pub input_shape: [u32; 3],
}

impl Validate for TrainingParameters {
    fn validate(&self) -> Result<()> {
        let reason = if self.model.trim().is_empty() {
            Some("model is empty".to_string())
        } else if self.batch_size == 0 {
            Some("batch_size must be positive".to_string())
        } else if self.step == 0 {
            Some("step must be positive".to_string())
        } else if self.input_shape.contains(&0) {
            Some(format!("input_shape {:?} must be positive", self.input_shape))
        } else {
            None
        };

        match reason {
            Some(reason) => Err(IvitError::ParameterConstructionError { reason }),
            None => Ok(()),
        }
    }
}

/// `POST /training_schedule` 的請求內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSubmission {
    pub project_uuid: String,
    pub training_parameter: TrainingParameters,
}

/// Caller input for a new training iteration. `None` means "not supplied";
/// out-of-range values are replaced by fallbacks when the parameters are built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingRequest {
    pub project_name: String,
    pub batch_size: Option<i64>,
    pub model: Option<String>,
    pub step: Option<i64>,
    pub input_shape: Option<Vec<i64>>,
}

impl TrainingRequest {
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..Default::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_input_shape(mut self, input_shape: Vec<i64>) -> Self {
        self.input_shape = Some(input_shape);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub task_uuid: String,
    pub project: Project,
    pub parameters: TrainingParameters,
    pub submitted_at: DateTime<Utc>,
}

impl fmt::Display for SubmissionReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The training has been successfully submitted to iVIT-T. The generated Task UUID is {}.",
            self.task_uuid
        )
    }
}
