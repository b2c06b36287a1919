use crate::domain::model::{
    AvailableModelSet, DefaultParameterSet, ProjectListing, TrainingMethod, TrainingSubmission,
};
use crate::domain::ports::{ConfigProvider, TrainingService};
use crate::utils::error::{IvitError, Result};
use crate::utils::validation::validate_url;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const ROUTE_ALL_PROJECTS: &str = "get_all_project";
const ROUTE_MODELS: &str = "get_model";
const ROUTE_DEFAULT_PARAM: &str = "get_default_param";
const ROUTE_TRAINING_SCHEDULE: &str = "training_schedule";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ProjectListResponse {
    data: Option<ProjectListing>,
}

#[derive(Debug, Deserialize)]
struct ModelListData {
    model: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DefaultParamData {
    training_param: DefaultParameterSet,
}

#[derive(Debug, Serialize)]
struct DefaultParamRequest {
    training_method: TrainingMethod,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    status: Option<i64>,
    data: Option<serde_json::Value>,
    message: Option<String>,
}

/// HTTP 客戶端，對應 iVIT-T 的 REST API
#[derive(Debug, Clone)]
pub struct IvitClient {
    client: Client,
    root: Url,
}

impl IvitClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        validate_url("base_url", config.base_url())?;

        let mut root = Url::parse(config.base_url()).map_err(|e| {
            IvitError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: config.base_url().to_string(),
                reason: e.to_string(),
            }
        })?;
        root.set_port(Some(config.port()))
            .map_err(|_| IvitError::InvalidConfigValueError {
                field: "port".to_string(),
                value: config.port().to_string(),
                reason: "Base URL does not accept a port".to_string(),
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        Ok(Self { client, root })
    }

    /// 在 base URL 後面接上路徑片段，專案 id 會被正確編碼
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.root.clone();
        url.path_segments_mut()
            .map_err(|_| IvitError::ConfigError {
                message: format!("Base URL cannot carry a path: {}", self.root),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let status = response.status();
        tracing::debug!("📡 {} response status: {}", what, status);

        if !status.is_success() {
            return Err(IvitError::HttpStatusError {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| IvitError::response_format(format!("{}: {}", what, e)))
    }
}

#[async_trait]
impl TrainingService for IvitClient {
    async fn list_projects(&self) -> Result<ProjectListing> {
        let url = self.endpoint(&[ROUTE_ALL_PROJECTS])?;
        tracing::debug!("📡 GET {}", url);

        let response = self.client.get(url).send().await?;
        let body: ProjectListResponse = Self::read_json(response, ROUTE_ALL_PROJECTS).await?;
        let listing = body.data.unwrap_or_default();

        tracing::debug!("📂 Received {} projects", listing.len());
        Ok(listing)
    }

    async fn list_models(&self, project_id: &str) -> Result<AvailableModelSet> {
        let url = self.endpoint(&[project_id, ROUTE_MODELS])?;
        tracing::debug!("📡 GET {}", url);

        let response = self.client.get(url).send().await?;
        let body: Envelope<ModelListData> = Self::read_json(response, ROUTE_MODELS).await?;

        Ok(AvailableModelSet::new(body.data.model))
    }

    async fn default_parameters(
        &self,
        project_id: &str,
        method: TrainingMethod,
    ) -> Result<DefaultParameterSet> {
        let url = self.endpoint(&[project_id, ROUTE_DEFAULT_PARAM])?;
        tracing::debug!("📡 POST {}", url);

        let response = self
            .client
            .post(url)
            .json(&DefaultParamRequest {
                training_method: method,
            })
            .send()
            .await?;
        let body: Envelope<DefaultParamData> =
            Self::read_json(response, ROUTE_DEFAULT_PARAM).await?;

        Ok(body.data.training_param)
    }

    async fn submit_training(&self, submission: &TrainingSubmission) -> Result<String> {
        let url = self.endpoint(&[ROUTE_TRAINING_SCHEDULE])?;
        tracing::debug!("📡 POST {}", url);

        let response = self.client.post(url).json(submission).send().await?;

        // 提交只接受 200，其他 2xx 也視為失敗
        let status = response.status();
        if status != StatusCode::OK {
            return Err(IvitError::HttpStatusError {
                status: status.as_u16(),
            });
        }

        let body: SubmitResponse = Self::read_json(response, ROUTE_TRAINING_SCHEDULE).await?;

        if body.status != Some(200) {
            return Err(IvitError::RejectedError {
                message: body
                    .message
                    .unwrap_or_else(|| "no message from iVIT-T".to_string()),
            });
        }

        body.data
            .as_ref()
            .and_then(|data| data.get("task_uuid"))
            .and_then(|uuid| uuid.as_str())
            .map(str::to_string)
            .ok_or_else(|| IvitError::response_format("training_schedule: missing data.task_uuid"))
    }
}
