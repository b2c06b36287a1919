use crate::domain::model::{
    AvailableModelSet, DefaultParameterSet, ProjectListing, TrainingMethod, TrainingSubmission,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn port(&self) -> u16;
    fn timeout_seconds(&self) -> u64;
}

/// The remote iVIT-T operations the training workflow depends on.
#[async_trait]
pub trait TrainingService: Send + Sync {
    async fn list_projects(&self) -> Result<ProjectListing>;

    async fn list_models(&self, project_id: &str) -> Result<AvailableModelSet>;

    async fn default_parameters(
        &self,
        project_id: &str,
        method: TrainingMethod,
    ) -> Result<DefaultParameterSet>;

    /// Returns the task UUID assigned by the server.
    async fn submit_training(&self, submission: &TrainingSubmission) -> Result<String>;
}

#[async_trait]
impl<T: TrainingService + ?Sized> TrainingService for Arc<T> {
    async fn list_projects(&self) -> Result<ProjectListing> {
        (**self).list_projects().await
    }

    async fn list_models(&self, project_id: &str) -> Result<AvailableModelSet> {
        (**self).list_models(project_id).await
    }

    async fn default_parameters(
        &self,
        project_id: &str,
        method: TrainingMethod,
    ) -> Result<DefaultParameterSet> {
        (**self).default_parameters(project_id, method).await
    }

    async fn submit_training(&self, submission: &TrainingSubmission) -> Result<String> {
        (**self).submit_training(submission).await
    }
}
