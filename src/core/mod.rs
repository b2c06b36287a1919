pub mod workflow;

pub use crate::domain::model::{
    AvailableModelSet, DefaultParameterSet, Project, ProjectListing, SubmissionReceipt,
    TrainingMethod, TrainingParameters, TrainingRequest, TrainingSubmission,
};
pub use crate::domain::ports::{ConfigProvider, TrainingService};
pub use crate::utils::error::Result;
