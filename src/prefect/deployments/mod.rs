//! Deployment module

mod api;
mod models;

pub use api::DeploymentsClient;
pub use models::{
    BucketStep, CollisionStrategy, ConcurrencyOptions, Deployment, DeploymentCreate,
    DeploymentUpdate, GitCloneStep, GlobalConcurrencyLimit, PullStep, SetWorkingDirectoryStep,
    StepCommon,
};
