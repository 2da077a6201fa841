//! Deployment data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::PrefectError;
use crate::prefect::helpers::null_as_default;
use crate::prefect::traits::ApiResource;

/// Deployment as returned by the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Deployment {
    pub id: Uuid,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    /// Deprecated by the API; the effective limit lives in `global_concurrency_limit`
    #[serde(default)]
    pub concurrency_limit: Option<i64>,
    #[serde(default)]
    pub global_concurrency_limit: Option<GlobalConcurrencyLimit>,
    #[serde(default)]
    pub concurrency_options: Option<ConcurrencyOptions>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub enforce_parameter_schema: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entrypoint: String,
    pub flow_id: Uuid,
    #[serde(default)]
    pub job_variables: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub manifest_path: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default)]
    pub parameter_openapi_schema: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pull_steps: Vec<PullStep>,
    #[serde(default)]
    pub storage_document_id: Option<Uuid>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_pool_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub work_queue_name: String,
}

impl ApiResource for Deployment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Payload for POST /deployments/
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DeploymentCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_options: Option<ConcurrencyOptions>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(default)]
    pub enforce_parameter_schema: bool,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub entrypoint: String,
    pub flow_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_variables: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub manifest_path: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_openapi_schema: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub path: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub pull_steps: Vec<PullStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_document_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub work_pool_name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub work_queue_name: String,
}

/// Payload for PATCH /deployments/{id}
///
/// Name, flow, pull steps and parameter schema are fixed at creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DeploymentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency_options: Option<ConcurrencyOptions>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(default)]
    pub enforce_parameter_schema: bool,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub entrypoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_variables: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub manifest_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub path: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_document_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub work_pool_name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub work_queue_name: String,
}

/// Concurrency limit object attached to a deployment
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GlobalConcurrencyLimit {
    pub limit: i64,
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
}

/// What happens to new runs once the concurrency limit is reached
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollisionStrategy {
    Enqueue,
    CancelNew,
}

impl CollisionStrategy {
    pub const ALL: &'static [&'static str] = &["ENQUEUE", "CANCEL_NEW"];
}

impl fmt::Display for CollisionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionStrategy::Enqueue => write!(f, "ENQUEUE"),
            CollisionStrategy::CancelNew => write!(f, "CANCEL_NEW"),
        }
    }
}

impl FromStr for CollisionStrategy {
    type Err = PrefectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENQUEUE" => Ok(CollisionStrategy::Enqueue),
            "CANCEL_NEW" => Ok(CollisionStrategy::CancelNew),
            other => Err(PrefectError::Parse(format!(
                "invalid collision strategy {:?}, expected one of {:?}",
                other,
                CollisionStrategy::ALL
            ))),
        }
    }
}

/// Concurrency options of a deployment
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyOptions {
    pub collision_strategy: CollisionStrategy,
}

/// Fields shared by every pull step
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StepCommon {
    /// Reference to a credentials block
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub credentials: Option<String>,
    /// Python package dependencies
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub requires: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SetWorkingDirectoryStep {
    pub directory: String,
    #[serde(flatten)]
    pub common: StepCommon,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GitCloneStep {
    pub repository: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub access_token: Option<String>,
    #[serde(flatten)]
    pub common: StepCommon,
}

/// Fields of the `pull_from_*` cloud storage steps
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BucketStep {
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub folder: Option<String>,
    #[serde(flatten)]
    pub common: StepCommon,
}

/// A step run by a worker to fetch flow code before execution.
///
/// Serialized the way the API stores it: a single-key object named after the
/// fully-qualified step function, eg.
/// `{"prefect.deployments.steps.git_clone": {"repository": "..."}}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum PullStep {
    #[serde(rename = "prefect.deployments.steps.set_working_directory")]
    SetWorkingDirectory(SetWorkingDirectoryStep),
    #[serde(rename = "prefect.deployments.steps.git_clone")]
    GitClone(GitCloneStep),
    #[serde(rename = "prefect_azure.deployments.steps.pull_from_azure_blob_storage")]
    PullFromAzureBlobStorage(BucketStep),
    #[serde(rename = "prefect_gcp.deployments.steps.pull_from_gcs")]
    PullFromGcs(BucketStep),
    #[serde(rename = "prefect_aws.deployments.steps.pull_from_s3")]
    PullFromS3(BucketStep),
    /// Any other step, eg. `run_shell_script`, kept as the API returned it
    #[serde(untagged)]
    Other(Map<String, Value>),
}

impl PullStep {
    pub const SET_WORKING_DIRECTORY: &'static str = "set_working_directory";
    pub const GIT_CLONE: &'static str = "git_clone";
    pub const PULL_FROM_AZURE_BLOB_STORAGE: &'static str = "pull_from_azure_blob_storage";
    pub const PULL_FROM_GCS: &'static str = "pull_from_gcs";
    pub const PULL_FROM_S3: &'static str = "pull_from_s3";

    /// Short type names accepted in configuration
    pub const TYPES: &'static [&'static str] = &[
        Self::SET_WORKING_DIRECTORY,
        Self::GIT_CLONE,
        Self::PULL_FROM_AZURE_BLOB_STORAGE,
        Self::PULL_FROM_GCS,
        Self::PULL_FROM_S3,
    ];

    /// Short type name of this step
    pub fn type_name(&self) -> &str {
        match self {
            PullStep::SetWorkingDirectory(_) => Self::SET_WORKING_DIRECTORY,
            PullStep::GitClone(_) => Self::GIT_CLONE,
            PullStep::PullFromAzureBlobStorage(_) => Self::PULL_FROM_AZURE_BLOB_STORAGE,
            PullStep::PullFromGcs(_) => Self::PULL_FROM_GCS,
            PullStep::PullFromS3(_) => Self::PULL_FROM_S3,
            PullStep::Other(step) => step
                .keys()
                .next()
                .and_then(|name| name.rsplit('.').next())
                .unwrap_or_default(),
        }
    }

    /// Credentials and requirements; `None` for steps without a known shape
    pub fn common(&self) -> Option<&StepCommon> {
        match self {
            PullStep::SetWorkingDirectory(s) => Some(&s.common),
            PullStep::GitClone(s) => Some(&s.common),
            PullStep::PullFromAzureBlobStorage(s)
            | PullStep::PullFromGcs(s)
            | PullStep::PullFromS3(s) => Some(&s.common),
            PullStep::Other(_) => None,
        }
    }
}
