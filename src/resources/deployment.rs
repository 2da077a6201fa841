//! `prefect_deployment` resource

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::import::{parse_workspace_import, WorkspacePosition};
use super::json::NormalizedJson;
use super::{parse_id, require_client, scope_id};
use crate::error::PrefectError;
use crate::prefect::deployments::{
    BucketStep, CollisionStrategy, ConcurrencyOptions, Deployment, DeploymentCreate,
    DeploymentUpdate, GitCloneStep, PullStep, SetWorkingDirectoryStep, StepCommon,
};
use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{
    api_error, create_client_error, serialize_data_error, Diagnostics,
};
use crate::provider::schema::{attributes, Attribute, Schema};
use crate::provider::Resource;

const RESOURCE_NAME: &str = "Deployment";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DeploymentResourceModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub concurrency_limit: Option<i64>,
    #[serde(default)]
    pub concurrency_options: Option<ConcurrencyOptionsModel>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub enforce_parameter_schema: Option<bool>,
    #[serde(default)]
    pub entrypoint: Option<String>,
    #[serde(default)]
    pub flow_id: Option<Uuid>,
    #[serde(default)]
    pub job_variables: Option<NormalizedJson>,
    #[serde(default)]
    pub manifest_path: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parameter_openapi_schema: Option<NormalizedJson>,
    #[serde(default)]
    pub parameters: Option<NormalizedJson>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub paused: Option<bool>,
    #[serde(default)]
    pub pull_steps: Option<Vec<PullStepModel>>,
    #[serde(default)]
    pub storage_document_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub work_pool_name: Option<String>,
    #[serde(default)]
    pub work_queue_name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConcurrencyOptionsModel {
    pub collision_strategy: String,
}

/// Flat configuration form of a pull step; `type` selects which fields apply
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct PullStepModel {
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default)]
    pub credentials: Option<String>,
    #[serde(default)]
    pub requires: Option<String>,
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
}

impl PullStepModel {
    fn set_fields(&self) -> Vec<&'static str> {
        [
            ("directory", &self.directory),
            ("repository", &self.repository),
            ("branch", &self.branch),
            ("access_token", &self.access_token),
            ("bucket", &self.bucket),
            ("folder", &self.folder),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_some())
        .map(|(name, _)| name)
        .collect()
    }

    fn required(&self, field: &'static str, value: &Option<String>) -> Result<String, PrefectError> {
        value.clone().ok_or_else(|| {
            PrefectError::Parse(format!(
                "pull step of type '{}' requires the '{}' attribute",
                self.step_type, field
            ))
        })
    }
}

impl TryFrom<&PullStepModel> for PullStep {
    type Error = PrefectError;

    fn try_from(model: &PullStepModel) -> Result<Self, Self::Error> {
        let allowed: &[&str] = match model.step_type.as_str() {
            PullStep::SET_WORKING_DIRECTORY => &["directory"],
            PullStep::GIT_CLONE => &["repository", "branch", "access_token"],
            PullStep::PULL_FROM_AZURE_BLOB_STORAGE | PullStep::PULL_FROM_GCS | PullStep::PULL_FROM_S3 => {
                &["bucket", "folder"]
            }
            other => {
                return Err(PrefectError::Parse(format!(
                    "unknown pull step type '{}', expected one of {:?}",
                    other,
                    PullStep::TYPES
                )))
            }
        };

        let foreign: Vec<&str> = model
            .set_fields()
            .into_iter()
            .filter(|f| !allowed.contains(f))
            .collect();
        if !foreign.is_empty() {
            return Err(PrefectError::Parse(format!(
                "attributes {:?} cannot be used with pull step type '{}'",
                foreign, model.step_type
            )));
        }

        let common = StepCommon {
            credentials: model.credentials.clone(),
            requires: model.requires.clone(),
        };

        let step = match model.step_type.as_str() {
            PullStep::SET_WORKING_DIRECTORY => PullStep::SetWorkingDirectory(SetWorkingDirectoryStep {
                directory: model.required("directory", &model.directory)?,
                common,
            }),
            PullStep::GIT_CLONE => PullStep::GitClone(GitCloneStep {
                repository: model.required("repository", &model.repository)?,
                branch: model.branch.clone(),
                access_token: model.access_token.clone(),
                common,
            }),
            kind => {
                let bucket = BucketStep {
                    bucket: model.required("bucket", &model.bucket)?,
                    folder: model.folder.clone(),
                    common,
                };
                match kind {
                    PullStep::PULL_FROM_AZURE_BLOB_STORAGE => PullStep::PullFromAzureBlobStorage(bucket),
                    PullStep::PULL_FROM_GCS => PullStep::PullFromGcs(bucket),
                    _ => PullStep::PullFromS3(bucket),
                }
            }
        };

        Ok(step)
    }
}

impl From<&PullStep> for PullStepModel {
    fn from(step: &PullStep) -> Self {
        let common = step.common().cloned().unwrap_or_default();
        let mut model = PullStepModel {
            step_type: step.type_name().to_string(),
            credentials: common.credentials,
            requires: common.requires,
            ..Default::default()
        };

        match step {
            PullStep::SetWorkingDirectory(s) => model.directory = Some(s.directory.clone()),
            PullStep::GitClone(s) => {
                model.repository = Some(s.repository.clone());
                model.branch = s.branch.clone();
                model.access_token = s.access_token.clone();
            }
            PullStep::PullFromAzureBlobStorage(s) | PullStep::PullFromGcs(s) | PullStep::PullFromS3(s) => {
                model.bucket = Some(s.bucket.clone());
                model.folder = s.folder.clone();
            }
            PullStep::Other(_) => {}
        }

        model
    }
}

pub(crate) fn map_pull_steps(models: &[PullStepModel], diags: &mut Diagnostics) -> Option<Vec<PullStep>> {
    let mut steps = Vec::with_capacity(models.len());
    for (i, model) in models.iter().enumerate() {
        match PullStep::try_from(model) {
            Ok(step) => steps.push(step),
            Err(e) => {
                diags.attribute_error(
                    format!("pull_steps[{}]", i),
                    "Invalid pull step",
                    e.to_string(),
                );
                return None;
            }
        }
    }
    Some(steps)
}

/// Decode an optional JSON attribute into an API map
fn json_attribute(
    value: &Option<NormalizedJson>,
    attribute: &str,
    diags: &mut Diagnostics,
) -> Option<Option<serde_json::Map<String, serde_json::Value>>> {
    match value {
        None => Some(None),
        Some(doc) => match doc.to_map() {
            Ok(map) => Some(map),
            Err(e) => {
                diags.push(serialize_data_error(attribute, attribute, &e));
                None
            }
        },
    }
}

fn collision_strategy(
    options: &Option<ConcurrencyOptionsModel>,
    diags: &mut Diagnostics,
) -> Option<Option<ConcurrencyOptions>> {
    match options {
        None => Some(None),
        Some(opts) => match opts.collision_strategy.parse::<CollisionStrategy>() {
            Ok(collision_strategy) => Some(Some(ConcurrencyOptions { collision_strategy })),
            Err(e) => {
                diags.attribute_error(
                    "concurrency_options.collision_strategy",
                    "Invalid collision strategy",
                    e.to_string(),
                );
                None
            }
        },
    }
}

/// Copy an API deployment into the state model, keeping the scope attributes
pub(crate) fn copy_deployment_to_model(deployment: &Deployment, model: &mut DeploymentResourceModel) {
    model.id = Some(deployment.id.to_string());
    model.created = deployment.created;
    model.updated = deployment.updated;

    model.concurrency_limit = deployment
        .global_concurrency_limit
        .as_ref()
        .map(|g| g.limit)
        .or(deployment.concurrency_limit);
    model.concurrency_options = deployment.concurrency_options.map(|o| ConcurrencyOptionsModel {
        collision_strategy: o.collision_strategy.to_string(),
    });
    model.description = Some(deployment.description.clone());
    model.enforce_parameter_schema = Some(deployment.enforce_parameter_schema);
    model.entrypoint = Some(deployment.entrypoint.clone());
    model.flow_id = Some(deployment.flow_id);
    model.manifest_path = Some(deployment.manifest_path.clone());
    model.name = Some(deployment.name.clone());
    model.path = Some(deployment.path.clone());
    model.paused = Some(deployment.paused);
    model.pull_steps = Some(deployment.pull_steps.iter().map(PullStepModel::from).collect());
    model.storage_document_id = deployment.storage_document_id;
    model.tags = Some(deployment.tags.clone());
    model.version = Some(deployment.version.clone());
    model.work_pool_name = Some(deployment.work_pool_name.clone());
    model.work_queue_name = Some(deployment.work_queue_name.clone());

    model.parameters = Some(NormalizedJson::from_map(deployment.parameters.as_ref()));
    model.job_variables = Some(NormalizedJson::from_map(deployment.job_variables.as_ref()));
    model.parameter_openapi_schema =
        Some(NormalizedJson::from_map(deployment.parameter_openapi_schema.as_ref()));
}

pub struct DeploymentResource {
    client: Option<PrefectClient>,
}

impl DeploymentResource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }

    fn sub_client(
        &self,
        model: &DeploymentResourceModel,
        diags: &mut Diagnostics,
    ) -> Option<crate::prefect::deployments::DeploymentsClient> {
        let client = require_client(&self.client, "resource", diags)?;
        match client.deployments(scope_id(model.account_id), scope_id(model.workspace_id)) {
            Ok(c) => Some(c),
            Err(e) => {
                diags.push(create_client_error("deployment", &e));
                None
            }
        }
    }
}

fn pull_step_schema() -> Attribute {
    let non = |keep: &[&str]| -> Vec<&'static str> {
        ["directory", "repository", "branch", "access_token", "bucket", "folder"]
            .into_iter()
            .filter(|f| !keep.contains(f))
            .collect()
    };

    Attribute::object_list(
        attributes([
            (
                "type",
                Attribute::string("The type of pull step").required().one_of(PullStep::TYPES),
            ),
            (
                "credentials",
                Attribute::string(
                    "Credentials to use for the pull step. Refer to a {GitHub,GitLab,BitBucket} credentials block.",
                )
                .optional(),
            ),
            ("requires", Attribute::string("A list of Python package dependencies.").optional()),
            (
                "directory",
                Attribute::string("(For type 'set_working_directory') The directory to set as the working directory.")
                    .optional()
                    .conflicts_with(&non(&["directory"])),
            ),
            (
                "repository",
                Attribute::string("(For type 'git_clone') The URL of the repository to clone.")
                    .optional()
                    .conflicts_with(&non(&["repository", "branch", "access_token"])),
            ),
            (
                "branch",
                Attribute::string("(For type 'git_clone') The branch to clone. If not provided, the default branch is used.")
                    .optional()
                    .conflicts_with(&non(&["repository", "branch", "access_token"])),
            ),
            (
                "access_token",
                Attribute::string("(For type 'git_clone') Access token for the repository. Refer to a credentials block for security purposes. Used in leiu of 'credentials'.")
                    .optional()
                    .conflicts_with(&non(&["repository", "branch", "access_token"])),
            ),
            (
                "bucket",
                Attribute::string("(For type 'pull_from_*') The name of the bucket where files are stored.")
                    .optional()
                    .conflicts_with(&non(&["bucket", "folder"])),
            ),
            (
                "folder",
                Attribute::string("(For type 'pull_from_*') The folder in the bucket where files are stored.")
                    .optional()
                    .conflicts_with(&non(&["bucket", "folder"])),
            ),
        ]),
        "Pull steps to prepare flows for a deployment run.",
    )
    .optional_computed()
    .default_value(json!([]))
    .requires_replace()
}

#[async_trait]
impl Resource for DeploymentResource {
    type Model = DeploymentResourceModel;

    fn type_name(&self) -> &'static str {
        "deployment"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Deployments are server-side representations of flows. Deployments store the crucial metadata needed for remote orchestration including when, where, and how a workflow should run.",
            [
                ("id", Attribute::string("Deployment ID (UUID)").computed()),
                ("created", Attribute::string("Timestamp of when the resource was created (RFC3339)").computed()),
                ("updated", Attribute::string("Timestamp of when the resource was updated (RFC3339)").computed()),
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional()),
                ("workspace_id", Attribute::string("Workspace ID (UUID) to associate deployment to").optional()),
                ("name", Attribute::string("Name of the deployment").required().requires_replace()),
                ("flow_id", Attribute::string("Flow ID (UUID) to associate deployment to").required().requires_replace()),
                ("paused", Attribute::bool("Whether or not the deployment is paused.").optional_computed().default_value(json!(false))),
                (
                    "enforce_parameter_schema",
                    Attribute::bool("Whether or not the deployment should enforce the parameter schema.")
                        .optional_computed()
                        .default_value(json!(false)),
                ),
                ("storage_document_id", Attribute::string("ID of the associated storage document (UUID)").optional_computed()),
                ("manifest_path", Attribute::string("The path to the flow's manifest file, relative to the chosen storage.").optional_computed()),
                ("job_variables", Attribute::json("Overrides for the flow's infrastructure configuration.").optional_computed()),
                (
                    "work_queue_name",
                    Attribute::string("The work queue for the deployment. If no work queue is set, work will not be scheduled.")
                        .optional_computed(),
                ),
                ("work_pool_name", Attribute::string("The name of the deployment's work pool.").optional_computed()),
                ("description", Attribute::string("A description for the deployment.").optional_computed()),
                (
                    "path",
                    Attribute::string("The path to the working directory for the workflow, relative to remote storage or an absolute path.")
                        .optional_computed(),
                ),
                ("version", Attribute::string("An optional version for the deployment.").optional_computed()),
                ("entrypoint", Attribute::string("The path to the entrypoint for the workflow, relative to the path.").optional_computed()),
                ("tags", Attribute::string_list("Tags associated with the deployment").optional_computed().default_value(json!([]))),
                ("parameters", Attribute::json("Parameters for flow runs scheduled by the deployment.").optional_computed()),
                (
                    "parameter_openapi_schema",
                    Attribute::json("The parameter schema of the flow, including defaults.")
                        .optional_computed()
                        .requires_replace(),
                ),
                ("concurrency_limit", Attribute::number("The deployment's concurrency limit.").optional_computed()),
                (
                    "concurrency_options",
                    Attribute::object(
                        attributes([(
                            "collision_strategy",
                            Attribute::string("Enumeration of concurrency collision strategies.")
                                .required()
                                .one_of(CollisionStrategy::ALL),
                        )]),
                        "Concurrency options for the deployment.",
                    )
                    .optional_computed(),
                ),
                ("pull_steps", pull_step_schema()),
            ],
        )
    }

    async fn create(
        &self,
        diags: &mut Diagnostics,
        mut plan: DeploymentResourceModel,
    ) -> Option<DeploymentResourceModel> {
        let client = self.sub_client(&plan, diags)?;

        let parameters = json_attribute(&plan.parameters, "parameters", diags)?;
        let job_variables = json_attribute(&plan.job_variables, "job_variables", diags)?;
        let parameter_openapi_schema =
            json_attribute(&plan.parameter_openapi_schema, "parameter_openapi_schema", diags)?;
        let pull_steps = map_pull_steps(plan.pull_steps.as_deref().unwrap_or_default(), diags)?;
        let concurrency_options = collision_strategy(&plan.concurrency_options, diags)?;

        let payload = DeploymentCreate {
            concurrency_limit: plan.concurrency_limit,
            concurrency_options,
            description: plan.description.clone().unwrap_or_default(),
            enforce_parameter_schema: plan.enforce_parameter_schema.unwrap_or_default(),
            entrypoint: plan.entrypoint.clone().unwrap_or_default(),
            flow_id: plan.flow_id.unwrap_or_default(),
            job_variables,
            manifest_path: plan.manifest_path.clone().unwrap_or_default(),
            name: plan.name.clone().unwrap_or_default(),
            parameters,
            parameter_openapi_schema,
            path: plan.path.clone().unwrap_or_default(),
            paused: plan.paused.unwrap_or_default(),
            pull_steps,
            storage_document_id: plan.storage_document_id,
            tags: plan.tags.clone().unwrap_or_default(),
            version: plan.version.clone().unwrap_or_default(),
            work_pool_name: plan.work_pool_name.clone().unwrap_or_default(),
            work_queue_name: plan.work_queue_name.clone().unwrap_or_default(),
        };

        let deployment = match client.create(&payload).await {
            Ok(d) => d,
            Err(e) => {
                diags.push(api_error("Error creating deployment", "create", "deployment", &e));
                return None;
            }
        };

        debug!("Created deployment {}", deployment.id);
        copy_deployment_to_model(&deployment, &mut plan);
        Some(plan)
    }

    async fn read(
        &self,
        diags: &mut Diagnostics,
        mut state: DeploymentResourceModel,
    ) -> Option<DeploymentResourceModel> {
        let client = self.sub_client(&state, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        match client.get(id).await {
            Ok(deployment) => {
                copy_deployment_to_model(&deployment, &mut state);
                Some(state)
            }
            Err(e) if e.is_not_found() => {
                warn!("Deployment {} no longer exists, removing from state", id);
                None
            }
            Err(e) => {
                diags.push(api_error("Error refreshing deployment state", "read", "Deployment", &e));
                None
            }
        }
    }

    async fn update(
        &self,
        diags: &mut Diagnostics,
        mut plan: DeploymentResourceModel,
        state: DeploymentResourceModel,
    ) -> Option<DeploymentResourceModel> {
        let client = self.sub_client(&plan, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        let parameters = json_attribute(&plan.parameters, "parameters", diags)?;
        let job_variables = json_attribute(&plan.job_variables, "job_variables", diags)?;
        let concurrency_options = collision_strategy(&plan.concurrency_options, diags)?;

        let payload = DeploymentUpdate {
            concurrency_limit: plan.concurrency_limit,
            concurrency_options,
            description: plan.description.clone().unwrap_or_default(),
            enforce_parameter_schema: plan.enforce_parameter_schema.unwrap_or_default(),
            entrypoint: plan.entrypoint.clone().unwrap_or_default(),
            job_variables,
            manifest_path: plan.manifest_path.clone().unwrap_or_default(),
            parameters,
            path: plan.path.clone().unwrap_or_default(),
            paused: plan.paused.unwrap_or_default(),
            storage_document_id: plan.storage_document_id,
            tags: plan.tags.clone().unwrap_or_default(),
            version: plan.version.clone().unwrap_or_default(),
            work_pool_name: plan.work_pool_name.clone().unwrap_or_default(),
            work_queue_name: plan.work_queue_name.clone().unwrap_or_default(),
        };

        if let Err(e) = client.update(id, &payload).await {
            diags.push(api_error("Error updating deployment", "update", "deployment", &e));
            return None;
        }

        let deployment = match client.get(id).await {
            Ok(d) => d,
            Err(e) => {
                diags.push(api_error("Error refreshing Deployment state", "read", "Deployment", &e));
                return None;
            }
        };

        copy_deployment_to_model(&deployment, &mut plan);
        Some(plan)
    }

    async fn delete(&self, diags: &mut Diagnostics, state: DeploymentResourceModel) -> Option<()> {
        let client = self.sub_client(&state, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        match client.delete(id).await {
            Ok(()) => Some(()),
            Err(e) => {
                diags.push(api_error("Error deleting Deployment", "delete", "Deployment", &e));
                None
            }
        }
    }

    async fn import_state(&self, diags: &mut Diagnostics, id: &str) -> Option<DeploymentResourceModel> {
        let import = parse_workspace_import(id, "id", WorkspacePosition::Last, RESOURCE_NAME, diags)?;

        Some(DeploymentResourceModel {
            id: Some(import.identifier),
            workspace_id: import.workspace_id,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefect::deployments::GlobalConcurrencyLimit;
    use crate::provider::DynResource;
    use crate::resources::testing::mock_client;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, ResponseTemplate};

    const DEPLOYMENT_ID: &str = "5d4bf2a1-62f5-4f27-a4a5-56d7d1e0f8b5";
    const FLOW_ID: &str = "0f7c1c4e-8b3e-4d9e-a8a1-1b2c3d4e5f60";

    fn api_deployment() -> serde_json::Value {
        json!({
            "id": DEPLOYMENT_ID,
            "created": "2024-05-01T10:00:00Z",
            "updated": "2024-05-01T10:00:00Z",
            "name": "etl",
            "flow_id": FLOW_ID,
            "paused": false,
            "enforce_parameter_schema": false,
            "tags": ["nightly"],
            "parameters": {"b": 2, "a": 1},
            "job_variables": {},
            "parameter_openapi_schema": null,
            "work_pool_name": "k8s",
            "work_queue_name": "default",
            "global_concurrency_limit": {"limit": 2},
            "concurrency_options": {"collision_strategy": "ENQUEUE"},
            "pull_steps": [
                {"prefect.deployments.steps.git_clone": {"repository": "https://github.com/org/repo", "branch": "main"}}
            ]
        })
    }

    fn git_clone_model() -> PullStepModel {
        PullStepModel {
            step_type: "git_clone".to_string(),
            repository: Some("https://github.com/org/repo".to_string()),
            branch: Some("main".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_pull_step_model_to_variant() {
        let step = PullStep::try_from(&git_clone_model()).unwrap();
        match &step {
            PullStep::GitClone(s) => {
                assert_eq!(s.repository, "https://github.com/org/repo");
                assert_eq!(s.branch.as_deref(), Some("main"));
            }
            other => panic!("Expected GitClone, got {:?}", other),
        }
        assert_eq!(PullStepModel::from(&step), git_clone_model());
    }

    #[test]
    fn test_pull_step_every_type_maps_back_unchanged() {
        let models = vec![
            PullStepModel {
                step_type: "set_working_directory".to_string(),
                directory: Some("/opt/flows".to_string()),
                ..Default::default()
            },
            git_clone_model(),
            PullStepModel {
                step_type: "pull_from_s3".to_string(),
                bucket: Some("flows".to_string()),
                folder: Some("etl".to_string()),
                credentials: Some("{{ prefect.blocks.aws-credentials.prod }}".to_string()),
                requires: Some("prefect-aws".to_string()),
                ..Default::default()
            },
            PullStepModel {
                step_type: "pull_from_gcs".to_string(),
                bucket: Some("flows".to_string()),
                ..Default::default()
            },
            PullStepModel {
                step_type: "pull_from_azure_blob_storage".to_string(),
                bucket: Some("flows".to_string()),
                ..Default::default()
            },
        ];

        for model in models {
            let step = PullStep::try_from(&model).unwrap();
            assert_eq!(step.type_name(), model.step_type);
            assert_eq!(PullStepModel::from(&step), model);
        }
    }

    #[test]
    fn test_pull_step_rejects_unknown_type() {
        let model = PullStepModel {
            step_type: "run_shell_script".to_string(),
            ..Default::default()
        };
        let err = PullStep::try_from(&model).unwrap_err();
        assert!(err.to_string().contains("unknown pull step type"));
    }

    #[test]
    fn test_pull_step_rejects_missing_required_field() {
        let model = PullStepModel {
            step_type: "pull_from_s3".to_string(),
            folder: Some("etl".to_string()),
            ..Default::default()
        };
        let err = PullStep::try_from(&model).unwrap_err();
        assert!(err.to_string().contains("requires the 'bucket' attribute"));
    }

    #[test]
    fn test_pull_step_rejects_fields_of_other_variants() {
        let model = PullStepModel {
            step_type: "set_working_directory".to_string(),
            directory: Some("/opt".to_string()),
            bucket: Some("flows".to_string()),
            ..Default::default()
        };
        let err = PullStep::try_from(&model).unwrap_err();
        assert!(err.to_string().contains("bucket"));
    }

    #[test]
    fn test_map_pull_steps_reports_index() {
        let mut diags = Diagnostics::new();
        let models = vec![git_clone_model(), PullStepModel::default()];
        assert!(map_pull_steps(&models, &mut diags).is_none());
        assert_eq!(
            diags.errors().next().unwrap().attribute.as_deref(),
            Some("pull_steps[1]")
        );
    }

    #[test]
    fn test_copy_deployment_to_model() {
        let deployment: Deployment = serde_json::from_value(api_deployment()).unwrap();
        let workspace = Uuid::new_v4();
        let mut model = DeploymentResourceModel {
            workspace_id: Some(workspace),
            ..Default::default()
        };

        copy_deployment_to_model(&deployment, &mut model);

        assert_eq!(model.id.as_deref(), Some(DEPLOYMENT_ID));
        assert_eq!(model.workspace_id, Some(workspace));
        assert_eq!(model.concurrency_limit, Some(2));
        assert_eq!(
            model.concurrency_options.as_ref().unwrap().collision_strategy,
            "ENQUEUE"
        );
        assert_eq!(model.parameters.as_ref().unwrap().as_str(), r#"{"a":1,"b":2}"#);
        assert_eq!(model.job_variables.as_ref().unwrap().as_str(), "{}");
        assert_eq!(model.parameter_openapi_schema.as_ref().unwrap().as_str(), "null");
        assert_eq!(model.pull_steps.as_ref().unwrap()[0], git_clone_model());
    }

    #[test]
    fn test_copy_deployment_is_idempotent() {
        let deployment: Deployment = serde_json::from_value(api_deployment()).unwrap();
        let mut once = DeploymentResourceModel::default();
        copy_deployment_to_model(&deployment, &mut once);
        let mut twice = once.clone();
        copy_deployment_to_model(&deployment, &mut twice);
        assert_eq!(once, twice);

        let state = serde_json::to_value(&once).unwrap();
        let decoded: DeploymentResourceModel = serde_json::from_value(state).unwrap();
        assert_eq!(decoded, once);
    }

    #[test]
    fn test_concurrency_limit_falls_back_to_legacy_field() {
        let mut deployment: Deployment = serde_json::from_value(api_deployment()).unwrap();
        deployment.global_concurrency_limit = None;
        deployment.concurrency_limit = Some(7);
        let mut model = DeploymentResourceModel::default();
        copy_deployment_to_model(&deployment, &mut model);
        assert_eq!(model.concurrency_limit, Some(7));

        deployment.global_concurrency_limit = Some(GlobalConcurrencyLimit {
            limit: 3,
            id: None,
            name: None,
        });
        copy_deployment_to_model(&deployment, &mut model);
        assert_eq!(model.concurrency_limit, Some(3));
    }

    #[tokio::test]
    async fn test_create_deployment_through_registry() {
        let (server, client) = mock_client().await;
        let resource = DeploymentResource::new(Some(client));

        Mock::given(method("POST"))
            .and(path("/api/deployments/"))
            .and(body_partial_json(json!({
                "name": "etl",
                "flow_id": FLOW_ID,
                "paused": false,
                "tags": [],
                "parameters": {"a": 1, "b": 2},
                "concurrency_options": {"collision_strategy": "ENQUEUE"},
                "pull_steps": [
                    {"prefect.deployments.steps.git_clone": {"repository": "https://github.com/org/repo", "branch": "main"}}
                ]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(api_deployment()))
            .expect(1)
            .mount(&server)
            .await;

        let mut diags = Diagnostics::new();
        let state = DynResource::create(
            &resource,
            &mut diags,
            json!({
                "name": "etl",
                "flow_id": FLOW_ID,
                "parameters": "{\"b\": 2, \"a\": 1}",
                "concurrency_options": {"collision_strategy": "ENQUEUE"},
                "pull_steps": [{
                    "type": "git_clone",
                    "repository": "https://github.com/org/repo",
                    "branch": "main"
                }]
            }),
        )
        .await;

        assert!(!diags.has_error(), "{:?}", diags);
        let state = state.unwrap();
        assert_eq!(state["id"], DEPLOYMENT_ID);
        assert_eq!(state["parameters"], r#"{"a":1,"b":2}"#);
        assert_eq!(state["tags"], json!(["nightly"]));
    }

    #[tokio::test]
    async fn test_create_rejects_conflicting_pull_step_fields() {
        let (_server, client) = mock_client().await;
        let resource = DeploymentResource::new(Some(client));

        let mut diags = Diagnostics::new();
        let state = DynResource::create(
            &resource,
            &mut diags,
            json!({
                "name": "etl",
                "flow_id": FLOW_ID,
                "pull_steps": [{"type": "git_clone", "repository": "r", "bucket": "b"}]
            }),
        )
        .await;

        assert!(state.is_none());
        assert!(diags.has_error());
        assert!(diags
            .errors()
            .all(|d| d.summary == "Invalid Attribute Combination"));
    }

    #[tokio::test]
    async fn test_read_removes_missing_deployment() {
        let (server, client) = mock_client().await;
        let resource = DeploymentResource::new(Some(client));

        Mock::given(method("GET"))
            .and(path(format!("/api/deployments/{}", DEPLOYMENT_ID)))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"detail":"Deployment not found"}"#))
            .mount(&server)
            .await;

        let mut diags = Diagnostics::new();
        let state = Resource::read(
            &resource,
            &mut diags,
            DeploymentResourceModel {
                id: Some(DEPLOYMENT_ID.to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(state.is_none());
        assert!(!diags.has_error());
    }

    #[tokio::test]
    async fn test_import_with_unmodeled_pull_step() {
        let (server, client) = mock_client().await;
        let resource = DeploymentResource::new(Some(client));

        let mut deployment = api_deployment();
        deployment["pull_steps"] = json!([
            {"prefect.deployments.steps.git_clone": {"repository": "https://github.com/org/repo", "branch": "main"}},
            {"prefect.deployments.steps.pip_install_requirements": {"requirements_file": "requirements.txt"}}
        ]);
        Mock::given(method("GET"))
            .and(path(format!("/api/deployments/{}", DEPLOYMENT_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(deployment))
            .expect(1)
            .mount(&server)
            .await;

        let mut diags = Diagnostics::new();
        let state = DynResource::import(&resource, &mut diags, DEPLOYMENT_ID).await.unwrap();
        assert!(!diags.has_error());
        assert_eq!(state["pull_steps"][0]["repository"], "https://github.com/org/repo");
        assert_eq!(state["pull_steps"][1]["type"], "pip_install_requirements");
        assert_eq!(state["pull_steps"][1]["repository"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_read_rejects_malformed_id() {
        let (_server, client) = mock_client().await;
        let resource = DeploymentResource::new(Some(client));

        let mut diags = Diagnostics::new();
        let state = Resource::read(
            &resource,
            &mut diags,
            DeploymentResourceModel {
                id: Some("not-a-uuid".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(state.is_none());
        let d = diags.errors().next().unwrap();
        assert_eq!(d.summary, "Error parsing Deployment ID");
        assert_eq!(d.attribute.as_deref(), Some("id"));
    }

    #[tokio::test]
    async fn test_update_patches_then_refetches() {
        let (server, client) = mock_client().await;
        let resource = DeploymentResource::new(Some(client));

        Mock::given(method("PATCH"))
            .and(path(format!("/api/deployments/{}", DEPLOYMENT_ID)))
            .and(body_partial_json(json!({"paused": true, "work_pool_name": "k8s"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut refreshed = api_deployment();
        refreshed["paused"] = json!(true);
        Mock::given(method("GET"))
            .and(path(format!("/api/deployments/{}", DEPLOYMENT_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(refreshed))
            .expect(1)
            .mount(&server)
            .await;

        let state = DeploymentResourceModel {
            id: Some(DEPLOYMENT_ID.to_string()),
            ..Default::default()
        };
        let plan = DeploymentResourceModel {
            name: Some("etl".to_string()),
            flow_id: Some(Uuid::parse_str(FLOW_ID).unwrap()),
            paused: Some(true),
            work_pool_name: Some("k8s".to_string()),
            ..Default::default()
        };

        let mut diags = Diagnostics::new();
        let updated = Resource::update(&resource, &mut diags, plan, state).await.unwrap();
        assert_eq!(updated.paused, Some(true));
        assert_eq!(updated.id.as_deref(), Some(DEPLOYMENT_ID));
    }

    #[tokio::test]
    async fn test_import_with_workspace() {
        let resource = DeploymentResource::new(None);
        let workspace = Uuid::new_v4();

        let mut diags = Diagnostics::new();
        let model = Resource::import_state(
            &resource,
            &mut diags,
            &format!("{},{}", DEPLOYMENT_ID, workspace),
        )
        .await
        .unwrap();
        assert_eq!(model.id.as_deref(), Some(DEPLOYMENT_ID));
        assert_eq!(model.workspace_id, Some(workspace));
    }

    #[tokio::test]
    async fn test_import_rejects_three_parts() {
        let resource = DeploymentResource::new(None);
        let mut diags = Diagnostics::new();
        assert!(Resource::import_state(&resource, &mut diags, "a,b,c").await.is_none());
        assert!(diags.errors().next().unwrap().detail.contains("maximum of 2"));
    }
}
