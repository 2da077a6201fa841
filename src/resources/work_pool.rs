//! `prefect_work_pool` resource

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::import::{parse_workspace_import, WorkspacePosition};
use super::json::NormalizedJson;
use super::{require_client, scope_id};
use crate::prefect::work_pools::{WorkPool, WorkPoolCreate, WorkPoolUpdate, WorkPoolsClient};
use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{api_error, create_client_error, serialize_data_error, Diagnostics};
use crate::provider::schema::{Attribute, Schema};
use crate::provider::Resource;

const RESOURCE_NAME: &str = "Work Pool";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WorkPoolResourceModel {
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
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub pool_type: Option<String>,
    #[serde(default)]
    pub paused: Option<bool>,
    #[serde(default)]
    pub concurrency_limit: Option<i64>,
    #[serde(default)]
    pub default_queue_id: Option<Uuid>,
    #[serde(default)]
    pub base_job_template: Option<NormalizedJson>,
}

impl WorkPoolResourceModel {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

fn base_job_template(
    model: &WorkPoolResourceModel,
    diags: &mut Diagnostics,
) -> Option<Option<serde_json::Map<String, serde_json::Value>>> {
    match &model.base_job_template {
        None => Some(None),
        Some(doc) => doc
            .to_map()
            .map_err(|e| diags.push(serialize_data_error("base_job_template", "base_job_template", &e)))
            .ok(),
    }
}

fn copy_work_pool_to_model(pool: &WorkPool, model: &mut WorkPoolResourceModel) {
    model.id = Some(pool.id.to_string());
    model.created = pool.created;
    model.updated = pool.updated;
    model.name = Some(pool.name.clone());
    model.description = Some(pool.description.clone());
    model.pool_type = Some(pool.pool_type.clone());
    model.paused = Some(pool.is_paused);
    model.concurrency_limit = pool.concurrency_limit;
    model.default_queue_id = pool.default_queue_id;
    model.base_job_template = Some(NormalizedJson::from_map(pool.base_job_template.as_ref()));
}

pub struct WorkPoolResource {
    client: Option<PrefectClient>,
}

impl WorkPoolResource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }

    fn sub_client(&self, model: &WorkPoolResourceModel, diags: &mut Diagnostics) -> Option<WorkPoolsClient> {
        let client = require_client(&self.client, "resource", diags)?;
        client
            .work_pools(scope_id(model.account_id), scope_id(model.workspace_id))
            .map_err(|e| diags.push(create_client_error("work pool", &e)))
            .ok()
    }
}

#[async_trait]
impl Resource for WorkPoolResource {
    type Model = WorkPoolResourceModel;

    fn type_name(&self) -> &'static str {
        "work_pool"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Work pools organize work for execution. Work pools are identified by name.",
            [
                ("id", Attribute::string("Work pool ID (UUID)").computed()),
                ("created", Attribute::string("Timestamp of when the resource was created (RFC3339)").computed()),
                ("updated", Attribute::string("Timestamp of when the resource was updated (RFC3339)").computed()),
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional()),
                ("workspace_id", Attribute::string("Workspace ID (UUID), defaults to the workspace set in the provider").optional()),
                ("name", Attribute::string("Name of the work pool").required().requires_replace()),
                ("description", Attribute::string("Description of the work pool").optional_computed()),
                (
                    "type",
                    Attribute::string("Type of the work pool, eg. kubernetes, ecs, process")
                        .optional_computed()
                        .default_value(json!("prefect-agent"))
                        .requires_replace(),
                ),
                ("paused", Attribute::bool("Whether this work pool is paused").optional_computed().default_value(json!(false))),
                ("concurrency_limit", Attribute::number("The concurrency limit applied to this work pool").optional()),
                ("default_queue_id", Attribute::string("The ID (UUID) of the default queue associated with this work pool").computed()),
                (
                    "base_job_template",
                    Attribute::json("The base job template for the work pool, as a JSON string").optional_computed(),
                ),
            ],
        )
    }

    async fn create(&self, diags: &mut Diagnostics, mut plan: WorkPoolResourceModel) -> Option<WorkPoolResourceModel> {
        let client = self.sub_client(&plan, diags)?;
        let template = base_job_template(&plan, diags)?;

        let payload = WorkPoolCreate {
            name: plan.name().to_string(),
            description: plan.description.clone().unwrap_or_default(),
            pool_type: plan.pool_type.clone().unwrap_or_default(),
            is_paused: plan.paused.unwrap_or_default(),
            concurrency_limit: plan.concurrency_limit,
            base_job_template: template.unwrap_or_default(),
        };

        match client.create(&payload).await {
            Ok(pool) => {
                copy_work_pool_to_model(&pool, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error creating work pool", "create", "work pool", &e));
                None
            }
        }
    }

    async fn read(&self, diags: &mut Diagnostics, mut state: WorkPoolResourceModel) -> Option<WorkPoolResourceModel> {
        let client = self.sub_client(&state, diags)?;

        match client.get(state.name()).await {
            Ok(pool) => {
                copy_work_pool_to_model(&pool, &mut state);
                Some(state)
            }
            Err(e) if e.is_not_found() => {
                warn!("Work pool '{}' no longer exists, removing from state", state.name());
                None
            }
            Err(e) => {
                diags.push(api_error("Error refreshing work pool state", "read", "work pool", &e));
                None
            }
        }
    }

    async fn update(
        &self,
        diags: &mut Diagnostics,
        mut plan: WorkPoolResourceModel,
        state: WorkPoolResourceModel,
    ) -> Option<WorkPoolResourceModel> {
        let client = self.sub_client(&plan, diags)?;
        let template = base_job_template(&plan, diags)?;

        let payload = WorkPoolUpdate {
            description: plan.description.clone(),
            is_paused: plan.paused,
            concurrency_limit: plan.concurrency_limit,
            base_job_template: template,
        };
        if let Err(e) = client.update(state.name(), &payload).await {
            diags.push(api_error("Error updating work pool", "update", "work pool", &e));
            return None;
        }

        match client.get(state.name()).await {
            Ok(pool) => {
                copy_work_pool_to_model(&pool, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error refreshing work pool state", "read", "work pool", &e));
                None
            }
        }
    }

    async fn delete(&self, diags: &mut Diagnostics, state: WorkPoolResourceModel) -> Option<()> {
        let client = self.sub_client(&state, diags)?;

        client
            .delete(state.name())
            .await
            .map_err(|e| diags.push(api_error("Error deleting work pool", "delete", "work pool", &e)))
            .ok()
    }

    async fn import_state(&self, diags: &mut Diagnostics, id: &str) -> Option<WorkPoolResourceModel> {
        let import = parse_workspace_import(id, "name", WorkspacePosition::First, RESOURCE_NAME, diags)?;

        Some(WorkPoolResourceModel {
            name: Some(import.identifier),
            workspace_id: import.workspace_id,
            ..Default::default()
        })
    }
}
