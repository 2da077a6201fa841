//! `prefect_work_pools` data source

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_id_list;
use crate::prefect::work_pools::WorkPool;
use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{api_error, create_client_error, Diagnostics};
use crate::provider::schema::{attributes, Attribute, Schema};
use crate::provider::DataSource;
use crate::resources::json::NormalizedJson;
use crate::resources::{require_client, scope_id};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WorkPoolsDataSourceModel {
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub filter_any: Option<Vec<String>>,
    #[serde(default)]
    pub work_pools: Option<Vec<WorkPoolSummary>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkPoolSummary {
    pub id: Uuid,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub pool_type: String,
    pub paused: bool,
    pub concurrency_limit: Option<i64>,
    pub default_queue_id: Option<Uuid>,
    pub base_job_template: NormalizedJson,
}

impl From<&WorkPool> for WorkPoolSummary {
    fn from(pool: &WorkPool) -> Self {
        Self {
            id: pool.id,
            created: pool.created,
            updated: pool.updated,
            name: pool.name.clone(),
            description: pool.description.clone(),
            pool_type: pool.pool_type.clone(),
            paused: pool.is_paused,
            concurrency_limit: pool.concurrency_limit,
            default_queue_id: pool.default_queue_id,
            base_job_template: NormalizedJson::from_map(pool.base_job_template.as_ref()),
        }
    }
}

pub struct WorkPoolsDataSource {
    client: Option<PrefectClient>,
}

impl WorkPoolsDataSource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for WorkPoolsDataSource {
    type Model = WorkPoolsDataSourceModel;

    fn type_name(&self) -> &'static str {
        "work_pools"
    }

    fn schema(&self) -> Schema {
        let pool = attributes([
            ("id", Attribute::string("Work pool ID (UUID)").computed()),
            ("created", Attribute::string("Timestamp of when the resource was created (RFC3339)").computed()),
            ("updated", Attribute::string("Timestamp of when the resource was updated (RFC3339)").computed()),
            ("name", Attribute::string("Name of the work pool").computed()),
            ("description", Attribute::string("Description of the work pool").computed()),
            ("type", Attribute::string("Type of the work pool").computed()),
            ("paused", Attribute::bool("Whether this work pool is paused").computed()),
            ("concurrency_limit", Attribute::number("The concurrency limit applied to this work pool").computed()),
            ("default_queue_id", Attribute::string("The ID (UUID) of the default queue").computed()),
            ("base_job_template", Attribute::json("The base job template for the work pool").computed()),
        ]);

        Schema::new(
            "Get information about multiple work pools, optionally restricted to a set of IDs.",
            [
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional()),
                ("workspace_id", Attribute::string("Workspace ID (UUID), defaults to the workspace set in the provider").optional()),
                ("filter_any", Attribute::string_list("Work pool IDs (UUID) to filter for").optional()),
                ("work_pools", Attribute::object_list(pool, "Work pools returned by the server").computed()),
            ],
        )
    }

    async fn read(
        &self,
        diags: &mut Diagnostics,
        mut config: WorkPoolsDataSourceModel,
    ) -> Option<WorkPoolsDataSourceModel> {
        let client = require_client(&self.client, "data source", diags)?;
        let client = client
            .work_pools(scope_id(config.account_id), scope_id(config.workspace_id))
            .map_err(|e| diags.push(create_client_error("work pool", &e)))
            .ok()?;

        let filter = parse_id_list(
            config.filter_any.as_deref().unwrap_or_default(),
            "filter_any",
            "Work Pool",
            diags,
        )?;

        let pools = match client.list(&filter).await {
            Ok(pools) => pools,
            Err(e) => {
                diags.push(api_error("Error refreshing work pools state", "read", "work pools", &e));
                return None;
            }
        };

        debug!("Mapped {} work pools", pools.len());
        config.work_pools = Some(pools.iter().map(WorkPoolSummary::from).collect());
        Some(config)
    }
}
