//! `prefect_worker_metadata` data source

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{api_error, create_client_error, Diagnostics};
use crate::provider::schema::{Attribute, AttributeType, Schema};
use crate::provider::DataSource;
use crate::resources::json::NormalizedJson;
use crate::resources::{require_client, scope_id};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WorkerMetadataDataSourceModel {
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    /// Worker type to its default base job template
    #[serde(default)]
    pub base_job_configs: Option<BTreeMap<String, NormalizedJson>>,
}

pub struct WorkerMetadataDataSource {
    client: Option<PrefectClient>,
}

impl WorkerMetadataDataSource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for WorkerMetadataDataSource {
    type Model = WorkerMetadataDataSourceModel;

    fn type_name(&self) -> &'static str {
        "worker_metadata"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Get default base job configurations for the worker types known to the server. Use these as the base_job_template of a work pool.",
            [
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional()),
                ("workspace_id", Attribute::string("Workspace ID (UUID), defaults to the workspace set in the provider").optional()),
                (
                    "base_job_configs",
                    Attribute::map(AttributeType::Json, "Default base job template per worker type, eg. kubernetes, ecs, process").computed(),
                ),
            ],
        )
    }

    async fn read(
        &self,
        diags: &mut Diagnostics,
        mut config: WorkerMetadataDataSourceModel,
    ) -> Option<WorkerMetadataDataSourceModel> {
        let client = require_client(&self.client, "data source", diags)?;
        let client = client
            .worker_metadata(scope_id(config.account_id), scope_id(config.workspace_id))
            .map_err(|e| diags.push(create_client_error("worker metadata", &e)))
            .ok()?;

        let metadata = match client.get().await {
            Ok(metadata) => metadata,
            Err(e) => {
                diags.push(api_error("Error refreshing worker metadata", "read", "worker metadata", &e));
                return None;
            }
        };

        config.base_job_configs = Some(
            metadata
                .base_job_configs()
                .iter()
                .map(|(worker_type, template)| (worker_type.clone(), NormalizedJson::from_map(Some(template))))
                .collect(),
        );
        Some(config)
    }
}
