//! `prefect_flow` resource

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::import::{parse_workspace_import, WorkspacePosition};
use super::{parse_id, require_client, scope_id};
use crate::prefect::flows::{Flow, FlowCreate, FlowUpdate, FlowsClient};
use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{api_error, create_client_error, Diagnostics};
use crate::provider::schema::{Attribute, Schema};
use crate::provider::Resource;

const RESOURCE_NAME: &str = "Flow";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FlowResourceModel {
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
    pub tags: Option<Vec<String>>,
}

fn copy_flow_to_model(flow: &Flow, model: &mut FlowResourceModel) {
    model.id = Some(flow.id.to_string());
    model.created = flow.created;
    model.updated = flow.updated;
    model.name = Some(flow.name.clone());
    model.tags = Some(flow.tags.clone());
}

pub struct FlowResource {
    client: Option<PrefectClient>,
}

impl FlowResource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }

    fn sub_client(&self, model: &FlowResourceModel, diags: &mut Diagnostics) -> Option<FlowsClient> {
        let client = require_client(&self.client, "resource", diags)?;
        client
            .flows(scope_id(model.account_id), scope_id(model.workspace_id))
            .map_err(|e| diags.push(create_client_error("flow", &e)))
            .ok()
    }
}

#[async_trait]
impl Resource for FlowResource {
    type Model = FlowResourceModel;

    fn type_name(&self) -> &'static str {
        "flow"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Flows are the most central Prefect object. A flow is a container for workflow logic as code.",
            [
                ("id", Attribute::string("Flow ID (UUID)").computed()),
                ("created", Attribute::string("Timestamp of when the resource was created (RFC3339)").computed()),
                ("updated", Attribute::string("Timestamp of when the resource was updated (RFC3339)").computed()),
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional()),
                ("workspace_id", Attribute::string("Workspace ID (UUID), defaults to the workspace set in the provider").optional()),
                ("name", Attribute::string("Name of the flow").required().requires_replace()),
                ("tags", Attribute::string_list("Tags associated with the flow").optional_computed().default_value(json!([]))),
            ],
        )
    }

    async fn create(&self, diags: &mut Diagnostics, mut plan: FlowResourceModel) -> Option<FlowResourceModel> {
        let client = self.sub_client(&plan, diags)?;

        let payload = FlowCreate {
            name: plan.name.clone().unwrap_or_default(),
            tags: plan.tags.clone().unwrap_or_default(),
        };

        match client.create(&payload).await {
            Ok(flow) => {
                copy_flow_to_model(&flow, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error creating flow", "create", "flow", &e));
                None
            }
        }
    }

    async fn read(&self, diags: &mut Diagnostics, mut state: FlowResourceModel) -> Option<FlowResourceModel> {
        let client = self.sub_client(&state, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        match client.get(id).await {
            Ok(flow) => {
                copy_flow_to_model(&flow, &mut state);
                Some(state)
            }
            Err(e) if e.is_not_found() => {
                warn!("Flow {} no longer exists, removing from state", id);
                None
            }
            Err(e) => {
                diags.push(api_error("Error refreshing flow state", "read", "flow", &e));
                None
            }
        }
    }

    async fn update(
        &self,
        diags: &mut Diagnostics,
        mut plan: FlowResourceModel,
        state: FlowResourceModel,
    ) -> Option<FlowResourceModel> {
        let client = self.sub_client(&plan, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        let payload = FlowUpdate {
            tags: plan.tags.clone().unwrap_or_default(),
        };
        if let Err(e) = client.update(id, &payload).await {
            diags.push(api_error("Error updating flow", "update", "flow", &e));
            return None;
        }

        match client.get(id).await {
            Ok(flow) => {
                copy_flow_to_model(&flow, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error refreshing flow state", "read", "flow", &e));
                None
            }
        }
    }

    async fn delete(&self, diags: &mut Diagnostics, state: FlowResourceModel) -> Option<()> {
        let client = self.sub_client(&state, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        client
            .delete(id)
            .await
            .map_err(|e| diags.push(api_error("Error deleting flow", "delete", "flow", &e)))
            .ok()
    }

    async fn import_state(&self, diags: &mut Diagnostics, id: &str) -> Option<FlowResourceModel> {
        let import = parse_workspace_import(id, "id", WorkspacePosition::Last, RESOURCE_NAME, diags)?;

        Some(FlowResourceModel {
            id: Some(import.identifier),
            workspace_id: import.workspace_id,
            ..Default::default()
        })
    }
}
