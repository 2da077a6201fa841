//! `prefect_workspace` resource (account-scoped)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::import::{parse_import_id, ImportId};
use super::{parse_id, require_client, scope_id};
use crate::prefect::workspaces::{Workspace, WorkspaceCreate, WorkspaceUpdate, WorkspacesClient};
use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{api_error, create_client_error, Diagnostics};
use crate::provider::schema::{Attribute, Schema};
use crate::provider::Resource;

const RESOURCE_NAME: &str = "Workspace";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WorkspaceResourceModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn copy_workspace_to_model(workspace: &Workspace, model: &mut WorkspaceResourceModel) {
    model.id = Some(workspace.id.to_string());
    model.created = workspace.created;
    model.updated = workspace.updated;
    model.account_id = workspace.account_id.or(model.account_id);
    model.name = Some(workspace.name.clone());
    model.handle = Some(workspace.handle.clone());
    model.description = Some(workspace.description.clone());
}

pub struct WorkspaceResource {
    client: Option<PrefectClient>,
}

impl WorkspaceResource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }

    fn sub_client(&self, model: &WorkspaceResourceModel, diags: &mut Diagnostics) -> Option<WorkspacesClient> {
        let client = require_client(&self.client, "resource", diags)?;
        client
            .workspaces(scope_id(model.account_id))
            .map_err(|e| diags.push(create_client_error("workspace", &e)))
            .ok()
    }
}

#[async_trait]
impl Resource for WorkspaceResource {
    type Model = WorkspaceResourceModel;

    fn type_name(&self) -> &'static str {
        "workspace"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Workspaces are isolated environments within an account for flows, deployments and their runs.",
            [
                ("id", Attribute::string("Workspace ID (UUID)").computed()),
                ("created", Attribute::string("Timestamp of when the resource was created (RFC3339)").computed()),
                ("updated", Attribute::string("Timestamp of when the resource was updated (RFC3339)").computed()),
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional_computed()),
                ("name", Attribute::string("Name of the workspace").required()),
                ("handle", Attribute::string("Unique handle for the workspace").required()),
                ("description", Attribute::string("Description for the workspace").optional_computed()),
            ],
        )
    }

    async fn create(&self, diags: &mut Diagnostics, mut plan: WorkspaceResourceModel) -> Option<WorkspaceResourceModel> {
        let client = self.sub_client(&plan, diags)?;

        let payload = WorkspaceCreate {
            name: plan.name.clone().unwrap_or_default(),
            handle: plan.handle.clone().unwrap_or_default(),
            description: plan.description.clone().unwrap_or_default(),
        };

        match client.create(&payload).await {
            Ok(workspace) => {
                copy_workspace_to_model(&workspace, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error creating workspace", "create", "workspace", &e));
                None
            }
        }
    }

    async fn read(&self, diags: &mut Diagnostics, mut state: WorkspaceResourceModel) -> Option<WorkspaceResourceModel> {
        let client = self.sub_client(&state, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        match client.get(id).await {
            Ok(workspace) => {
                copy_workspace_to_model(&workspace, &mut state);
                Some(state)
            }
            Err(e) if e.is_not_found() => {
                warn!("Workspace {} no longer exists, removing from state", id);
                None
            }
            Err(e) => {
                diags.push(api_error("Error refreshing workspace state", "read", "workspace", &e));
                None
            }
        }
    }

    async fn update(
        &self,
        diags: &mut Diagnostics,
        mut plan: WorkspaceResourceModel,
        state: WorkspaceResourceModel,
    ) -> Option<WorkspaceResourceModel> {
        let client = self.sub_client(&plan, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        let payload = WorkspaceUpdate {
            name: plan.name.clone(),
            handle: plan.handle.clone(),
            description: plan.description.clone(),
        };
        if let Err(e) = client.update(id, &payload).await {
            diags.push(api_error("Error updating workspace", "update", "workspace", &e));
            return None;
        }

        match client.get(id).await {
            Ok(workspace) => {
                copy_workspace_to_model(&workspace, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error refreshing workspace state", "read", "workspace", &e));
                None
            }
        }
    }

    async fn delete(&self, diags: &mut Diagnostics, state: WorkspaceResourceModel) -> Option<()> {
        let client = self.sub_client(&state, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        client
            .delete(id)
            .await
            .map_err(|e| diags.push(api_error("Error deleting workspace", "delete", "workspace", &e)))
            .ok()
    }

    async fn import_state(&self, diags: &mut Diagnostics, id: &str) -> Option<WorkspaceResourceModel> {
        match parse_import_id(id, "id") {
            Ok(ImportId::Single(id)) => Some(WorkspaceResourceModel {
                id: Some(id),
                ..Default::default()
            }),
            Ok(ImportId::Pair(..)) => {
                diags.error(
                    "Unexpected Import Identifier",
                    format!("Expected a single workspace id. Got {:?}", id),
                );
                None
            }
            Err(diag) => {
                diags.push(diag);
                None
            }
        }
    }
}
