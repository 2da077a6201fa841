//! `prefect_variable` resource

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::import::{parse_workspace_import, WorkspacePosition};
use super::json::NormalizedJson;
use super::{parse_id, require_client, scope_id};
use crate::prefect::variables::{Variable, VariableCreate, VariableUpdate, VariablesClient};
use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{api_error, create_client_error, Diagnostics};
use crate::provider::schema::{Attribute, Schema};
use crate::provider::Resource;

const RESOURCE_NAME: &str = "Variable";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VariableResourceModel {
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
    pub value: Option<NormalizedJson>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl VariableResourceModel {
    fn value(&self) -> serde_json::Value {
        self.value
            .as_ref()
            .map(NormalizedJson::to_value)
            .unwrap_or_default()
    }
}

fn copy_variable_to_model(variable: &Variable, model: &mut VariableResourceModel) {
    model.id = Some(variable.id.to_string());
    model.created = variable.created;
    model.updated = variable.updated;
    model.name = Some(variable.name.clone());
    model.value = Some(NormalizedJson::from_value(&variable.value));
    model.tags = Some(variable.tags.clone());
}

pub struct VariableResource {
    client: Option<PrefectClient>,
}

impl VariableResource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }

    fn sub_client(&self, model: &VariableResourceModel, diags: &mut Diagnostics) -> Option<VariablesClient> {
        let client = require_client(&self.client, "resource", diags)?;
        client
            .variables(scope_id(model.account_id), scope_id(model.workspace_id))
            .map_err(|e| diags.push(create_client_error("variable", &e)))
            .ok()
    }
}

#[async_trait]
impl Resource for VariableResource {
    type Model = VariableResourceModel;

    fn type_name(&self) -> &'static str {
        "variable"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Variables are named, mutable JSON values that can be shared across flows and deployments.",
            [
                ("id", Attribute::string("Variable ID (UUID)").computed()),
                ("created", Attribute::string("Timestamp of when the resource was created (RFC3339)").computed()),
                ("updated", Attribute::string("Timestamp of when the resource was updated (RFC3339)").computed()),
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional()),
                ("workspace_id", Attribute::string("Workspace ID (UUID), defaults to the workspace set in the provider").optional()),
                ("name", Attribute::string("Name of the variable").required()),
                (
                    "value",
                    Attribute::json("Value of the variable as a JSON document; strings, numbers, booleans, lists and objects are accepted")
                        .required(),
                ),
                ("tags", Attribute::string_list("Tags associated with the variable").optional_computed().default_value(json!([]))),
            ],
        )
    }

    async fn create(
        &self,
        diags: &mut Diagnostics,
        mut plan: VariableResourceModel,
    ) -> Option<VariableResourceModel> {
        let client = self.sub_client(&plan, diags)?;

        let payload = VariableCreate {
            name: plan.name.clone().unwrap_or_default(),
            value: plan.value(),
            tags: plan.tags.clone().unwrap_or_default(),
        };

        match client.create(&payload).await {
            Ok(variable) => {
                copy_variable_to_model(&variable, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error creating variable", "create", "variable", &e));
                None
            }
        }
    }

    /// Looks up by id, or by name when the state has no id yet
    async fn read(
        &self,
        diags: &mut Diagnostics,
        mut state: VariableResourceModel,
    ) -> Option<VariableResourceModel> {
        let client = self.sub_client(&state, diags)?;

        let result = match (&state.id, &state.name) {
            (None, Some(name)) => client.get_by_name(name).await,
            _ => {
                let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;
                client.get(id).await
            }
        };

        match result {
            Ok(variable) => {
                copy_variable_to_model(&variable, &mut state);
                Some(state)
            }
            Err(e) if e.is_not_found() => {
                warn!("Variable {:?} no longer exists, removing from state", state.id.or(state.name));
                None
            }
            Err(e) => {
                diags.push(api_error("Error refreshing variable state", "read", "variable", &e));
                None
            }
        }
    }

    async fn update(
        &self,
        diags: &mut Diagnostics,
        mut plan: VariableResourceModel,
        state: VariableResourceModel,
    ) -> Option<VariableResourceModel> {
        let client = self.sub_client(&plan, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        let payload = VariableUpdate {
            name: plan.name.clone(),
            value: Some(plan.value()),
            tags: plan.tags.clone(),
        };
        if let Err(e) = client.update(id, &payload).await {
            diags.push(api_error("Error updating variable", "update", "variable", &e));
            return None;
        }

        match client.get(id).await {
            Ok(variable) => {
                copy_variable_to_model(&variable, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error refreshing variable state", "read", "variable", &e));
                None
            }
        }
    }

    async fn delete(&self, diags: &mut Diagnostics, state: VariableResourceModel) -> Option<()> {
        let client = self.sub_client(&state, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        client
            .delete(id)
            .await
            .map_err(|e| diags.push(api_error("Error deleting variable", "delete", "variable", &e)))
            .ok()
    }

    /// `id`, or `workspace_id,name`
    async fn import_state(&self, diags: &mut Diagnostics, id: &str) -> Option<VariableResourceModel> {
        let import = parse_workspace_import(id, "name", WorkspacePosition::First, RESOURCE_NAME, diags)?;

        let model = match import.workspace_id {
            Some(workspace_id) => VariableResourceModel {
                name: Some(import.identifier),
                workspace_id: Some(workspace_id),
                ..Default::default()
            },
            None if Uuid::parse_str(&import.identifier).is_ok() => VariableResourceModel {
                id: Some(import.identifier),
                ..Default::default()
            },
            None => VariableResourceModel {
                name: Some(import.identifier),
                ..Default::default()
            },
        };
        Some(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DynResource;
    use crate::resources::testing::mock_client;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, ResponseTemplate};

    const VARIABLE_ID: &str = "9a3e0d3c-1f1e-4c55-9f7e-6c1a4b2d8e01";

    fn api_variable(value: serde_json::Value) -> serde_json::Value {
        json!({
            "id": VARIABLE_ID,
            "created": "2024-05-01T10:00:00Z",
            "updated": "2024-05-01T10:00:00Z",
            "name": "retries",
            "value": value,
            "tags": []
        })
    }

    #[tokio::test]
    async fn test_create_sends_decoded_value() {
        let (server, client) = mock_client().await;
        let resource = VariableResource::new(Some(client));

        Mock::given(method("POST"))
            .and(path("/api/variables/"))
            .and(body_json(json!({"name": "retries", "value": {"max": 3, "backoff": [1, 2]}, "tags": []})))
            .respond_with(ResponseTemplate::new(201).set_body_json(api_variable(json!({"backoff": [1, 2], "max": 3}))))
            .expect(1)
            .mount(&server)
            .await;

        let mut diags = Diagnostics::new();
        let state = DynResource::create(
            &resource,
            &mut diags,
            json!({"name": "retries", "value": "{\"max\": 3, \"backoff\": [1, 2]}"}),
        )
        .await
        .unwrap();

        assert_eq!(state["value"], r#"{"backoff":[1,2],"max":3}"#);
        assert_eq!(state["id"], VARIABLE_ID);
    }

    #[tokio::test]
    async fn test_scalar_values_are_kept_as_json() {
        let (server, client) = mock_client().await;
        let resource = VariableResource::new(Some(client));

        Mock::given(method("GET"))
            .and(path(format!("/api/variables/{}", VARIABLE_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(api_variable(json!("prod"))))
            .mount(&server)
            .await;

        let mut diags = Diagnostics::new();
        let state = Resource::read(
            &resource,
            &mut diags,
            VariableResourceModel {
                id: Some(VARIABLE_ID.to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(state.value.unwrap().as_str(), "\"prod\"");
    }

    #[tokio::test]
    async fn test_import_by_workspace_and_name() {
        let (server, client) = mock_client().await;
        let resource = VariableResource::new(Some(client));
        let workspace = Uuid::new_v4();

        let mut diags = Diagnostics::new();
        let partial = Resource::import_state(&resource, &mut diags, &format!("{},retries", workspace))
            .await
            .unwrap();
        assert_eq!(partial.name.as_deref(), Some("retries"));
        assert_eq!(partial.workspace_id, Some(workspace));
        assert!(partial.id.is_none());

        Mock::given(method("GET"))
            .and(path("/api/variables/name/retries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(api_variable(json!(3))))
            .expect(1)
            .mount(&server)
            .await;

        // No account on a self-hosted endpoint, so the workspace segment is dropped
        let state = DynResource::import(&resource, &mut diags, &format!("{},retries", workspace))
            .await
            .unwrap();
        assert_eq!(state["id"], VARIABLE_ID);
        assert_eq!(state["value"], "3");
        assert_eq!(state["workspace_id"], workspace.to_string());
    }

    #[tokio::test]
    async fn test_import_by_id_or_bare_name() {
        let (server, client) = mock_client().await;
        let resource = VariableResource::new(Some(client));

        let mut diags = Diagnostics::new();
        let partial = Resource::import_state(&resource, &mut diags, VARIABLE_ID).await.unwrap();
        assert_eq!(partial.id.as_deref(), Some(VARIABLE_ID));
        assert!(partial.name.is_none());

        Mock::given(method("GET"))
            .and(path("/api/variables/name/retries"))
            .respond_with(ResponseTemplate::new(200).set_body_json(api_variable(json!(3))))
            .expect(1)
            .mount(&server)
            .await;

        let state = DynResource::import(&resource, &mut diags, "retries").await.unwrap();
        assert!(!diags.has_error());
        assert_eq!(state["id"], VARIABLE_ID);
        assert_eq!(state["name"], "retries");
    }

    #[tokio::test]
    async fn test_update_sends_all_fields() {
        let (server, client) = mock_client().await;
        let resource = VariableResource::new(Some(client));

        Mock::given(method("PATCH"))
            .and(path(format!("/api/variables/{}", VARIABLE_ID)))
            .and(body_json(json!({"name": "retries", "value": 5, "tags": ["ops"]})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/api/variables/{}", VARIABLE_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(api_variable(json!(5))))
            .mount(&server)
            .await;

        let mut diags = Diagnostics::new();
        let state = DynResource::update(
            &resource,
            &mut diags,
            json!({"name": "retries", "value": "5", "tags": ["ops"]}),
            json!({"id": VARIABLE_ID, "name": "retries", "value": "3"}),
        )
        .await
        .unwrap();
        assert_eq!(state["value"], "5");
        assert!(!diags.has_error());
    }
}
