//! `prefect_webhook` resource

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::import::{parse_workspace_import, WorkspacePosition};
use super::{parse_id, require_client, scope_id};
use crate::prefect::webhooks::{Webhook, WebhookRequest, WebhooksClient};
use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{api_error, create_client_error, Diagnostics};
use crate::provider::schema::{Attribute, Schema};
use crate::provider::Resource;

const RESOURCE_NAME: &str = "Webhook";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WebhookResourceModel {
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
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl WebhookResourceModel {
    fn to_request(&self) -> WebhookRequest {
        WebhookRequest {
            name: self.name.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            template: self.template.clone().unwrap_or_default(),
        }
    }
}

fn copy_webhook_to_model(webhook: &Webhook, model: &mut WebhookResourceModel) {
    model.id = Some(webhook.id.to_string());
    model.created = webhook.created;
    model.updated = webhook.updated;
    model.account_id = webhook.account_id.or(model.account_id);
    model.workspace_id = webhook.workspace_id.or(model.workspace_id);
    model.name = Some(webhook.name.clone());
    model.description = Some(webhook.description.clone());
    model.enabled = Some(webhook.enabled);
    model.template = Some(webhook.template.clone());
    model.endpoint = Some(webhook.endpoint());
}

pub struct WebhookResource {
    client: Option<PrefectClient>,
}

impl WebhookResource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }

    fn sub_client(&self, model: &WebhookResourceModel, diags: &mut Diagnostics) -> Option<WebhooksClient> {
        let client = require_client(&self.client, "resource", diags)?;
        client
            .webhooks(scope_id(model.account_id), scope_id(model.workspace_id))
            .map_err(|e| diags.push(create_client_error("webhook", &e)))
            .ok()
    }
}

#[async_trait]
impl Resource for WebhookResource {
    type Model = WebhookResourceModel;

    fn type_name(&self) -> &'static str {
        "webhook"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Webhooks receive events from external services and turn them into Prefect events using a Jinja2 template.",
            [
                ("id", Attribute::string("Webhook ID (UUID)").computed()),
                ("created", Attribute::string("Timestamp of when the resource was created (RFC3339)").computed()),
                ("updated", Attribute::string("Timestamp of when the resource was updated (RFC3339)").computed()),
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional_computed()),
                ("workspace_id", Attribute::string("Workspace ID (UUID), defaults to the workspace set in the provider").optional_computed()),
                ("name", Attribute::string("Name of the webhook").required()),
                (
                    "description",
                    Attribute::string("Description of the webhook").optional_computed().default_value(json!("")),
                ),
                (
                    "enabled",
                    Attribute::bool("Whether the webhook is enabled").optional_computed().default_value(json!(true)),
                ),
                ("template", Attribute::string("Template used by the webhook").required()),
                ("endpoint", Attribute::string("The fully-formed webhook endpoint, eg. https://api.prefect.cloud/SLUG").computed()),
            ],
        )
    }

    async fn create(&self, diags: &mut Diagnostics, mut plan: WebhookResourceModel) -> Option<WebhookResourceModel> {
        let client = self.sub_client(&plan, diags)?;

        match client.create(&plan.to_request()).await {
            Ok(webhook) => {
                debug!("Created webhook {} with slug '{}'", webhook.id, webhook.slug);
                copy_webhook_to_model(&webhook, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error creating webhook", "create", "webhook", &e));
                None
            }
        }
    }

    async fn read(&self, diags: &mut Diagnostics, mut state: WebhookResourceModel) -> Option<WebhookResourceModel> {
        let client = self.sub_client(&state, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        match client.get(id).await {
            Ok(webhook) => {
                copy_webhook_to_model(&webhook, &mut state);
                Some(state)
            }
            Err(e) if e.is_not_found() => {
                warn!("Webhook {} no longer exists, removing from state", id);
                None
            }
            Err(e) => {
                diags.push(api_error("Error refreshing webhook state", "read", "webhook", &e));
                None
            }
        }
    }

    /// The API replaces the whole webhook, then the result is re-fetched
    async fn update(
        &self,
        diags: &mut Diagnostics,
        mut plan: WebhookResourceModel,
        state: WebhookResourceModel,
    ) -> Option<WebhookResourceModel> {
        let client = self.sub_client(&plan, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        if let Err(e) = client.update(id, &plan.to_request()).await {
            diags.push(api_error("Error updating webhook", "update", "webhook", &e));
            return None;
        }

        match client.get(id).await {
            Ok(webhook) => {
                copy_webhook_to_model(&webhook, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error refreshing webhook state", "read", "webhook", &e));
                None
            }
        }
    }

    async fn delete(&self, diags: &mut Diagnostics, state: WebhookResourceModel) -> Option<()> {
        let client = self.sub_client(&state, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        client
            .delete(id)
            .await
            .map_err(|e| diags.push(api_error("Error deleting webhook", "delete", "webhook", &e)))
            .ok()
    }

    async fn import_state(&self, diags: &mut Diagnostics, id: &str) -> Option<WebhookResourceModel> {
        let import = parse_workspace_import(id, "id", WorkspacePosition::First, RESOURCE_NAME, diags)?;

        Some(WebhookResourceModel {
            id: Some(import.identifier),
            workspace_id: import.workspace_id,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DynResource;
    use crate::resources::testing::mock_client;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, ResponseTemplate};

    const WEBHOOK_ID: &str = "3f1b6a2e-7c44-4a7b-9e0d-2f6c8a1b5d90";
    const TEMPLATE: &str = r#"{"event": "webhook.called", "resource": {"prefect.resource.id": "my.resource"}}"#;

    fn api_webhook(enabled: bool) -> serde_json::Value {
        json!({
            "id": WEBHOOK_ID,
            "created": "2024-05-01T10:00:00Z",
            "updated": "2024-05-01T10:00:00Z",
            "name": "github",
            "description": "",
            "enabled": enabled,
            "template": TEMPLATE,
            "slug": "abc123"
        })
    }

    #[tokio::test]
    async fn test_create_applies_defaults_and_computes_endpoint() {
        let (server, client) = mock_client().await;
        let resource = WebhookResource::new(Some(client));

        Mock::given(method("POST"))
            .and(path("/api/webhooks/"))
            .and(body_json(json!({
                "name": "github",
                "description": "",
                "enabled": true,
                "template": TEMPLATE
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(api_webhook(true)))
            .expect(1)
            .mount(&server)
            .await;

        let mut diags = Diagnostics::new();
        let state = DynResource::create(
            &resource,
            &mut diags,
            json!({"name": "github", "template": TEMPLATE}),
        )
        .await
        .unwrap();

        assert_eq!(state["endpoint"], "https://api.prefect.cloud/abc123");
        assert_eq!(state["enabled"], true);
        assert_eq!(state["description"], "");
    }

    #[tokio::test]
    async fn test_update_puts_then_refetches() {
        let (server, client) = mock_client().await;
        let resource = WebhookResource::new(Some(client));

        Mock::given(method("PUT"))
            .and(path(format!("/api/webhooks/{}", WEBHOOK_ID)))
            .and(body_json(json!({
                "name": "github",
                "description": "",
                "enabled": false,
                "template": TEMPLATE
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/api/webhooks/{}", WEBHOOK_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(api_webhook(false)))
            .expect(1)
            .mount(&server)
            .await;

        let mut diags = Diagnostics::new();
        let state = DynResource::update(
            &resource,
            &mut diags,
            json!({"name": "github", "template": TEMPLATE, "enabled": false}),
            json!({"id": WEBHOOK_ID}),
        )
        .await
        .unwrap();
        assert_eq!(state["enabled"], false);
        assert_eq!(state["id"], WEBHOOK_ID);
    }

    #[tokio::test]
    async fn test_import_forms() {
        let resource = WebhookResource::new(None);
        let workspace = Uuid::new_v4();
        let mut diags = Diagnostics::new();

        let model = Resource::import_state(&resource, &mut diags, &format!("{},{}", workspace, WEBHOOK_ID))
            .await
            .unwrap();
        assert_eq!(model.id.as_deref(), Some(WEBHOOK_ID));
        assert_eq!(model.workspace_id, Some(workspace));

        let model = Resource::import_state(&resource, &mut diags, WEBHOOK_ID).await.unwrap();
        assert_eq!(model.id.as_deref(), Some(WEBHOOK_ID));
        assert!(model.workspace_id.is_none());

        assert!(Resource::import_state(&resource, &mut diags, &format!("{},", workspace))
            .await
            .is_none());
        assert!(diags.errors().next().unwrap().detail.contains("`workspace_id,id`"));
    }

    #[tokio::test]
    async fn test_read_without_client() {
        let resource = WebhookResource::new(None);
        let mut diags = Diagnostics::new();
        let state = Resource::read(
            &resource,
            &mut diags,
            WebhookResourceModel {
                id: Some(WEBHOOK_ID.to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(state.is_none());
        assert_eq!(diags.errors().next().unwrap().summary, "Unconfigured resource");
    }
}
