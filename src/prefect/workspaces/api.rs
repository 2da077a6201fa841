//! Workspace API operations (account-scoped)

use log::debug;
use reqwest::{Client, Method};
use uuid::Uuid;

use crate::config::api;
use crate::error::Result;
use crate::prefect::client::{
    request, request_with_decode_response, RequestConfig, SUCCESS_NO_CONTENT,
    SUCCESS_OK_OR_CREATED, SUCCESS_OK_OR_NO_CONTENT,
};
use crate::prefect::credentials::Credentials;
use crate::prefect::PrefectClient;

use super::models::{Workspace, WorkspaceCreate, WorkspaceUpdate};

#[derive(Debug, Clone)]
pub struct WorkspacesClient {
    hc: Client,
    route_prefix: String,
    credentials: Credentials,
}

impl PrefectClient {
    pub fn workspaces(&self, account_id: Uuid) -> Result<WorkspacesClient> {
        Ok(WorkspacesClient {
            hc: self.http().clone(),
            route_prefix: self.account_route(account_id, api::WORKSPACES)?,
            credentials: self.credentials().clone(),
        })
    }
}

impl WorkspacesClient {
    pub async fn create(&self, payload: &WorkspaceCreate) -> Result<Workspace> {
        debug!("Creating workspace '{}' ({})", payload.name, payload.handle);

        let cfg = RequestConfig::new(
            Method::POST,
            format!("{}/", self.route_prefix),
            &self.credentials,
        )
        .body(payload)?
        .success_codes(SUCCESS_OK_OR_CREATED);

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to create workspace"))
    }

    pub async fn get(&self, id: Uuid) -> Result<Workspace> {
        let cfg = RequestConfig::new(
            Method::GET,
            format!("{}/{}", self.route_prefix, id),
            &self.credentials,
        );

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to get workspace"))
    }

    pub async fn update(&self, id: Uuid, payload: &WorkspaceUpdate) -> Result<()> {
        let cfg = RequestConfig::new(
            Method::PATCH,
            format!("{}/{}", self.route_prefix, id),
            &self.credentials,
        )
        .body(payload)?
        .success_codes(SUCCESS_NO_CONTENT);

        request(&self.hc, &cfg)
            .await
            .map(|_| ())
            .map_err(|e| e.context("failed to update workspace"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let cfg = RequestConfig::new(
            Method::DELETE,
            format!("{}/{}", self.route_prefix, id),
            &self.credentials,
        )
        .success_codes(SUCCESS_OK_OR_NO_CONTENT);

        request(&self.hc, &cfg)
            .await
            .map(|_| ())
            .map_err(|e| e.context("failed to delete workspace"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_workspace_create_and_update() {
        let mock_server = MockServer::start().await;
        let account = Uuid::new_v4();
        let id = Uuid::new_v4();
        let client = PrefectClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path(format!("/api/accounts/{}/workspaces/", account)))
            .and(body_json(serde_json::json!({"name": "Production", "handle": "prod"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": id,
                "account_id": account,
                "name": "Production",
                "handle": "prod",
                "description": null
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PATCH"))
            .and(path(format!("/api/accounts/{}/workspaces/{}", account, id)))
            .and(body_json(serde_json::json!({"description": "main"})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let workspaces = client.workspaces(account).unwrap();
        let created = workspaces
            .create(&WorkspaceCreate {
                name: "Production".to_string(),
                handle: "prod".to_string(),
                description: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(created.id, id);
        assert_eq!(created.account_id, Some(account));

        workspaces
            .update(
                id,
                &WorkspaceUpdate {
                    description: Some("main".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_workspace_error_has_context() {
        let mock_server = MockServer::start().await;
        let account = Uuid::new_v4();
        let id = Uuid::new_v4();
        let client = PrefectClient::test_client(&mock_server.uri());

        Mock::given(method("DELETE"))
            .and(path(format!("/api/accounts/{}/workspaces/{}", account, id)))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&mock_server)
            .await;

        let err = client
            .workspaces(account)
            .unwrap()
            .delete(id)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to delete workspace: status code=403 Forbidden, error=forbidden"
        );
    }
}
