//! Flow API operations

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

use super::models::{Flow, FlowCreate, FlowUpdate};

/// Client for workspace-scoped flow routes
#[derive(Debug, Clone)]
pub struct FlowsClient {
    hc: Client,
    route_prefix: String,
    credentials: Credentials,
}

impl PrefectClient {
    pub fn flows(&self, account_id: Uuid, workspace_id: Uuid) -> Result<FlowsClient> {
        Ok(FlowsClient {
            hc: self.http().clone(),
            route_prefix: self.workspace_route(account_id, workspace_id, api::FLOWS)?,
            credentials: self.credentials().clone(),
        })
    }
}

impl FlowsClient {
    /// Create a flow; the API returns the existing flow when the name is taken
    pub async fn create(&self, payload: &FlowCreate) -> Result<Flow> {
        debug!("Creating flow '{}'", payload.name);

        let cfg = RequestConfig::new(
            Method::POST,
            format!("{}/", self.route_prefix),
            &self.credentials,
        )
        .body(payload)?
        .success_codes(SUCCESS_OK_OR_CREATED);

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to create flow"))
    }

    pub async fn get(&self, id: Uuid) -> Result<Flow> {
        let cfg = RequestConfig::new(
            Method::GET,
            format!("{}/{}", self.route_prefix, id),
            &self.credentials,
        );

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to get flow"))
    }

    pub async fn update(&self, id: Uuid, payload: &FlowUpdate) -> Result<()> {
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
            .map_err(|e| e.context("failed to update flow"))
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
            .map_err(|e| e.context("failed to delete flow"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FLOW_ID: &str = "0f7c1c4e-8b3e-4d9e-a8a1-1b2c3d4e5f60";

    fn flow_json(tags: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "id": FLOW_ID,
            "created": "2024-05-01T10:00:00Z",
            "updated": "2024-05-01T10:00:00Z",
            "name": "etl",
            "tags": tags
        })
    }

    #[tokio::test]
    async fn test_flow_lifecycle() {
        let mock_server = MockServer::start().await;
        let client = PrefectClient::test_client(&mock_server.uri());
        let id = Uuid::parse_str(FLOW_ID).unwrap();

        Mock::given(method("POST"))
            .and(path("/api/flows/"))
            .and(body_json(serde_json::json!({"name": "etl", "tags": ["a"]})))
            .respond_with(ResponseTemplate::new(201).set_body_json(flow_json(&["a"])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("PATCH"))
            .and(path(format!("/api/flows/{}", FLOW_ID)))
            .and(body_json(serde_json::json!({"tags": ["a", "b"]})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/api/flows/{}", FLOW_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(flow_json(&["a", "b"])))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("DELETE"))
            .and(path(format!("/api/flows/{}", FLOW_ID)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let flows = client.flows(Uuid::nil(), Uuid::nil()).unwrap();

        let created = flows
            .create(&FlowCreate {
                name: "etl".to_string(),
                tags: vec!["a".to_string()],
            })
            .await
            .unwrap();
        assert_eq!(created.id, id);

        flows
            .update(
                id,
                &FlowUpdate {
                    tags: vec!["a".to_string(), "b".to_string()],
                },
            )
            .await
            .unwrap();

        let fetched = flows.get(id).await.unwrap();
        assert_eq!(fetched.tags, vec!["a", "b"]);

        flows.delete(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_flow_server_error() {
        let mock_server = MockServer::start().await;
        let client = PrefectClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path(format!("/api/flows/{}", FLOW_ID)))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let err = client
            .flows(Uuid::nil(), Uuid::nil())
            .unwrap()
            .get(Uuid::parse_str(FLOW_ID).unwrap())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().starts_with("failed to get flow"));
    }
}
