//! Worker metadata API operations

use reqwest::{Client, Method};
use uuid::Uuid;

use crate::config::api;
use crate::error::Result;
use crate::prefect::client::{request_with_decode_response, RequestConfig};
use crate::prefect::credentials::Credentials;
use crate::prefect::PrefectClient;

use super::models::WorkerMetadataResponse;

#[derive(Debug, Clone)]
pub struct WorkerMetadataClient {
    hc: Client,
    route_prefix: String,
    credentials: Credentials,
}

impl PrefectClient {
    pub fn worker_metadata(
        &self,
        account_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<WorkerMetadataClient> {
        Ok(WorkerMetadataClient {
            hc: self.http().clone(),
            route_prefix: self.workspace_route(account_id, workspace_id, api::WORKER_METADATA)?,
            credentials: self.credentials().clone(),
        })
    }
}

impl WorkerMetadataClient {
    pub async fn get(&self) -> Result<WorkerMetadataResponse> {
        let cfg = RequestConfig::new(Method::GET, self.route_prefix.clone(), &self.credentials);

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to get worker metadata"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_worker_metadata() {
        let mock_server = MockServer::start().await;
        let client = PrefectClient::test_client(&mock_server.uri());

        Mock::given(method("GET"))
            .and(path("/api/collections/views/aggregate-worker-metadata"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "prefect-kubernetes": {
                    "kubernetes": {
                        "type": "kubernetes",
                        "default_base_job_configuration": {"variables": {}}
                    }
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let metadata = client
            .worker_metadata(Uuid::nil(), Uuid::nil())
            .unwrap()
            .get()
            .await
            .unwrap();
        assert!(metadata.base_job_configs().contains_key("kubernetes"));
    }
}
