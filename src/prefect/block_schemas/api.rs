//! Block schema API operations

use reqwest::{Client, Method};
use uuid::Uuid;

use crate::config::api;
use crate::error::Result;
use crate::prefect::client::{request_with_decode_response, RequestConfig};
use crate::prefect::credentials::Credentials;
use crate::prefect::PrefectClient;

use super::models::{BlockSchema, BlockSchemaFilter};

#[derive(Debug, Clone)]
pub struct BlockSchemasClient {
    hc: Client,
    route_prefix: String,
    credentials: Credentials,
}

impl PrefectClient {
    pub fn block_schemas(&self, account_id: Uuid, workspace_id: Uuid) -> Result<BlockSchemasClient> {
        Ok(BlockSchemasClient {
            hc: self.http().clone(),
            route_prefix: self.workspace_route(account_id, workspace_id, api::BLOCK_SCHEMAS)?,
            credentials: self.credentials().clone(),
        })
    }
}

impl BlockSchemasClient {
    /// List the schemas belonging to the given block types
    pub async fn list(&self, block_type_ids: &[Uuid]) -> Result<Vec<BlockSchema>> {
        let cfg = RequestConfig::new(
            Method::POST,
            format!("{}/filter", self.route_prefix),
            &self.credentials,
        )
        .body(&BlockSchemaFilter::by_block_type_ids(block_type_ids))?;

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to get block schemas"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_list_block_schemas() {
        let mock_server = MockServer::start().await;
        let client = PrefectClient::test_client(&mock_server.uri());
        let block_type = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/api/block_schemas/filter"))
            .and(body_json(serde_json::json!({
                "block_schemas": {"block_type_id": {"any_": [block_type]}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "id": Uuid::new_v4(),
                "checksum": "sha256:abc",
                "fields": {"title": "AwsCredentials"},
                "block_type_id": block_type,
                "capabilities": null,
                "version": "2.0.0"
            }])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let schemas = client
            .block_schemas(Uuid::nil(), Uuid::nil())
            .unwrap()
            .list(&[block_type])
            .await
            .unwrap();
        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].block_type_id, block_type);
        assert!(schemas[0].capabilities.is_empty());
    }

    #[tokio::test]
    async fn test_list_block_schemas_wraps_error() {
        let mock_server = MockServer::start().await;
        let client = PrefectClient::test_client(&mock_server.uri());

        Mock::given(method("POST"))
            .and(path("/api/block_schemas/filter"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid filter"))
            .mount(&mock_server)
            .await;

        let err = client
            .block_schemas(Uuid::nil(), Uuid::nil())
            .unwrap()
            .list(&[])
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("failed to get block schemas: status code=422"));
    }
}
