//! Prefect HTTP client and request plumbing

use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::config::http;
use crate::error::{PrefectError, Result};
use crate::prefect::credentials::Credentials;
use crate::prefect::endpoint::{endpoint_host, normalize_endpoint};
use crate::prefect::helpers::{
    account_scoped_url, id_or_default, validate_cloud_account, validate_cloud_endpoint,
    workspace_scoped_url,
};

/// Most common success criteria
pub(crate) const SUCCESS_OK: &[StatusCode] = &[StatusCode::OK];

/// Success criteria for endpoints that answer 201
pub(crate) const SUCCESS_CREATED: &[StatusCode] = &[StatusCode::CREATED];

/// Success criteria for endpoints that answer 204
pub(crate) const SUCCESS_NO_CONTENT: &[StatusCode] = &[StatusCode::NO_CONTENT];

/// Success criteria of either 200 or 204
pub(crate) const SUCCESS_OK_OR_NO_CONTENT: &[StatusCode] =
    &[StatusCode::OK, StatusCode::NO_CONTENT];

/// Success criteria of either 200 or 201
pub(crate) const SUCCESS_OK_OR_CREATED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];

/// Prefect API client
///
/// Holds the HTTP transport, the normalized endpoint, credentials and the
/// provider-level default account/workspace. Sub-clients for individual
/// resources are created on demand from it (see `deployments()`,
/// `webhooks()`, ...).
#[derive(Debug, Clone)]
pub struct PrefectClient {
    http: Client,
    endpoint: String,
    endpoint_host: String,
    credentials: Credentials,
    default_account_id: Uuid,
    default_workspace_id: Uuid,
}

impl PrefectClient {
    /// Create a new client with connection pooling and timeouts.
    ///
    /// The endpoint is normalized to end in `/api`.
    pub fn new(endpoint: &str, credentials: Credentials) -> Result<Self> {
        let endpoint = normalize_endpoint(endpoint)?;

        let http = Client::builder()
            .pool_idle_timeout(http::POOL_IDLE_TIMEOUT)
            .connect_timeout(http::CONNECT_TIMEOUT)
            .timeout(http::REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            http,
            endpoint_host: endpoint_host(&endpoint),
            endpoint,
            credentials,
            default_account_id: Uuid::nil(),
            default_workspace_id: Uuid::nil(),
        })
    }

    /// Set the account and workspace used when a resource leaves them unset
    pub fn with_defaults(mut self, account_id: Uuid, workspace_id: Uuid) -> Self {
        self.default_account_id = account_id;
        self.default_workspace_id = workspace_id;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn endpoint_host(&self) -> &str {
        &self.endpoint_host
    }

    pub fn default_account_id(&self) -> Uuid {
        self.default_account_id
    }

    pub fn default_workspace_id(&self) -> Uuid {
        self.default_workspace_id
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Resolve the route prefix of a workspace-scoped resource.
    ///
    /// Nil IDs fall back to the client defaults before cloud validation runs.
    pub(crate) fn workspace_route(
        &self,
        account_id: Uuid,
        workspace_id: Uuid,
        route: &str,
    ) -> Result<String> {
        let account_id = id_or_default(account_id, self.default_account_id);
        let workspace_id = id_or_default(workspace_id, self.default_workspace_id);

        validate_cloud_endpoint(&self.endpoint, account_id, workspace_id)?;

        let prefix = workspace_scoped_url(&self.endpoint, account_id, workspace_id, route);
        debug!("Resolved route prefix: {}", prefix);
        Ok(prefix)
    }

    /// Resolve the route prefix of an account-scoped resource.
    pub(crate) fn account_route(&self, account_id: Uuid, route: &str) -> Result<String> {
        let account_id = id_or_default(account_id, self.default_account_id);

        validate_cloud_account(&self.endpoint, account_id)?;

        let prefix = if account_id.is_nil() {
            format!("{}/{}", self.endpoint, route)
        } else {
            account_scoped_url(&self.endpoint, account_id, route)
        };
        debug!("Resolved route prefix: {}", prefix);
        Ok(prefix)
    }
}

#[cfg(test)]
impl PrefectClient {
    /// Create a test client pointed at a mock server
    pub fn test_client(base_url: &str) -> Self {
        Self::new(base_url, Credentials::ApiKey("test-key".to_string()))
            .expect("mock server uri is a valid endpoint")
    }
}

/// Description of one HTTP call.
///
/// Built fresh for every call; the body is encoded to JSON when attached so
/// encoding failures surface before any I/O happens.
#[derive(Debug, Clone)]
pub(crate) struct RequestConfig {
    pub method: Method,
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub success_codes: &'static [StatusCode],
    pub credentials: Credentials,
}

impl RequestConfig {
    pub fn new(method: Method, url: impl Into<String>, credentials: &Credentials) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            success_codes: SUCCESS_OK,
            credentials: credentials.clone(),
        }
    }

    /// Attach a JSON body
    pub fn body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| PrefectError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn success_codes(mut self, codes: &'static [StatusCode]) -> Self {
        self.success_codes = codes;
        self
    }
}

/// Perform exactly one HTTP round trip.
///
/// Returns the response when its status is in the configured allow-list; the
/// caller owns the response body. Any other status becomes
/// [`PrefectError::Api`] carrying the status line and the raw body.
pub(crate) async fn request(client: &Client, cfg: &RequestConfig) -> Result<Response> {
    let url = Url::parse(&cfg.url)
        .map_err(|e| PrefectError::Request(format!("invalid url '{}': {}", cfg.url, e)))?;

    let mut builder = client
        .request(cfg.method.clone(), url)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "application/json");

    if let Some(auth) = cfg.credentials.authorization_header() {
        builder = builder.header(AUTHORIZATION, auth);
    }

    if let Some(body) = &cfg.body {
        let encoded = serde_json::to_vec(body).map_err(|e| PrefectError::Encode(e.to_string()))?;
        builder = builder.body(encoded);
    }

    debug!("{} {}", cfg.method, cfg.url);

    let response = builder.send().await?;
    let status = response.status();

    if !cfg.success_codes.contains(&status) {
        let body = response.text().await.unwrap_or_default();
        debug!("{} {} failed with {}", cfg.method, cfg.url, status);
        return Err(PrefectError::Api {
            status: status.as_u16(),
            status_line: status.to_string(),
            body,
        });
    }

    Ok(response)
}

/// Perform a request and decode the response body into `T`.
pub(crate) async fn request_with_decode_response<T>(client: &Client, cfg: &RequestConfig) -> Result<T>
where
    T: DeserializeOwned,
{
    let response = request(client, cfg).await?;
    let bytes = response.bytes().await?;

    serde_json::from_slice(&bytes).map_err(|e| PrefectError::Decode(e.to_string()))
}
