//! Service account API operations (account-scoped)

use log::debug;
use reqwest::{Client, Method};
use uuid::Uuid;

use crate::config::api;
use crate::error::{PrefectError, Result};
use crate::prefect::client::{
    request, request_with_decode_response, RequestConfig, SUCCESS_NO_CONTENT,
    SUCCESS_OK_OR_CREATED, SUCCESS_OK_OR_NO_CONTENT,
};
use crate::prefect::credentials::Credentials;
use crate::prefect::PrefectClient;

use super::models::{
    ServiceAccount, ServiceAccountCreate, ServiceAccountFilter, ServiceAccountUpdate,
};

#[derive(Debug, Clone)]
pub struct ServiceAccountsClient {
    hc: Client,
    route_prefix: String,
    credentials: Credentials,
}

impl PrefectClient {
    pub fn service_accounts(&self, account_id: Uuid) -> Result<ServiceAccountsClient> {
        Ok(ServiceAccountsClient {
            hc: self.http().clone(),
            route_prefix: self.account_route(account_id, api::SERVICE_ACCOUNTS)?,
            credentials: self.credentials().clone(),
        })
    }
}

impl ServiceAccountsClient {
    pub async fn create(&self, payload: &ServiceAccountCreate) -> Result<ServiceAccount> {
        debug!("Creating service account '{}'", payload.name);

        let cfg = RequestConfig::new(
            Method::POST,
            format!("{}/", self.route_prefix),
            &self.credentials,
        )
        .body(payload)?
        .success_codes(SUCCESS_OK_OR_CREATED);

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to create service account"))
    }

    pub async fn get(&self, id: Uuid) -> Result<ServiceAccount> {
        let cfg = RequestConfig::new(
            Method::GET,
            format!("{}/{}", self.route_prefix, id),
            &self.credentials,
        );

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to get service account"))
    }

    pub async fn list(&self, names: &[&str]) -> Result<Vec<ServiceAccount>> {
        let cfg = RequestConfig::new(
            Method::POST,
            format!("{}/filter", self.route_prefix),
            &self.credentials,
        )
        .body(&ServiceAccountFilter::by_names(names))?;

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to list service accounts"))
    }

    /// Find exactly one service account by name
    pub async fn get_by_name(&self, name: &str) -> Result<ServiceAccount> {
        let mut found = self.list(&[name]).await?;

        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err(PrefectError::Api {
                status: 404,
                status_line: "404 Not Found".to_string(),
                body: format!("service account '{}' not found", name),
            }
            .context("failed to get service account")),
            n => Err(PrefectError::Config(format!(
                "expected one service account named '{}', found {}",
                name, n
            ))),
        }
    }

    pub async fn update(&self, id: Uuid, payload: &ServiceAccountUpdate) -> Result<()> {
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
            .map_err(|e| e.context("failed to update service account"))
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
            .map_err(|e| e.context("failed to delete service account"))
    }
}
