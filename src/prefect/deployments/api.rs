//! Deployment API operations

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

use super::models::{Deployment, DeploymentCreate, DeploymentUpdate};

/// Client for workspace-scoped deployment routes
#[derive(Debug, Clone)]
pub struct DeploymentsClient {
    hc: Client,
    route_prefix: String,
    credentials: Credentials,
}

impl PrefectClient {
    /// Deployments sub-client; nil IDs fall back to the provider defaults
    pub fn deployments(&self, account_id: Uuid, workspace_id: Uuid) -> Result<DeploymentsClient> {
        Ok(DeploymentsClient {
            hc: self.http().clone(),
            route_prefix: self.workspace_route(account_id, workspace_id, api::DEPLOYMENTS)?,
            credentials: self.credentials().clone(),
        })
    }
}

impl DeploymentsClient {
    pub fn route_prefix(&self) -> &str {
        &self.route_prefix
    }

    pub async fn create(&self, payload: &DeploymentCreate) -> Result<Deployment> {
        debug!("Creating deployment '{}'", payload.name);

        let cfg = RequestConfig::new(
            Method::POST,
            format!("{}/", self.route_prefix),
            &self.credentials,
        )
        .body(payload)?
        .success_codes(SUCCESS_OK_OR_CREATED);

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to create deployment"))
    }

    pub async fn get(&self, id: Uuid) -> Result<Deployment> {
        let cfg = RequestConfig::new(
            Method::GET,
            format!("{}/{}", self.route_prefix, id),
            &self.credentials,
        );

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to get deployment"))
    }

    /// PATCH the deployment; the API answers 204 with no body
    pub async fn update(&self, id: Uuid, payload: &DeploymentUpdate) -> Result<()> {
        debug!("Updating deployment {}", id);

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
            .map_err(|e| e.context("failed to update deployment"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        debug!("Deleting deployment {}", id);

        let cfg = RequestConfig::new(
            Method::DELETE,
            format!("{}/{}", self.route_prefix, id),
            &self.credentials,
        )
        .success_codes(SUCCESS_OK_OR_NO_CONTENT);

        request(&self.hc, &cfg)
            .await
            .map(|_| ())
            .map_err(|e| e.context("failed to delete deployment"))
    }
}
