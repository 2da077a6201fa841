//! Work pool API operations
//!
//! Work pools are addressed by name rather than ID.

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
use crate::prefect::helpers::path_segment;
use crate::prefect::PrefectClient;

use super::models::{WorkPool, WorkPoolCreate, WorkPoolFilter, WorkPoolUpdate};

/// Client for workspace-scoped work pool routes
#[derive(Debug, Clone)]
pub struct WorkPoolsClient {
    hc: Client,
    route_prefix: String,
    credentials: Credentials,
}

impl PrefectClient {
    pub fn work_pools(&self, account_id: Uuid, workspace_id: Uuid) -> Result<WorkPoolsClient> {
        Ok(WorkPoolsClient {
            hc: self.http().clone(),
            route_prefix: self.workspace_route(account_id, workspace_id, api::WORK_POOLS)?,
            credentials: self.credentials().clone(),
        })
    }
}

impl WorkPoolsClient {
    pub async fn create(&self, payload: &WorkPoolCreate) -> Result<WorkPool> {
        debug!("Creating work pool '{}' ({})", payload.name, payload.pool_type);

        let cfg = RequestConfig::new(
            Method::POST,
            format!("{}/", self.route_prefix),
            &self.credentials,
        )
        .body(payload)?
        .success_codes(SUCCESS_OK_OR_CREATED);

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to create work pool"))
    }

    /// List work pools, optionally restricted to the given IDs
    pub async fn list(&self, filter_ids: &[Uuid]) -> Result<Vec<WorkPool>> {
        let cfg = RequestConfig::new(
            Method::POST,
            format!("{}/filter", self.route_prefix),
            &self.credentials,
        )
        .body(&WorkPoolFilter::by_ids(filter_ids))?;

        let pools: Vec<WorkPool> = request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to list work pools"))?;

        debug!("Found {} work pools", pools.len());
        Ok(pools)
    }

    pub async fn get(&self, name: &str) -> Result<WorkPool> {
        let cfg = RequestConfig::new(
            Method::GET,
            format!("{}/{}", self.route_prefix, path_segment(name)),
            &self.credentials,
        );

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to get work pool"))
    }

    pub async fn update(&self, name: &str, payload: &WorkPoolUpdate) -> Result<()> {
        let cfg = RequestConfig::new(
            Method::PATCH,
            format!("{}/{}", self.route_prefix, path_segment(name)),
            &self.credentials,
        )
        .body(payload)?
        .success_codes(SUCCESS_NO_CONTENT);

        request(&self.hc, &cfg)
            .await
            .map(|_| ())
            .map_err(|e| e.context("failed to update work pool"))
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let cfg = RequestConfig::new(
            Method::DELETE,
            format!("{}/{}", self.route_prefix, path_segment(name)),
            &self.credentials,
        )
        .success_codes(SUCCESS_OK_OR_NO_CONTENT);

        request(&self.hc, &cfg)
            .await
            .map(|_| ())
            .map_err(|e| e.context("failed to delete work pool"))
    }
}
