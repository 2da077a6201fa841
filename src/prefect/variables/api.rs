//! Variable API operations

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

use super::models::{Variable, VariableCreate, VariableUpdate};

/// Client for workspace-scoped variable routes
#[derive(Debug, Clone)]
pub struct VariablesClient {
    hc: Client,
    route_prefix: String,
    credentials: Credentials,
}

impl PrefectClient {
    pub fn variables(&self, account_id: Uuid, workspace_id: Uuid) -> Result<VariablesClient> {
        Ok(VariablesClient {
            hc: self.http().clone(),
            route_prefix: self.workspace_route(account_id, workspace_id, api::VARIABLES)?,
            credentials: self.credentials().clone(),
        })
    }
}

impl VariablesClient {
    pub async fn create(&self, payload: &VariableCreate) -> Result<Variable> {
        debug!("Creating variable '{}'", payload.name);

        let cfg = RequestConfig::new(
            Method::POST,
            format!("{}/", self.route_prefix),
            &self.credentials,
        )
        .body(payload)?
        .success_codes(SUCCESS_OK_OR_CREATED);

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to create variable"))
    }

    pub async fn get(&self, id: Uuid) -> Result<Variable> {
        let cfg = RequestConfig::new(
            Method::GET,
            format!("{}/{}", self.route_prefix, id),
            &self.credentials,
        );

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to get variable"))
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Variable> {
        let cfg = RequestConfig::new(
            Method::GET,
            format!("{}/name/{}", self.route_prefix, path_segment(name)),
            &self.credentials,
        );

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context(format!("failed to get variable by name '{}'", name)))
    }

    pub async fn update(&self, id: Uuid, payload: &VariableUpdate) -> Result<()> {
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
            .map_err(|e| e.context("failed to update variable"))
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
            .map_err(|e| e.context("failed to delete variable"))
    }
}
