//! Webhook API operations

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

use super::models::{Webhook, WebhookRequest};

/// Client for workspace-scoped webhook routes (Prefect Cloud only)
#[derive(Debug, Clone)]
pub struct WebhooksClient {
    hc: Client,
    route_prefix: String,
    credentials: Credentials,
}

impl PrefectClient {
    pub fn webhooks(&self, account_id: Uuid, workspace_id: Uuid) -> Result<WebhooksClient> {
        Ok(WebhooksClient {
            hc: self.http().clone(),
            route_prefix: self.workspace_route(account_id, workspace_id, api::WEBHOOKS)?,
            credentials: self.credentials().clone(),
        })
    }
}

impl WebhooksClient {
    pub async fn create(&self, payload: &WebhookRequest) -> Result<Webhook> {
        debug!("Creating webhook '{}'", payload.name);

        let cfg = RequestConfig::new(
            Method::POST,
            format!("{}/", self.route_prefix),
            &self.credentials,
        )
        .body(payload)?
        .success_codes(SUCCESS_OK_OR_CREATED);

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to create webhook"))
    }

    pub async fn get(&self, id: Uuid) -> Result<Webhook> {
        let cfg = RequestConfig::new(
            Method::GET,
            format!("{}/{}", self.route_prefix, id),
            &self.credentials,
        );

        request_with_decode_response(&self.hc, &cfg)
            .await
            .map_err(|e| e.context("failed to get webhook"))
    }

    /// Replace the webhook definition (PUT, full payload)
    pub async fn update(&self, id: Uuid, payload: &WebhookRequest) -> Result<()> {
        let cfg = RequestConfig::new(
            Method::PUT,
            format!("{}/{}", self.route_prefix, id),
            &self.credentials,
        )
        .body(payload)?
        .success_codes(SUCCESS_NO_CONTENT);

        request(&self.hc, &cfg)
            .await
            .map(|_| ())
            .map_err(|e| e.context("failed to update webhook"))
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
            .map_err(|e| e.context("failed to delete webhook"))
    }
}
