//! Provider configuration
//!
//! Each setting falls back from the configuration document to its
//! environment variable, then to the built-in default.

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::diagnostics::Diagnostics;
use super::schema::{Attribute, Schema};
use crate::config::env;
use crate::prefect::{is_cloud_endpoint, CredentialsResolver, EndpointResolver, PrefectClient};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub basic_auth_key: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub workspace_id: Option<String>,
}

pub fn provider_schema() -> Schema {
    Schema::new(
        "Provider for managing Prefect Cloud and self-hosted Prefect server objects.",
        [
            (
                "endpoint",
                Attribute::string(
                    "The Prefect API URL. Can also be set via the `PREFECT_API_URL` environment variable. Defaults to `http://localhost:4200/api`.",
                )
                .optional(),
            ),
            (
                "api_key",
                Attribute::string(
                    "Prefect Cloud API key. Can also be set via the `PREFECT_API_KEY` environment variable.",
                )
                .optional()
                .sensitive()
                .conflicts_with(&["basic_auth_key"]),
            ),
            (
                "basic_auth_key",
                Attribute::string(
                    "Basic auth key for a self-hosted server, in the form `user:password`. Can also be set via the `PREFECT_BASIC_AUTH_KEY` environment variable.",
                )
                .optional()
                .sensitive(),
            ),
            (
                "account_id",
                Attribute::string(
                    "Default Prefect Cloud account ID. Can also be set via the `PREFECT_CLOUD_ACCOUNT_ID` environment variable.",
                )
                .optional(),
            ),
            (
                "workspace_id",
                Attribute::string(
                    "Default Prefect Cloud workspace ID. Can also be set via the `PREFECT_CLOUD_WORKSPACE_ID` environment variable.",
                )
                .optional(),
            ),
        ],
    )
}

/// Resolve an optional UUID setting: explicit value, then environment variable.
fn resolve_uuid(
    explicit: Option<&str>,
    env_var: &str,
    attribute: &str,
    diags: &mut Diagnostics,
) -> Uuid {
    let raw = explicit
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.is_empty()));

    let Some(raw) = raw else {
        return Uuid::nil();
    };

    match Uuid::parse_str(&raw) {
        Ok(id) => {
            debug!("Using {} {}", attribute, id);
            id
        }
        Err(e) => {
            diags.attribute_error(
                attribute,
                format!("Invalid {}", attribute),
                format!("Could not parse {} \"{}\" as a UUID: {}", attribute, raw, e),
            );
            Uuid::nil()
        }
    }
}

impl ProviderConfig {
    /// Build the root client. Problems are reported as diagnostics.
    pub fn configure(&self, diags: &mut Diagnostics) -> Option<PrefectClient> {
        let endpoint = match EndpointResolver::resolve(self.endpoint.as_deref()) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                diags.attribute_error(
                    "endpoint",
                    "Invalid Prefect API Endpoint",
                    format!("The Prefect API endpoint could not be parsed: {}", e),
                );
                return None;
            }
        };

        let credentials =
            match CredentialsResolver::resolve(self.api_key.as_deref(), self.basic_auth_key.as_deref()) {
                Ok(credentials) => credentials,
                Err(e) => {
                    diags.attribute_error("api_key", "Conflicting Prefect credentials", e.to_string());
                    return None;
                }
            };

        let account_id = resolve_uuid(self.account_id.as_deref(), env::ACCOUNT_ID, "account_id", diags);
        let workspace_id = resolve_uuid(
            self.workspace_id.as_deref(),
            env::WORKSPACE_ID,
            "workspace_id",
            diags,
        );

        if is_cloud_endpoint(&endpoint) {
            if credentials.is_none() {
                diags.attribute_error(
                    "api_key",
                    "Missing Prefect API Key",
                    "The Prefect API Key is required when connecting to Prefect Cloud. Set the api_key attribute or the PREFECT_API_KEY environment variable.",
                );
            }
            if account_id.is_nil() {
                diags.attribute_error(
                    "account_id",
                    "Missing Prefect Cloud Account ID",
                    "The Prefect Cloud account ID is required when connecting to Prefect Cloud. Set the account_id attribute or the PREFECT_CLOUD_ACCOUNT_ID environment variable.",
                );
            }
        }

        if diags.has_error() {
            return None;
        }

        match PrefectClient::new(&endpoint, credentials) {
            Ok(client) => {
                debug!("Configured Prefect client for {}", client.endpoint());
                Some(client.with_defaults(account_id, workspace_id))
            }
            Err(e) => {
                diags.error(
                    "Unable to create Prefect client",
                    format!("An unexpected error occurred when creating the Prefect API client: {}", e),
                );
                None
            }
        }
    }
}
