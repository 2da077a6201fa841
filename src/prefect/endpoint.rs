//! API endpoint resolution and classification

use log::debug;
use reqwest::Url;

use crate::config::{api, cloud, defaults, env};
use crate::error::{PrefectError, Result};

/// Endpoint resolution with fallback logic
pub struct EndpointResolver;

impl EndpointResolver {
    /// Resolve the API endpoint from multiple sources with fallback:
    /// 1. Explicit value (CLI argument or provider configuration)
    /// 2. Environment variable (PREFECT_API_URL)
    /// 3. Local Prefect server default
    ///
    /// The result is normalized with [`normalize_endpoint`].
    pub fn resolve(explicit: Option<&str>) -> Result<String> {
        if let Some(endpoint) = explicit.filter(|e| !e.is_empty()) {
            debug!("Using endpoint from provider configuration: {}", endpoint);
            return normalize_endpoint(endpoint);
        }

        if let Ok(endpoint) = std::env::var(env::API_URL) {
            if !endpoint.is_empty() {
                debug!("Using endpoint from {}: {}", env::API_URL, endpoint);
                return normalize_endpoint(&endpoint);
            }
        }

        debug!("No endpoint configured, using default {}", defaults::ENDPOINT);
        normalize_endpoint(defaults::ENDPOINT)
    }
}

/// Validate an endpoint URL, strip trailing slashes and make sure it ends in `/api`.
pub fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let trimmed = endpoint.trim().trim_end_matches('/');

    let url = Url::parse(trimmed)
        .map_err(|e| PrefectError::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

    if url.host_str().is_none() {
        return Err(PrefectError::Config(format!(
            "invalid endpoint '{}': missing host",
            endpoint
        )));
    }

    if trimmed.ends_with(api::PATH_SUFFIX) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}{}", trimmed, api::PATH_SUFFIX))
    }
}

/// Host part of an endpoint, empty when the endpoint does not parse
pub fn endpoint_host(endpoint: &str) -> String {
    Url::parse(endpoint)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Whether the endpoint points at hosted Prefect Cloud
pub fn is_cloud_endpoint(endpoint: &str) -> bool {
    let host = endpoint_host(endpoint);
    !host.is_empty()
        && cloud::HOST_SUFFIXES
            .iter()
            .any(|suffix| host == *suffix || host.ends_with(&format!(".{}", suffix)))
}
