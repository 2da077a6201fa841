//! API credentials and their resolution from multiple sources

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::debug;
use std::fmt;

use crate::config::env;
use crate::error::{PrefectError, Result};

/// Credentials attached to every request made by a client.
///
/// A client carries at most one kind of credential; configuring both an API
/// key and a basic auth key is rejected when the credentials are built.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Credentials {
    /// No Authorization header is sent
    #[default]
    None,
    /// `Authorization: Bearer <api_key>`
    ApiKey(String),
    /// `Authorization: Basic <base64(basic_auth_key)>`
    BasicAuth(String),
}

impl Credentials {
    /// Build credentials from optional keys. Empty strings count as unset.
    pub fn from_keys(api_key: Option<&str>, basic_auth_key: Option<&str>) -> Result<Self> {
        let api_key = api_key.filter(|k| !k.is_empty());
        let basic_auth_key = basic_auth_key.filter(|k| !k.is_empty());

        match (api_key, basic_auth_key) {
            (Some(_), Some(_)) => Err(PrefectError::Config(
                "api_key and basic_auth_key are mutually exclusive; configure only one of them"
                    .to_string(),
            )),
            (Some(key), None) => Ok(Credentials::ApiKey(key.to_string())),
            (None, Some(key)) => Ok(Credentials::BasicAuth(key.to_string())),
            (None, None) => Ok(Credentials::None),
        }
    }

    /// Value of the Authorization header, if any
    pub fn authorization_header(&self) -> Option<String> {
        match self {
            Credentials::None => None,
            Credentials::ApiKey(key) => Some(format!("Bearer {}", key)),
            Credentials::BasicAuth(key) => Some(format!("Basic {}", STANDARD.encode(key))),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Credentials::None)
    }
}

// Keys never show up in logs or panics.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::None => write!(f, "Credentials::None"),
            Credentials::ApiKey(_) => write!(f, "Credentials::ApiKey(<redacted>)"),
            Credentials::BasicAuth(_) => write!(f, "Credentials::BasicAuth(<redacted>)"),
        }
    }
}

/// Credential resolution with fallback logic
pub struct CredentialsResolver;

impl CredentialsResolver {
    /// Resolve credentials from multiple sources with fallback:
    /// 1. Explicit values (CLI arguments or provider configuration)
    /// 2. Environment variables (PREFECT_API_KEY, PREFECT_BASIC_AUTH_KEY)
    ///
    /// Each key falls back independently; the mutual exclusion check runs on
    /// the resolved pair.
    pub fn resolve(api_key: Option<&str>, basic_auth_key: Option<&str>) -> Result<Credentials> {
        let api_key = Self::resolve_one(api_key, env::API_KEY);
        let basic_auth_key = Self::resolve_one(basic_auth_key, env::BASIC_AUTH_KEY);

        Credentials::from_keys(api_key.as_deref(), basic_auth_key.as_deref())
    }

    fn resolve_one(explicit: Option<&str>, env_var: &str) -> Option<String> {
        if let Some(value) = explicit.filter(|v| !v.is_empty()) {
            debug!("Using {} from provider configuration", env_var);
            return Some(value.to_string());
        }

        match std::env::var(env_var) {
            Ok(value) if !value.is_empty() => {
                debug!("Using {} from environment", env_var);
                Some(value)
            }
            _ => None,
        }
    }
}
