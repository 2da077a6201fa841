//! URL construction and scope validation shared by every sub-client

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::config::api;
use crate::error::{PrefectError, Result};
use crate::prefect::endpoint::is_cloud_endpoint;

/// Build a URL for an account-scoped route:
/// `{endpoint}/accounts/{account_id}/{route}`
pub fn account_scoped_url(endpoint: &str, account_id: Uuid, route: &str) -> String {
    format!("{}/{}/{}/{}", endpoint, api::ACCOUNTS, account_id, route)
}

/// Build a URL for a workspace-scoped route.
///
/// Produces `{endpoint}/accounts/{account_id}/workspaces/{workspace_id}/{route}`
/// when both IDs are set, and `{endpoint}/{route}` when either is nil
/// (self-hosted servers have no account or workspace segments).
pub fn workspace_scoped_url(
    endpoint: &str,
    account_id: Uuid,
    workspace_id: Uuid,
    route: &str,
) -> String {
    if account_id.is_nil() || workspace_id.is_nil() {
        return format!("{}/{}", endpoint, route);
    }

    format!(
        "{}/{}/{}/{}/{}/{}",
        endpoint,
        api::ACCOUNTS,
        account_id,
        api::WORKSPACES,
        workspace_id,
        route
    )
}

/// Prefect Cloud endpoints need both an account and a workspace to scope
/// workspace-level routes.
pub fn validate_cloud_endpoint(endpoint: &str, account_id: Uuid, workspace_id: Uuid) -> Result<()> {
    if is_cloud_endpoint(endpoint) && (account_id.is_nil() || workspace_id.is_nil()) {
        return Err(PrefectError::Config(
            "prefect Cloud endpoints require an account_id and workspace_id to be set on either the provider or the resource"
                .to_string(),
        ));
    }

    Ok(())
}

/// Prefect Cloud endpoints need an account for account-level routes.
pub fn validate_cloud_account(endpoint: &str, account_id: Uuid) -> Result<()> {
    if is_cloud_endpoint(endpoint) && account_id.is_nil() {
        return Err(PrefectError::Config(
            "prefect Cloud endpoints require an account_id to be set on either the provider or the resource"
                .to_string(),
        ));
    }

    Ok(())
}

/// Pick the resource-level ID when set, otherwise the provider default.
pub fn id_or_default(id: Uuid, default: Uuid) -> Uuid {
    if id.is_nil() {
        default
    } else {
        id
    }
}

/// Encode a single path segment (work pool names, variable names).
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Deserialize `null` as the type's default value.
///
/// The API returns `null` for unset strings, lists and maps; payload structs
/// keep plain values instead of wrapping every field in `Option`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
