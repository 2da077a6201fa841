//! Prefect REST API client
//!
//! `PrefectClient` is the root; each resource module adds a constructor for
//! its sub-client (`client.deployments(account_id, workspace_id)`, ...).

pub mod block_schemas;
mod client;
pub mod credentials;
pub mod deployments;
pub mod endpoint;
pub mod flows;
pub mod helpers;
pub mod service_accounts;
pub mod traits;
pub mod variables;
pub mod webhooks;
pub mod work_pools;
pub mod worker_metadata;
pub mod workspaces;

pub use client::PrefectClient;
pub use credentials::{Credentials, CredentialsResolver};
pub use endpoint::{is_cloud_endpoint, EndpointResolver};
pub use traits::ApiResource;
