/// Configuration constants for the Prefect API
pub mod api {
    /// Path suffix every Prefect API endpoint carries
    pub const PATH_SUFFIX: &str = "/api";

    /// Account-scoped path segment
    pub const ACCOUNTS: &str = "accounts";

    /// Workspace-scoped path segment
    pub const WORKSPACES: &str = "workspaces";

    pub const BLOCK_SCHEMAS: &str = "block_schemas";
    pub const DEPLOYMENTS: &str = "deployments";
    pub const FLOWS: &str = "flows";
    pub const SERVICE_ACCOUNTS: &str = "bots";
    pub const VARIABLES: &str = "variables";
    pub const WEBHOOKS: &str = "webhooks";
    pub const WORK_POOLS: &str = "work_pools";

    /// Aggregate worker metadata (default base job templates per worker type)
    pub const WORKER_METADATA: &str = "collections/views/aggregate-worker-metadata";
}

/// Environment variables read by the provider configuration
pub mod env {
    /// API endpoint, eg. https://api.prefect.cloud
    pub const API_URL: &str = "PREFECT_API_URL";

    /// API key used for Bearer authentication
    pub const API_KEY: &str = "PREFECT_API_KEY";

    /// Key used for Basic authentication (self-hosted servers)
    pub const BASIC_AUTH_KEY: &str = "PREFECT_BASIC_AUTH_KEY";

    /// Default account ID
    pub const ACCOUNT_ID: &str = "PREFECT_CLOUD_ACCOUNT_ID";

    /// Default workspace ID
    pub const WORKSPACE_ID: &str = "PREFECT_CLOUD_WORKSPACE_ID";
}

/// Hosted Prefect Cloud settings
pub mod cloud {
    /// Host suffixes that identify a Prefect Cloud endpoint
    pub const HOST_SUFFIXES: &[&str] = &["prefect.cloud", "prefect.dev"];

    /// Public base URL that webhook slugs are served under
    pub const WEBHOOK_BASE_URL: &str = "https://api.prefect.cloud";
}

/// HTTP client settings
pub mod http {
    use std::time::Duration;

    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Default values for CLI
pub mod defaults {
    /// Default API endpoint (local Prefect server)
    pub const ENDPOINT: &str = "http://localhost:4200/api";

    /// Default log level
    pub const LOG_LEVEL: &str = "warn";

    /// Type name prefix of every resource and data source
    pub const TYPE_NAME_PREFIX: &str = "prefect";
}
