//! Prefect provider - manage Prefect Cloud and self-hosted Prefect objects
//! as Terraform-style resources and data sources.
//!
//! # Features
//!
//! - Resources: deployments, flows, service accounts, variables, webhooks,
//!   work pools and workspaces
//! - Data sources: block schemas, service accounts, work pools and worker
//!   metadata
//! - Declarative schemas with defaults, validation and replace triggers
//! - Bearer (Prefect Cloud) and Basic (self-hosted) authentication
//!
//! # Example
//!
//! ```bash
//! # Show the deployment schema
//! terraform-provider-prefect schema deployment
//!
//! # Create a work pool against a local server
//! terraform-provider-prefect create work_pool --file pool.json
//!
//! # Import a variable from a Prefect Cloud workspace
//! terraform-provider-prefect import variable "$WORKSPACE_ID,retries" -o yaml
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod datasources;
pub mod error;
pub mod output;
pub mod prefect;
pub mod provider;
pub mod resources;

pub use cli::{Cli, Command, OutputFormat};
pub use commands::run_command;
pub use error::{PrefectError, Result};
pub use prefect::{Credentials, PrefectClient};
pub use provider::{registry, Diagnostic, Diagnostics, ProviderConfig, Registry};
