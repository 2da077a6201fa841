//! CLI argument parsing for the provider driver

mod common;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::defaults;
use crate::provider::ProviderConfig;

pub use common::{OutputFormat, SchemaKind};

/// Drive the Prefect provider's resources and data sources from the command line
#[derive(Parser, Debug)]
#[command(name = "terraform-provider-prefect")]
#[command(version)]
#[command(
    about = "Manage Prefect objects through the provider's resources and data sources",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, global = true, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Provider settings. Unset values fall back to the PREFECT_* environment variables.
#[derive(Args, Debug, Default)]
pub struct ProviderArgs {
    /// JSON file with the provider configuration block
    #[arg(long, global = true, value_name = "FILE")]
    pub provider_config: Option<PathBuf>,

    /// Prefect API URL
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Prefect Cloud API key
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Basic auth key for a self-hosted server, eg. admin:pass
    #[arg(long, global = true)]
    pub basic_auth_key: Option<String>,

    /// Default Prefect Cloud account ID
    #[arg(long, global = true)]
    pub account_id: Option<String>,

    /// Default Prefect Cloud workspace ID
    #[arg(long, global = true)]
    pub workspace_id: Option<String>,
}

impl ProviderArgs {
    /// Overlay the command line flags on a configuration block
    pub fn apply(&self, mut config: ProviderConfig) -> ProviderConfig {
        if self.endpoint.is_some() {
            config.endpoint = self.endpoint.clone();
        }
        if self.api_key.is_some() {
            config.api_key = self.api_key.clone();
        }
        if self.basic_auth_key.is_some() {
            config.basic_auth_key = self.basic_auth_key.clone();
        }
        if self.account_id.is_some() {
            config.account_id = self.account_id.clone();
        }
        if self.workspace_id.is_some() {
            config.workspace_id = self.workspace_id.clone();
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the registered resource and data source types
    #[command(visible_alias = "ls")]
    List,

    /// Print the schema of a resource, data source or the provider
    Schema(SchemaArgs),

    /// Create a resource from a configuration file
    Create(ConfigArgs),

    /// Refresh a resource from its state file
    #[command(visible_alias = "refresh")]
    Read(StateArgs),

    /// Update a resource in place
    Update(UpdateArgs),

    /// Delete a resource
    #[command(visible_alias = "destroy")]
    Delete(StateArgs),

    /// Import an existing object by its import identifier
    Import(ImportArgs),

    /// Read a data source
    #[command(visible_alias = "ds")]
    Data(DataArgs),
}

/// Arguments for 'schema'
#[derive(Parser, Debug)]
pub struct SchemaArgs {
    /// Type name, with or without the prefect_ prefix (ignored for --kind provider)
    pub type_name: Option<String>,

    /// Registry to look the type up in
    #[arg(short, long, value_enum, default_value_t = SchemaKind::Resource)]
    pub kind: SchemaKind,
}

/// Arguments for 'create'
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Resource type, eg. deployment or prefect_deployment
    pub type_name: String,

    /// JSON file with the resource configuration
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for 'read' and 'delete'
#[derive(Parser, Debug)]
pub struct StateArgs {
    /// Resource type, eg. deployment or prefect_deployment
    pub type_name: String,

    /// JSON file with the current resource state
    #[arg(short, long, value_name = "FILE")]
    pub state: PathBuf,
}

/// Arguments for 'update'
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Resource type, eg. deployment or prefect_deployment
    pub type_name: String,

    /// JSON file with the desired configuration
    #[arg(short, long, value_name = "FILE")]
    pub file: PathBuf,

    /// JSON file with the current resource state
    #[arg(short, long, value_name = "FILE")]
    pub state: PathBuf,
}

/// Arguments for 'import'
#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// Resource type, eg. work_pool or prefect_work_pool
    pub type_name: String,

    /// Import identifier
    ///
    ///   deployment, flow   <id> or <id>,<workspace_id>
    ///   variable           <id>, <name> or <workspace_id>,<name>
    ///   work_pool          <name> or <workspace_id>,<name>
    ///   webhook            <id> or <workspace_id>,<id>
    ///   service_account    <id> or name/<name>
    ///   workspace          <id>
    #[arg(verbatim_doc_comment)]
    pub id: String,
}

/// Arguments for 'data'
#[derive(Parser, Debug)]
pub struct DataArgs {
    /// Data source type, eg. work_pools or prefect_work_pools
    pub type_name: String,

    /// JSON file with the data source configuration (defaults to an empty block)
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl Command {
    /// Whether the command talks to the Prefect API
    pub fn needs_client(&self) -> bool {
        !matches!(self, Command::List | Command::Schema(_))
    }
}
