//! Provider framework: diagnostics, schemas, lifecycle traits and configuration

pub mod config;
pub mod diagnostics;
pub mod framework;
pub mod schema;

use log::debug;

pub use config::{provider_schema, ProviderConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use framework::{DataSource, DynDataSource, DynResource, Registry, Resource};
pub use schema::{Attribute, AttributeType, Schema};

use crate::datasources::{
    BlockSchemaDataSource, ServiceAccountDataSource, WorkPoolsDataSource, WorkerMetadataDataSource,
};
use crate::prefect::PrefectClient;
use crate::resources::{
    DeploymentResource, FlowResource, ServiceAccountResource, VariableResource, WebhookResource,
    WorkPoolResource, WorkspaceResource,
};

/// Register every resource and data source of the provider.
///
/// `client` is `None` when only schemas are needed; lifecycle operations then
/// fail with an "Unconfigured" diagnostic.
pub fn registry(client: Option<PrefectClient>) -> Registry {
    let mut registry = Registry::new();

    registry.register_resource(DeploymentResource::new(client.clone()));
    registry.register_resource(FlowResource::new(client.clone()));
    registry.register_resource(ServiceAccountResource::new(client.clone()));
    registry.register_resource(VariableResource::new(client.clone()));
    registry.register_resource(WebhookResource::new(client.clone()));
    registry.register_resource(WorkPoolResource::new(client.clone()));
    registry.register_resource(WorkspaceResource::new(client.clone()));

    registry.register_data_source(BlockSchemaDataSource::new(client.clone()));
    registry.register_data_source(ServiceAccountDataSource::new(client.clone()));
    registry.register_data_source(WorkPoolsDataSource::new(client.clone()));
    registry.register_data_source(WorkerMetadataDataSource::new(client));

    debug!(
        "Registered {} resources and {} data sources",
        registry.resource_names().len(),
        registry.data_source_names().len()
    );
    registry
}
