//! Resource and data source traits, and the type-erased registry
//!
//! Adapters implement [`Resource`] or [`DataSource`] over their own typed
//! model. The registry stores them behind [`DynResource`] / [`DynDataSource`],
//! which work on JSON documents and take care of schema validation and model
//! decoding.

use async_trait::async_trait;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

use super::diagnostics::{unexpected_model_error, Diagnostics};
use super::schema::Schema;
use crate::config::defaults;

/// Lifecycle of a managed object
///
/// Every operation reports problems through `diags`. `None` together with an
/// error diagnostic means the operation failed and no state must be written.
#[async_trait]
pub trait Resource: Send + Sync {
    type Model: Serialize + DeserializeOwned + Default + Send + Sync;

    /// Type name without the provider prefix, eg. `deployment`
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn create(&self, diags: &mut Diagnostics, plan: Self::Model) -> Option<Self::Model>;

    /// Refresh state from the API. `None` without an error means the object
    /// is gone and should be dropped from state.
    async fn read(&self, diags: &mut Diagnostics, state: Self::Model) -> Option<Self::Model>;

    async fn update(
        &self,
        diags: &mut Diagnostics,
        plan: Self::Model,
        state: Self::Model,
    ) -> Option<Self::Model>;

    async fn delete(&self, diags: &mut Diagnostics, state: Self::Model) -> Option<()>;

    /// Turn an import identifier into a partial state that `read` can refresh
    async fn import_state(&self, diags: &mut Diagnostics, id: &str) -> Option<Self::Model>;
}

/// Read-only lookup
#[async_trait]
pub trait DataSource: Send + Sync {
    type Model: Serialize + DeserializeOwned + Default + Send + Sync;

    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn read(&self, diags: &mut Diagnostics, config: Self::Model) -> Option<Self::Model>;
}

/// Object-safe view of a [`Resource`] working on JSON documents
#[async_trait]
pub trait DynResource: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn schema(&self) -> Schema;
    async fn create(&self, diags: &mut Diagnostics, config: Value) -> Option<Value>;
    async fn read(&self, diags: &mut Diagnostics, state: Value) -> Option<Value>;
    async fn update(&self, diags: &mut Diagnostics, config: Value, state: Value) -> Option<Value>;
    async fn delete(&self, diags: &mut Diagnostics, state: Value) -> Option<()>;
    async fn import(&self, diags: &mut Diagnostics, id: &str) -> Option<Value>;
}

/// Object-safe view of a [`DataSource`]
#[async_trait]
pub trait DynDataSource: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn schema(&self) -> Schema;
    async fn read(&self, diags: &mut Diagnostics, config: Value) -> Option<Value>;
}

fn decode<M: DeserializeOwned>(type_name: &str, value: Value, diags: &mut Diagnostics) -> Option<M> {
    match serde_json::from_value(value) {
        Ok(model) => Some(model),
        Err(e) => {
            diags.push(unexpected_model_error(type_name, &e));
            None
        }
    }
}

fn encode<M: Serialize>(type_name: &str, model: &M, diags: &mut Diagnostics) -> Option<Value> {
    match serde_json::to_value(model) {
        Ok(value) => Some(value),
        Err(e) => {
            diags.push(unexpected_model_error(type_name, &e));
            None
        }
    }
}

/// Validate a configuration against the schema, then decode it
fn decode_config<M: DeserializeOwned>(
    type_name: &str,
    schema: &Schema,
    mut config: Value,
    diags: &mut Diagnostics,
) -> Option<M> {
    schema.validate_config(&mut config, diags);
    if diags.has_error() {
        return None;
    }
    decode(type_name, config, diags)
}

#[async_trait]
impl<R: Resource> DynResource for R {
    fn type_name(&self) -> &'static str {
        Resource::type_name(self)
    }

    fn schema(&self) -> Schema {
        Resource::schema(self)
    }

    async fn create(&self, diags: &mut Diagnostics, config: Value) -> Option<Value> {
        let name = Resource::type_name(self);
        let plan: R::Model = decode_config(name, &Resource::schema(self), config, diags)?;

        info!("Creating {}", name);
        let state = Resource::create(self, diags, plan).await?;
        encode(name, &state, diags)
    }

    async fn read(&self, diags: &mut Diagnostics, state: Value) -> Option<Value> {
        let name = Resource::type_name(self);
        let state: R::Model = decode(name, state, diags)?;

        debug!("Reading {}", name);
        let state = Resource::read(self, diags, state).await?;
        encode(name, &state, diags)
    }

    async fn update(&self, diags: &mut Diagnostics, config: Value, state: Value) -> Option<Value> {
        let name = Resource::type_name(self);
        let plan: R::Model = decode_config(name, &Resource::schema(self), config, diags)?;
        let state: R::Model = decode(name, state, diags)?;

        info!("Updating {}", name);
        let state = Resource::update(self, diags, plan, state).await?;
        encode(name, &state, diags)
    }

    async fn delete(&self, diags: &mut Diagnostics, state: Value) -> Option<()> {
        let name = Resource::type_name(self);
        let state: R::Model = decode(name, state, diags)?;

        info!("Deleting {}", name);
        Resource::delete(self, diags, state).await
    }

    /// Import, then refresh the partial state
    async fn import(&self, diags: &mut Diagnostics, id: &str) -> Option<Value> {
        let name = Resource::type_name(self);

        info!("Importing {} '{}'", name, id);
        let partial = Resource::import_state(self, diags, id).await?;
        if diags.has_error() {
            return None;
        }

        let Some(state) = Resource::read(self, diags, partial).await else {
            if !diags.has_error() {
                diags.error(
                    "Cannot import non-existent remote object",
                    format!(
                        "While attempting to import an existing object to \"{}\", no object exists with the id \"{}\".",
                        name, id
                    ),
                );
            }
            return None;
        };
        encode(name, &state, diags)
    }
}

#[async_trait]
impl<D: DataSource> DynDataSource for D {
    fn type_name(&self) -> &'static str {
        DataSource::type_name(self)
    }

    fn schema(&self) -> Schema {
        DataSource::schema(self)
    }

    async fn read(&self, diags: &mut Diagnostics, config: Value) -> Option<Value> {
        let name = DataSource::type_name(self);
        let config: D::Model = decode_config(name, &DataSource::schema(self), config, diags)?;

        debug!("Reading data source {}", name);
        let result = DataSource::read(self, diags, config).await?;
        encode(name, &result, diags)
    }
}

/// Resources and data sources by full type name (`prefect_<name>`)
#[derive(Default)]
pub struct Registry {
    resources: BTreeMap<String, Box<dyn DynResource>>,
    data_sources: BTreeMap<String, Box<dyn DynDataSource>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn full_name(type_name: &str) -> String {
        format!("{}_{}", defaults::TYPE_NAME_PREFIX, type_name)
    }

    pub fn register_resource<R: Resource + 'static>(&mut self, resource: R) {
        let name = Self::full_name(Resource::type_name(&resource));
        self.resources.insert(name, Box::new(resource));
    }

    pub fn register_data_source<D: DataSource + 'static>(&mut self, data_source: D) {
        let name = Self::full_name(DataSource::type_name(&data_source));
        self.data_sources.insert(name, Box::new(data_source));
    }

    /// Look up a resource; accepts the name with or without the provider prefix
    pub fn resource(&self, type_name: &str) -> Option<&dyn DynResource> {
        self.resources
            .get(type_name)
            .or_else(|| self.resources.get(&Self::full_name(type_name)))
            .map(|r| r.as_ref())
    }

    pub fn data_source(&self, type_name: &str) -> Option<&dyn DynDataSource> {
        self.data_sources
            .get(type_name)
            .or_else(|| self.data_sources.get(&Self::full_name(type_name)))
            .map(|d| d.as_ref())
    }

    pub fn resource_names(&self) -> Vec<&str> {
        self.resources.keys().map(String::as_str).collect()
    }

    pub fn data_source_names(&self) -> Vec<&str> {
        self.data_sources.keys().map(String::as_str).collect()
    }
}
