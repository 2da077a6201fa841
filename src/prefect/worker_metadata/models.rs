//! Worker metadata models
//!
//! The aggregate view nests workers by collection, then by worker type:
//! `{"prefect-aws": {"ecs": {...}}, "prefect": {"process": {...}}}`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Metadata of a single worker type
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkerMetadata {
    #[serde(rename = "type")]
    pub worker_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_base_job_configuration: Option<Map<String, Value>>,
}

/// Raw aggregate response, keyed by collection then worker type
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct WorkerMetadataResponse(pub BTreeMap<String, BTreeMap<String, WorkerMetadata>>);

impl WorkerMetadataResponse {
    /// Default base job configuration per worker type, across all collections
    pub fn base_job_configs(&self) -> BTreeMap<String, Map<String, Value>> {
        self.0
            .values()
            .flat_map(|workers| workers.values())
            .filter_map(|w| {
                w.default_base_job_configuration
                    .as_ref()
                    .map(|cfg| (w.worker_type.clone(), cfg.clone()))
            })
            .collect()
    }
}
