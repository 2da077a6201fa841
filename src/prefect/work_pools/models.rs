//! Work pool data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::prefect::helpers::null_as_default;
use crate::prefect::traits::ApiResource;

/// Work pool as returned by the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkPool {
    pub id: Uuid,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "type")]
    pub pool_type: String,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default)]
    pub concurrency_limit: Option<i64>,
    #[serde(default)]
    pub default_queue_id: Option<Uuid>,
    #[serde(default)]
    pub base_job_template: Option<Map<String, Value>>,
}

impl ApiResource for WorkPool {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WorkPoolCreate {
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub description: String,
    #[serde(rename = "type")]
    pub pool_type: String,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub concurrency_limit: Option<i64>,
    #[serde(default)]
    pub base_job_template: Map<String, Value>,
}

/// Name and type are fixed at creation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WorkPoolUpdate {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub concurrency_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub base_job_template: Option<Map<String, Value>>,
}

/// Body of POST /work_pools/filter
///
/// Renders `{"work_pools": {"id": {"any_": [...]}}}`; an empty list means no filter.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct WorkPoolFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    work_pools: Option<WorkPoolFilterCriteria>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct WorkPoolFilterCriteria {
    id: AnyOf,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct AnyOf {
    any_: Vec<Uuid>,
}

impl WorkPoolFilter {
    pub fn by_ids(ids: &[Uuid]) -> Self {
        if ids.is_empty() {
            return Self::default();
        }

        Self {
            work_pools: Some(WorkPoolFilterCriteria {
                id: AnyOf { any_: ids.to_vec() },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_field_is_renamed() {
        let pool: WorkPool = serde_json::from_value(json!({
            "id": "3b0c8f6d-4e1a-4a7b-9c2d-5e6f7a8b9c0d",
            "name": "k8s",
            "type": "kubernetes",
            "is_paused": true,
            "base_job_template": {"job_configuration": {}}
        }))
        .unwrap();
        assert_eq!(pool.pool_type, "kubernetes");
        assert!(pool.is_paused);
        assert!(pool.concurrency_limit.is_none());

        let create = WorkPoolCreate {
            name: "k8s".to_string(),
            pool_type: "kubernetes".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&create).unwrap();
        assert_eq!(value["type"], "kubernetes");
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_filter_rendering() {
        let id = Uuid::new_v4();
        assert_eq!(
            serde_json::to_value(WorkPoolFilter::by_ids(&[id])).unwrap(),
            json!({"work_pools": {"id": {"any_": [id.to_string()]}}})
        );
        assert_eq!(
            serde_json::to_value(WorkPoolFilter::by_ids(&[])).unwrap(),
            json!({})
        );
    }
}
