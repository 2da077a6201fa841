//! Block schema data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::prefect::helpers::null_as_default;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BlockSchema {
    pub id: Uuid,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checksum: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Map<String, Value>,
    pub block_type_id: Uuid,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capabilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

/// Body of POST /block_schemas/filter:
/// `{"block_schemas": {"block_type_id": {"any_": [...]}}}`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BlockSchemaFilter {
    block_schemas: BlockTypeCriteria,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct BlockTypeCriteria {
    block_type_id: AnyOf,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct AnyOf {
    any_: Vec<Uuid>,
}

impl BlockSchemaFilter {
    pub fn by_block_type_ids(ids: &[Uuid]) -> Self {
        Self {
            block_schemas: BlockTypeCriteria {
                block_type_id: AnyOf { any_: ids.to_vec() },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_rendering() {
        let id = Uuid::new_v4();
        assert_eq!(
            serde_json::to_value(BlockSchemaFilter::by_block_type_ids(&[id])).unwrap(),
            serde_json::json!({"block_schemas": {"block_type_id": {"any_": [id.to_string()]}}})
        );
    }
}
