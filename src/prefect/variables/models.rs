//! Variable data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::prefect::helpers::null_as_default;
use crate::prefect::traits::ApiResource;

/// Variable as returned by the API
///
/// `value` may be any JSON value: string, number, bool, array or object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Variable {
    pub id: Uuid,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    pub name: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl ApiResource for Variable {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VariableCreate {
    pub name: String,
    pub value: Value,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct VariableUpdate {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_variable_values_of_any_type() {
        for value in [
            json!("hello-world"),
            json!(123),
            json!(true),
            json!(["foo", "bar"]),
            json!({"foo": "bar"}),
        ] {
            let v: Variable = serde_json::from_value(json!({
                "id": "6a1ab7b2-3c1e-4e5a-9f0d-0c8e4c9a1b2d",
                "name": "config",
                "value": value.clone(),
                "tags": ["foo"]
            }))
            .unwrap();
            assert_eq!(v.value, value);
        }
    }

    #[test]
    fn test_update_skips_unset_fields() {
        let payload = VariableUpdate {
            value: Some(json!(1)),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&payload).unwrap(), json!({"value": 1}));
    }
}
