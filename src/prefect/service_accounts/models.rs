//! Service account data models
//!
//! The API calls service accounts "bots".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prefect::traits::ApiResource;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceAccount {
    pub id: Uuid,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    pub name: String,
    #[serde(default)]
    pub actor_id: Option<Uuid>,
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub account_role_id: Option<Uuid>,
    #[serde(default)]
    pub api_key: Option<ServiceAccountApiKey>,
}

impl ApiResource for ServiceAccount {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// API key metadata; `key` is only present in the create response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServiceAccountApiKey {
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ServiceAccountCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub account_role_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub api_key_expiration: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ServiceAccountUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub account_role_id: Option<Uuid>,
}

/// Body of POST /bots/filter: `{"bots": {"name": {"any_": [...]}}}`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ServiceAccountFilter {
    bots: NameCriteria,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct NameCriteria {
    name: AnyOf,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
struct AnyOf {
    any_: Vec<String>,
}

impl ServiceAccountFilter {
    pub fn by_names(names: &[&str]) -> Self {
        Self {
            bots: NameCriteria {
                name: AnyOf {
                    any_: names.iter().map(|n| n.to_string()).collect(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_response_carries_key() {
        let sa: ServiceAccount = serde_json::from_value(json!({
            "id": "7b1d2c3e-4f5a-4b6c-8d7e-9f0a1b2c3d4e",
            "name": "ci-bot",
            "account_role_id": "1c2d3e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f",
            "api_key": {
                "id": "2d3e4f5a-6b7c-4d8e-9f0a-1b2c3d4e5f6a",
                "name": "ci-bot-key",
                "created": "2024-05-01T10:00:00Z",
                "expiration": null,
                "key": "pnu_secret"
            }
        }))
        .unwrap();
        let key = sa.api_key.unwrap();
        assert_eq!(key.key.as_deref(), Some("pnu_secret"));
        assert!(key.expiration.is_none());
    }

    #[test]
    fn test_filter_rendering() {
        assert_eq!(
            serde_json::to_value(ServiceAccountFilter::by_names(&["ci-bot"])).unwrap(),
            json!({"bots": {"name": {"any_": ["ci-bot"]}}})
        );
    }
}
