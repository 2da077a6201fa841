//! Flow data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prefect::helpers::null_as_default;
use crate::prefect::traits::ApiResource;

/// Flow as returned by the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Flow {
    pub id: Uuid,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

impl ApiResource for Flow {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FlowCreate {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Only tags can change after creation
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FlowUpdate {
    #[serde(default)]
    pub tags: Vec<String>,
}
