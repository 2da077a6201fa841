//! Webhook data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::cloud;
use crate::prefect::helpers::null_as_default;
use crate::prefect::traits::ApiResource;

/// Webhook as returned by the API
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Webhook {
    pub id: Uuid,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub template: String,
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
}

impl Webhook {
    /// Public URL external services post events to
    pub fn endpoint(&self) -> String {
        format!("{}/{}", cloud::WEBHOOK_BASE_URL, self.slug)
    }
}

impl ApiResource for Webhook {
    fn id(&self) -> Uuid {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Payload for both create (POST) and update (PUT)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct WebhookRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub enabled: bool,
    pub template: String,
}
