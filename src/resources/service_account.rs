//! `prefect_service_account` resource (account-scoped)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::import::{parse_import_id, ImportId};
use super::{parse_id, require_client, scope_id};
use crate::prefect::service_accounts::{
    ServiceAccount, ServiceAccountCreate, ServiceAccountUpdate, ServiceAccountsClient,
};
use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{api_error, create_client_error, Diagnostics};
use crate::provider::schema::{Attribute, Schema};
use crate::provider::Resource;

const RESOURCE_NAME: &str = "Service Account";

/// Import identifiers of this form are looked up by name
const NAME_IMPORT_PREFIX: &str = "name/";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ServiceAccountResourceModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account_role_id: Option<Uuid>,
    #[serde(default)]
    pub actor_id: Option<Uuid>,
    #[serde(default)]
    pub api_key_expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub api_key_id: Option<Uuid>,
    #[serde(default)]
    pub api_key_name: Option<String>,
    #[serde(default)]
    pub api_key_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// The key itself is only returned on creation, so a response without one
/// keeps the key already held in state.
pub(crate) fn copy_service_account_to_model(sa: &ServiceAccount, model: &mut ServiceAccountResourceModel) {
    model.id = Some(sa.id.to_string());
    model.created = sa.created;
    model.updated = sa.updated;
    model.account_id = sa.account_id.or(model.account_id);
    model.name = Some(sa.name.clone());
    model.account_role_id = sa.account_role_id;
    model.actor_id = sa.actor_id;

    if let Some(key) = &sa.api_key {
        model.api_key_id = Some(key.id);
        model.api_key_name = Some(key.name.clone());
        model.api_key_created = key.created;
        model.api_key_expiration = key.expiration;
        if key.key.is_some() {
            model.api_key = key.key.clone();
        }
    }
}

pub struct ServiceAccountResource {
    client: Option<PrefectClient>,
}

impl ServiceAccountResource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }

    fn sub_client(
        &self,
        model: &ServiceAccountResourceModel,
        diags: &mut Diagnostics,
    ) -> Option<ServiceAccountsClient> {
        let client = require_client(&self.client, "resource", diags)?;
        client
            .service_accounts(scope_id(model.account_id))
            .map_err(|e| diags.push(create_client_error("service account", &e)))
            .ok()
    }
}

#[async_trait]
impl Resource for ServiceAccountResource {
    type Model = ServiceAccountResourceModel;

    fn type_name(&self) -> &'static str {
        "service_account"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Service accounts are non-user accounts that authenticate with an API key. They are managed at the account level.",
            [
                ("id", Attribute::string("Service account ID (UUID)").computed()),
                ("created", Attribute::string("Timestamp of when the resource was created (RFC3339)").computed()),
                ("updated", Attribute::string("Timestamp of when the resource was updated (RFC3339)").computed()),
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional_computed()),
                ("name", Attribute::string("Name of the service account").required()),
                ("account_role_id", Attribute::string("Account role ID (UUID) granted to the service account").optional_computed()),
                ("actor_id", Attribute::string("Actor ID (UUID), used for granting access to resources like blocks and deployments").computed()),
                (
                    "api_key_expiration",
                    Attribute::string("Timestamp of the API key expiration (RFC3339). If left as null, the API key will not expire.")
                        .optional_computed()
                        .requires_replace(),
                ),
                ("api_key_id", Attribute::string("API key ID (UUID)").computed()),
                ("api_key_name", Attribute::string("API key name").computed()),
                ("api_key_created", Attribute::string("Timestamp of the API key creation (RFC3339)").computed()),
                ("api_key", Attribute::string("API key of the service account").computed().sensitive()),
            ],
        )
    }

    async fn create(
        &self,
        diags: &mut Diagnostics,
        mut plan: ServiceAccountResourceModel,
    ) -> Option<ServiceAccountResourceModel> {
        let client = self.sub_client(&plan, diags)?;

        let payload = ServiceAccountCreate {
            name: plan.name.clone().unwrap_or_default(),
            account_role_id: plan.account_role_id,
            api_key_expiration: plan.api_key_expiration,
        };

        match client.create(&payload).await {
            Ok(sa) => {
                debug!("Created service account {}", sa.id);
                copy_service_account_to_model(&sa, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error creating service account", "create", "service account", &e));
                None
            }
        }
    }

    /// Looks up by id, or by name when the state has no id yet
    async fn read(
        &self,
        diags: &mut Diagnostics,
        mut state: ServiceAccountResourceModel,
    ) -> Option<ServiceAccountResourceModel> {
        let client = self.sub_client(&state, diags)?;

        let result = match (&state.id, &state.name) {
            (None, Some(name)) => client.get_by_name(name).await,
            _ => {
                let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;
                client.get(id).await
            }
        };

        match result {
            Ok(sa) => {
                copy_service_account_to_model(&sa, &mut state);
                Some(state)
            }
            Err(e) if e.is_not_found() => {
                warn!("Service account {:?} no longer exists, removing from state", state.id.or(state.name));
                None
            }
            Err(e) => {
                diags.push(api_error("Error refreshing service account state", "read", "service account", &e));
                None
            }
        }
    }

    async fn update(
        &self,
        diags: &mut Diagnostics,
        mut plan: ServiceAccountResourceModel,
        state: ServiceAccountResourceModel,
    ) -> Option<ServiceAccountResourceModel> {
        let client = self.sub_client(&plan, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        let payload = ServiceAccountUpdate {
            name: plan.name.clone().unwrap_or_default(),
            account_role_id: plan.account_role_id,
        };
        if let Err(e) = client.update(id, &payload).await {
            diags.push(api_error("Error updating service account", "update", "service account", &e));
            return None;
        }

        // Carry the key over; it is never returned again
        plan.api_key = state.api_key;

        match client.get(id).await {
            Ok(sa) => {
                copy_service_account_to_model(&sa, &mut plan);
                Some(plan)
            }
            Err(e) => {
                diags.push(api_error("Error refreshing service account state", "read", "service account", &e));
                None
            }
        }
    }

    async fn delete(&self, diags: &mut Diagnostics, state: ServiceAccountResourceModel) -> Option<()> {
        let client = self.sub_client(&state, diags)?;
        let id = parse_id(state.id.as_deref(), RESOURCE_NAME, diags)?;

        client
            .delete(id)
            .await
            .map_err(|e| diags.push(api_error("Error deleting service account", "delete", "service account", &e)))
            .ok()
    }

    /// `id`, or `name/<name>`
    async fn import_state(&self, diags: &mut Diagnostics, id: &str) -> Option<ServiceAccountResourceModel> {
        let identifier = match parse_import_id(id, "id` or `name/<name>") {
            Ok(ImportId::Single(identifier)) => identifier,
            Ok(ImportId::Pair(..)) => {
                diags.error(
                    "Unexpected Import Identifier",
                    format!("Expected a service account id or `name/<name>`. Got {:?}", id),
                );
                return None;
            }
            Err(diag) => {
                diags.push(diag);
                return None;
            }
        };

        let model = match identifier.strip_prefix(NAME_IMPORT_PREFIX) {
            Some(name) if !name.is_empty() => ServiceAccountResourceModel {
                name: Some(name.to_string()),
                ..Default::default()
            },
            _ => ServiceAccountResourceModel {
                id: Some(identifier),
                ..Default::default()
            },
        };
        Some(model)
    }
}
