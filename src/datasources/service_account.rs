//! `prefect_service_account` data source

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::prefect::service_accounts::ServiceAccount;
use crate::prefect::traits::find_match;
use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{api_error, create_client_error, Diagnostics};
use crate::provider::schema::{Attribute, Schema};
use crate::provider::DataSource;
use crate::resources::{parse_id, require_client, scope_id};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ServiceAccountDataSourceModel {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub account_role_id: Option<Uuid>,
    #[serde(default)]
    pub actor_id: Option<Uuid>,
    #[serde(default)]
    pub api_key_id: Option<Uuid>,
    #[serde(default)]
    pub api_key_name: Option<String>,
    #[serde(default)]
    pub api_key_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub api_key_expiration: Option<DateTime<Utc>>,
}

impl ServiceAccountDataSourceModel {
    fn copy_from(&mut self, sa: &ServiceAccount) {
        self.id = Some(sa.id.to_string());
        self.name = Some(sa.name.clone());
        self.account_id = sa.account_id.or(self.account_id);
        self.created = sa.created;
        self.updated = sa.updated;
        self.account_role_id = sa.account_role_id;
        self.actor_id = sa.actor_id;

        if let Some(key) = &sa.api_key {
            self.api_key_id = Some(key.id);
            self.api_key_name = Some(key.name.clone());
            self.api_key_created = key.created;
            self.api_key_expiration = key.expiration;
        }
    }
}

pub struct ServiceAccountDataSource {
    client: Option<PrefectClient>,
}

impl ServiceAccountDataSource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for ServiceAccountDataSource {
    type Model = ServiceAccountDataSourceModel;

    fn type_name(&self) -> &'static str {
        "service_account"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Get information about an existing service account, by id or name.",
            [
                (
                    "id",
                    Attribute::string("Service account ID (UUID)").optional_computed().conflicts_with(&["name"]),
                ),
                (
                    "name",
                    Attribute::string("Name of the service account").optional_computed().conflicts_with(&["id"]),
                ),
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional_computed()),
                ("created", Attribute::string("Timestamp of when the resource was created (RFC3339)").computed()),
                ("updated", Attribute::string("Timestamp of when the resource was updated (RFC3339)").computed()),
                ("account_role_id", Attribute::string("Account role ID (UUID) of the service account").computed()),
                ("actor_id", Attribute::string("Actor ID (UUID)").computed()),
                ("api_key_id", Attribute::string("API key ID (UUID)").computed()),
                ("api_key_name", Attribute::string("API key name").computed()),
                ("api_key_created", Attribute::string("Timestamp of the API key creation (RFC3339)").computed()),
                ("api_key_expiration", Attribute::string("Timestamp of the API key expiration (RFC3339)").computed()),
            ],
        )
    }

    async fn read(
        &self,
        diags: &mut Diagnostics,
        mut config: ServiceAccountDataSourceModel,
    ) -> Option<ServiceAccountDataSourceModel> {
        let client = require_client(&self.client, "data source", diags)?;
        let client = client
            .service_accounts(scope_id(config.account_id))
            .map_err(|e| diags.push(create_client_error("service account", &e)))
            .ok()?;

        let sa = match (config.id.as_deref(), config.name.as_deref()) {
            (Some(raw), _) => {
                let id = parse_id(Some(raw), "Service Account", diags)?;
                match client.get(id).await {
                    Ok(sa) => sa,
                    Err(e) => {
                        diags.push(api_error("Error refreshing service account state", "read", "service account", &e));
                        return None;
                    }
                }
            }
            (None, Some(name)) => {
                let accounts = match client.list(&[name]).await {
                    Ok(accounts) => accounts,
                    Err(e) => {
                        diags.push(api_error("Error refreshing service account state", "read", "service account", &e));
                        return None;
                    }
                };
                match find_match(&accounts, name) {
                    Some(sa) => sa.clone(),
                    None => {
                        diags.error(
                            "Could not find service account",
                            format!("Could not find service account with name '{}'", name),
                        );
                        return None;
                    }
                }
            }
            (None, None) => {
                diags.error(
                    "Missing service account identifier",
                    "Either `id` or `name` must be set to look up a service account",
                );
                return None;
            }
        };

        config.copy_from(&sa);
        Some(config)
    }
}
