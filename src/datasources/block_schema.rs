//! `prefect_block_schema` data source

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_id_list;
use crate::prefect::block_schemas::BlockSchema;
use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{api_error, create_client_error, Diagnostics};
use crate::provider::schema::{attributes, Attribute, Schema};
use crate::provider::DataSource;
use crate::resources::json::NormalizedJson;
use crate::resources::{require_client, scope_id};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct BlockSchemaDataSourceModel {
    #[serde(default)]
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub workspace_id: Option<Uuid>,
    #[serde(default)]
    pub block_type_ids: Vec<String>,
    #[serde(default)]
    pub block_schemas: Option<Vec<BlockSchemaSummary>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BlockSchemaSummary {
    pub id: Uuid,
    pub block_type_id: Uuid,
    pub checksum: String,
    pub version: String,
    pub capabilities: Vec<String>,
    pub fields: NormalizedJson,
}

impl From<&BlockSchema> for BlockSchemaSummary {
    fn from(schema: &BlockSchema) -> Self {
        Self {
            id: schema.id,
            block_type_id: schema.block_type_id,
            checksum: schema.checksum.clone(),
            version: schema.version.clone(),
            capabilities: schema.capabilities.clone(),
            fields: NormalizedJson::from_map(Some(&schema.fields)),
        }
    }
}

pub struct BlockSchemaDataSource {
    client: Option<PrefectClient>,
}

impl BlockSchemaDataSource {
    pub fn new(client: Option<PrefectClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for BlockSchemaDataSource {
    type Model = BlockSchemaDataSourceModel;

    fn type_name(&self) -> &'static str {
        "block_schema"
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "Get the schemas registered for one or more block types.",
            [
                ("account_id", Attribute::string("Account ID (UUID), defaults to the account set in the provider").optional()),
                ("workspace_id", Attribute::string("Workspace ID (UUID), defaults to the workspace set in the provider").optional()),
                ("block_type_ids", Attribute::string_list("Block type IDs (UUID) to list schemas for").required()),
                (
                    "block_schemas",
                    Attribute::object_list(
                        attributes([
                            ("id", Attribute::string("Block schema ID (UUID)").computed()),
                            ("block_type_id", Attribute::string("Block type ID (UUID)").computed()),
                            ("checksum", Attribute::string("Checksum of the schema fields").computed()),
                            ("version", Attribute::string("Version of the block schema").computed()),
                            ("capabilities", Attribute::string_list("Capabilities of the block type").computed()),
                            ("fields", Attribute::json("JSON schema of the block fields").computed()),
                        ]),
                        "Block schemas of the requested block types",
                    )
                    .computed(),
                ),
            ],
        )
    }

    async fn read(
        &self,
        diags: &mut Diagnostics,
        mut config: BlockSchemaDataSourceModel,
    ) -> Option<BlockSchemaDataSourceModel> {
        let client = require_client(&self.client, "data source", diags)?;
        let client = client
            .block_schemas(scope_id(config.account_id), scope_id(config.workspace_id))
            .map_err(|e| diags.push(create_client_error("block schema", &e)))
            .ok()?;

        let ids = parse_id_list(&config.block_type_ids, "block_type_ids", "Block Type", diags)?;

        match client.list(&ids).await {
            Ok(schemas) => {
                config.block_schemas = Some(schemas.iter().map(BlockSchemaSummary::from).collect());
                Some(config)
            }
            Err(e) => {
                diags.push(api_error("Error refreshing block schemas", "read", "block schemas", &e));
                None
            }
        }
    }
}
