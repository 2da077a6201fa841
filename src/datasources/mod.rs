//! Data source adapters

mod block_schema;
mod service_account;
mod work_pools;
mod worker_metadata;

pub use block_schema::{BlockSchemaDataSource, BlockSchemaDataSourceModel};
pub use service_account::{ServiceAccountDataSource, ServiceAccountDataSourceModel};
pub use work_pools::{WorkPoolsDataSource, WorkPoolsDataSourceModel};
pub use worker_metadata::{WorkerMetadataDataSource, WorkerMetadataDataSourceModel};

use uuid::Uuid;

use crate::provider::diagnostics::{parse_uuid_error, Diagnostics};

/// Parse a list attribute of UUIDs, reporting the first malformed entry
pub(crate) fn parse_id_list(
    values: &[String],
    attribute: &str,
    resource_name: &str,
    diags: &mut Diagnostics,
) -> Option<Vec<Uuid>> {
    values
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            Uuid::parse_str(raw).map_err(|e| {
                diags.push(parse_uuid_error(&format!("{}[{}]", attribute, i), resource_name, &e))
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .ok()
}
