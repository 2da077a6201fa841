//! Block schema module

mod api;
mod models;

pub use api::BlockSchemasClient;
pub use models::{BlockSchema, BlockSchemaFilter};
