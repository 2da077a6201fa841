//! Worker metadata module

mod api;
mod models;

pub use api::WorkerMetadataClient;
pub use models::{WorkerMetadata, WorkerMetadataResponse};
