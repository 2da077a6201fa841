//! Flow module

mod api;
mod models;

pub use api::FlowsClient;
pub use models::{Flow, FlowCreate, FlowUpdate};
