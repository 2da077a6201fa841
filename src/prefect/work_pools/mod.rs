//! Work pool module

mod api;
mod models;

pub use api::WorkPoolsClient;
pub use models::{WorkPool, WorkPoolCreate, WorkPoolFilter, WorkPoolUpdate};
