//! Service account module

mod api;
mod models;

pub use api::ServiceAccountsClient;
pub use models::{
    ServiceAccount, ServiceAccountApiKey, ServiceAccountCreate, ServiceAccountFilter,
    ServiceAccountUpdate,
};
