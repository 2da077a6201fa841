//! Variable module

mod api;
mod models;

pub use api::VariablesClient;
pub use models::{Variable, VariableCreate, VariableUpdate};
