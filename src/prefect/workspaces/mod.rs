//! Workspace module

mod api;
mod models;

pub use api::WorkspacesClient;
pub use models::{Workspace, WorkspaceCreate, WorkspaceUpdate};
