//! Resource adapters
//!
//! Each adapter maps its state model to API payloads and back on every
//! lifecycle call.

mod deployment;
mod flow;
pub mod import;
pub mod json;
mod service_account;
mod variable;
mod webhook;
mod work_pool;
mod workspace;

use uuid::Uuid;

use crate::prefect::PrefectClient;
use crate::provider::diagnostics::{parse_uuid_error, unconfigured_client, Diagnostics};

pub use deployment::{DeploymentResource, DeploymentResourceModel, PullStepModel};
pub use flow::{FlowResource, FlowResourceModel};
pub use service_account::{ServiceAccountResource, ServiceAccountResourceModel};
pub use variable::{VariableResource, VariableResourceModel};
pub use webhook::{WebhookResource, WebhookResourceModel};
pub use work_pool::{WorkPoolResource, WorkPoolResourceModel};
pub use workspace::{WorkspaceResource, WorkspaceResourceModel};

/// The configured client, or an "Unconfigured" diagnostic
pub(crate) fn require_client<'a>(
    client: &'a Option<PrefectClient>,
    component: &str,
    diags: &mut Diagnostics,
) -> Option<&'a PrefectClient> {
    if client.is_none() {
        diags.push(unconfigured_client(component));
    }
    client.as_ref()
}

/// Parse the `id` attribute of a state model
pub(crate) fn parse_id(id: Option<&str>, resource_name: &str, diags: &mut Diagnostics) -> Option<Uuid> {
    let raw = id.unwrap_or_default();
    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(e) => {
            diags.push(parse_uuid_error("id", resource_name, &e));
            None
        }
    }
}

/// Nil when unset; scope IDs fall back to the provider defaults
pub(crate) fn scope_id(id: Option<Uuid>) -> Uuid {
    id.unwrap_or_default()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let mut diags = Diagnostics::new();
        let id = Uuid::new_v4();
        assert_eq!(parse_id(Some(&id.to_string()), "Flow", &mut diags), Some(id));
        assert!(parse_id(Some("nope"), "Flow", &mut diags).is_none());
        assert_eq!(
            diags.errors().next().unwrap().summary,
            "Error parsing Flow ID"
        );
    }

    #[test]
    fn test_require_client() {
        let mut diags = Diagnostics::new();
        assert!(require_client(&None, "resource", &mut diags).is_none());
        assert!(diags.has_error());
    }
}
