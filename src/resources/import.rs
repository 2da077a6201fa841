//! Import identifier parsing
//!
//! Import identifiers are either a single identifier or two comma-separated
//! ones, eg. `id` or `id,workspace_id`. Which position holds the workspace
//! depends on the resource.

use uuid::Uuid;

use crate::provider::diagnostics::{parse_uuid_error, Diagnostic, Diagnostics, Severity};

const MAX_IMPORT_IDENTIFIERS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportId {
    Single(String),
    Pair(String, String),
}

fn unexpected_import(detail: String) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        summary: "Unexpected Import Identifier".to_string(),
        detail,
        attribute: None,
    }
}

/// Split an import identifier into at most two non-empty parts.
///
/// `form` is the documented shape, eg. `id,workspace_id`, and is only used in
/// error messages.
pub fn parse_import_id(id: &str, form: &str) -> Result<ImportId, Diagnostic> {
    let parts: Vec<&str> = id.split(',').collect();

    if parts.len() > MAX_IMPORT_IDENTIFIERS {
        return Err(unexpected_import(format!(
            "Expected a maximum of 2 import identifiers, in the form of `{}`. Got {:?}",
            form, id
        )));
    }

    match parts.as_slice() {
        [single] => Ok(ImportId::Single(single.to_string())),
        [first, second] if !first.is_empty() && !second.is_empty() => {
            Ok(ImportId::Pair(first.to_string(), second.to_string()))
        }
        _ => Err(unexpected_import(format!(
            "Expected non-empty import identifiers, in the form of `{}`. Got {:?}",
            form, id
        ))),
    }
}

/// Position of the workspace ID within a two-part identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspacePosition {
    /// `<identifier>,workspace_id`
    Last,
    /// `workspace_id,<identifier>`
    First,
}

/// A parsed import identifier for a workspace-scoped resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceImport {
    pub identifier: String,
    pub workspace_id: Option<Uuid>,
}

/// Parse `<identifier>` or a pair of identifier and workspace ID.
///
/// `identifier` names the first-class key (`id` or `name`) and
/// `resource_name` is used in diagnostics.
pub fn parse_workspace_import(
    id: &str,
    identifier: &str,
    position: WorkspacePosition,
    resource_name: &str,
    diags: &mut Diagnostics,
) -> Option<WorkspaceImport> {
    let form = match position {
        WorkspacePosition::Last => format!("{},workspace_id", identifier),
        WorkspacePosition::First => format!("workspace_id,{}", identifier),
    };

    let parsed = match parse_import_id(id, &form) {
        Ok(parsed) => parsed,
        Err(diag) => {
            diags.push(diag);
            return None;
        }
    };

    let (identifier, workspace) = match parsed {
        ImportId::Single(identifier) => (identifier, None),
        ImportId::Pair(first, second) => match position {
            WorkspacePosition::Last => (first, Some(second)),
            WorkspacePosition::First => (second, Some(first)),
        },
    };

    let workspace_id = match workspace {
        Some(raw) => match Uuid::parse_str(&raw) {
            Ok(ws) => Some(ws),
            Err(e) => {
                diags.push(parse_uuid_error("workspace_id", resource_name, &e));
                return None;
            }
        },
        None => None,
    };

    Some(WorkspaceImport {
        identifier,
        workspace_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM: &str = "id,workspace_id";

    #[test]
    fn test_pair_splits_into_two_identifiers() {
        assert_eq!(
            parse_import_id("abc,def", FORM).unwrap(),
            ImportId::Pair("abc".to_string(), "def".to_string())
        );
    }

    #[test]
    fn test_single_identifier() {
        assert_eq!(
            parse_import_id("abc", FORM).unwrap(),
            ImportId::Single("abc".to_string())
        );
    }

    #[test]
    fn test_empty_segments_are_rejected() {
        for id in ["abc,", ",def", ","] {
            let diag = parse_import_id(id, FORM).unwrap_err();
            assert_eq!(diag.summary, "Unexpected Import Identifier");
            assert_eq!(
                diag.detail,
                format!(
                    "Expected non-empty import identifiers, in the form of `id,workspace_id`. Got {:?}",
                    id
                )
            );
        }
    }

    #[test]
    fn test_too_many_segments_are_rejected() {
        let diag = parse_import_id("a,b,c", FORM).unwrap_err();
        assert_eq!(
            diag.detail,
            "Expected a maximum of 2 import identifiers, in the form of `id,workspace_id`. Got \"a,b,c\""
        );
    }

    #[test]
    fn test_workspace_import_positions() {
        let ws = Uuid::new_v4();
        let mut diags = Diagnostics::new();

        let last = parse_workspace_import(
            &format!("dep-id,{}", ws),
            "id",
            WorkspacePosition::Last,
            "Deployment",
            &mut diags,
        )
        .unwrap();
        assert_eq!(last.identifier, "dep-id");
        assert_eq!(last.workspace_id, Some(ws));

        let first = parse_workspace_import(
            &format!("{},my-pool", ws),
            "name",
            WorkspacePosition::First,
            "Work Pool",
            &mut diags,
        )
        .unwrap();
        assert_eq!(first.identifier, "my-pool");
        assert_eq!(first.workspace_id, Some(ws));
        assert!(!diags.has_error());
    }

    #[test]
    fn test_workspace_import_bad_uuid() {
        let mut diags = Diagnostics::new();
        let result = parse_workspace_import(
            "id,not-a-uuid",
            "id",
            WorkspacePosition::Last,
            "Deployment",
            &mut diags,
        );
        assert!(result.is_none());
        let d = diags.errors().next().unwrap();
        assert_eq!(d.summary, "Error parsing Deployment ID");
        assert_eq!(d.attribute.as_deref(), Some("workspace_id"));
    }

    #[test]
    fn test_workspace_import_form_in_message() {
        let mut diags = Diagnostics::new();
        parse_workspace_import("a,b,c", "name", WorkspacePosition::First, "Work Pool", &mut diags);
        assert!(diags
            .errors()
            .next()
            .unwrap()
            .detail
            .contains("`workspace_id,name`"));
    }
}
