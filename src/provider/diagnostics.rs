//! Diagnostics reported by lifecycle operations
//!
//! Operations never return errors directly: they push diagnostics and return
//! `None`. The caller inspects [`Diagnostics::has_error`] to decide whether the
//! operation succeeded.

use log::warn;
use serde::Serialize;
use std::fmt;

use crate::error::PrefectError;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// Root attribute the diagnostic refers to, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Warning",
        };
        write!(f, "{}: {}", level, self.summary)?;
        if let Some(attr) = &self.attribute {
            write!(f, " (attribute \"{}\")", attr)?;
        }
        if !self.detail.is_empty() {
            write!(f, "\n\n{}", self.detail)?;
        }
        Ok(())
    }
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity == Severity::Warning {
            warn!("{}", diagnostic.summary);
        }
        self.0.push(diagnostic);
    }

    pub fn error(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        });
    }

    pub fn attribute_error(
        &mut self,
        attribute: impl Into<String>,
        summary: impl Into<String>,
        detail: impl Into<String>,
    ) {
        self.push(Diagnostic {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
            attribute: Some(attribute.into()),
        });
    }

    pub fn warning(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            summary: summary.into(),
            detail: detail.into(),
            attribute: None,
        });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        for d in other.0 {
            self.push(d);
        }
    }

    pub fn has_error(&self) -> bool {
        self.0.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Errors only
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter().filter(|d| d.severity == Severity::Error)
    }
}

// Canned diagnostics shared by every adapter.

/// A sub-client could not be built (bad scope for a cloud endpoint)
pub fn create_client_error(client_name: &str, err: &PrefectError) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        summary: format!("Error creating {} client", client_name),
        detail: format!(
            "Could not create {} client, unexpected error: {}. This is a bug in the provider, please report this to the maintainers.",
            client_name, err
        ),
        attribute: None,
    }
}

/// A resource or data source was used before the provider was configured
pub fn unconfigured_client(component: &str) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        summary: format!("Unconfigured {}", component),
        detail: format!(
            "Expected a configured Prefect client, got none. The provider must be configured before the {} is used.",
            component
        ),
        attribute: None,
    }
}

/// The API rejected or failed an operation
pub fn api_error(summary: &str, action: &str, resource_name: &str, err: &PrefectError) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        summary: summary.to_string(),
        detail: format!(
            "Could not {} {}, unexpected error: {}",
            action, resource_name, err
        ),
        attribute: None,
    }
}

pub fn resource_not_found(resource_name: &str, err: &PrefectError) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        summary: format!("Error refreshing {} state", resource_name),
        detail: format!("Could not find {}, unexpected error: {}", resource_name, err),
        attribute: None,
    }
}

pub fn parse_uuid_error(attribute: &str, resource_name: &str, err: &dyn fmt::Display) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        summary: format!("Error parsing {} ID", resource_name),
        detail: format!(
            "Could not parse {} ID to UUID, unexpected error: {}",
            resource_name, err
        ),
        attribute: Some(attribute.to_string()),
    }
}

pub fn serialize_data_error(attribute: &str, what: &str, err: &dyn fmt::Display) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        summary: format!("Error serializing {}", what),
        detail: format!("Could not serialize {} as JSON string: {}", what, err),
        attribute: Some(attribute.to_string()),
    }
}

/// State or configuration JSON did not match the model of a type
pub fn unexpected_model_error(type_name: &str, err: &dyn fmt::Display) -> Diagnostic {
    Diagnostic {
        severity: Severity::Error,
        summary: "Unexpected Resource Configure Type".to_string(),
        detail: format!(
            "Could not decode the {} model: {}. Please report this issue to the provider developers.",
            type_name, err
        ),
        attribute: None,
    }
}
