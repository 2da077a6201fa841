//! Output formatting module
//!
//! Renders state documents, schemas and diagnostics for the driver binary.

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::{PrefectError, Result};
use crate::provider::{Diagnostics, Severity};

/// Render any serializable value in the requested format
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| PrefectError::Encode(e.to_string()))
        }
        OutputFormat::Yaml => {
            serde_yml::to_string(value).map_err(|e| PrefectError::Encode(e.to_string()))
        }
    }
}

/// Print a value to stdout
pub fn output_value<T: Serialize + ?Sized>(value: &T, format: OutputFormat) {
    match render(value, format) {
        Ok(text) => println!("{}", text.trim_end()),
        Err(e) => eprintln!("Error serializing to {}: {}", format, e),
    }
}

/// Print diagnostics to stderr, warnings first
pub fn output_diagnostics(diags: &Diagnostics) {
    let (errors, warnings): (Vec<_>, Vec<_>) =
        diags.iter().partition(|d| d.severity == Severity::Error);
    for diagnostic in warnings.into_iter().chain(errors) {
        eprintln!("{}\n", diagnostic);
    }
}
