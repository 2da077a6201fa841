//! Command handlers for the driver binary
//!
//! Every handler returns `Ok(true)` when the operation finished without error
//! diagnostics. File and lookup problems are returned as errors.

use std::path::Path;

use log::debug;
use serde_json::{json, Value};

use crate::cli::{Cli, Command, SchemaKind};
use crate::error::{PrefectError, Result};
use crate::output::{output_diagnostics, output_value};
use crate::provider::{provider_schema, registry, Diagnostics, DynResource, ProviderConfig, Registry};

/// Read a JSON document from disk
pub fn read_document(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PrefectError::Config(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&text)
        .map_err(|e| PrefectError::Parse(format!("{} is not valid JSON: {}", path.display(), e)))
}

/// Provider configuration from `--provider-config` overlaid with the flags
pub fn load_provider_config(cli: &Cli) -> Result<ProviderConfig> {
    let base = match &cli.provider.provider_config {
        Some(path) => {
            debug!("Loading provider configuration from {}", path.display());
            serde_json::from_value(read_document(path)?).map_err(|e| {
                PrefectError::Config(format!("invalid provider configuration in {}: {}", path.display(), e))
            })?
        }
        None => ProviderConfig::default(),
    };
    Ok(cli.provider.apply(base))
}

fn unknown_type(kind: &str, name: &str) -> PrefectError {
    PrefectError::Config(format!(
        "unknown {} type \"{}\", run `list` to see the registered types",
        kind, name
    ))
}

fn find_resource<'a>(registry: &'a Registry, name: &str) -> Result<&'a dyn DynResource> {
    registry.resource(name).ok_or_else(|| unknown_type("resource", name))
}

fn finish(cli: &Cli, diags: &Diagnostics, value: Option<Value>) -> bool {
    output_diagnostics(diags);
    if diags.has_error() {
        return false;
    }
    if let Some(value) = value {
        output_value(&value, cli.output);
    }
    true
}

fn run_list(cli: &Cli) -> bool {
    let registry = registry(None);
    output_value(
        &json!({
            "resources": registry.resource_names(),
            "data_sources": registry.data_source_names(),
        }),
        cli.output,
    );
    true
}

fn run_schema(cli: &Cli, kind: SchemaKind, type_name: Option<&str>) -> Result<bool> {
    let registry = registry(None);
    let schema = match (kind, type_name) {
        (SchemaKind::Provider, _) => provider_schema(),
        (_, None) => {
            return Err(PrefectError::Config(format!("a type name is required for a {} schema", kind)))
        }
        (SchemaKind::Resource, Some(name)) => registry
            .resource(name)
            .ok_or_else(|| unknown_type("resource", name))?
            .schema(),
        (SchemaKind::DataSource, Some(name)) => registry
            .data_source(name)
            .ok_or_else(|| unknown_type("data source", name))?
            .schema(),
    };
    output_value(&schema, cli.output);
    Ok(true)
}

async fn run_lifecycle(cli: &Cli, registry: &Registry, diags: &mut Diagnostics) -> Result<bool> {
    let value = match &cli.command {
        Command::Create(args) => {
            let resource = find_resource(registry, &args.type_name)?;
            let config = read_document(&args.file)?;
            resource.create(diags, config).await
        }
        Command::Read(args) => {
            let resource = find_resource(registry, &args.type_name)?;
            let state = read_document(&args.state)?;
            let refreshed = resource.read(diags, state).await;
            if refreshed.is_none() && !diags.has_error() {
                // Removed upstream: report an empty state
                return Ok(finish(cli, diags, Some(Value::Null)));
            }
            refreshed
        }
        Command::Update(args) => {
            let resource = find_resource(registry, &args.type_name)?;
            let config = read_document(&args.file)?;
            let state = read_document(&args.state)?;
            resource.update(diags, config, state).await
        }
        Command::Delete(args) => {
            let resource = find_resource(registry, &args.type_name)?;
            let state = read_document(&args.state)?;
            resource.delete(diags, state).await;
            None
        }
        Command::Import(args) => {
            let resource = find_resource(registry, &args.type_name)?;
            resource.import(diags, &args.id).await
        }
        Command::Data(args) => {
            let data_source = registry
                .data_source(&args.type_name)
                .ok_or_else(|| unknown_type("data source", &args.type_name))?;
            let config = match &args.file {
                Some(path) => read_document(path)?,
                None => json!({}),
            };
            data_source.read(diags, config).await
        }
        Command::List | Command::Schema(_) => None,
    };

    Ok(finish(cli, diags, value))
}

/// Run the parsed command
pub async fn run_command(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Command::List => return Ok(run_list(cli)),
        Command::Schema(args) => return run_schema(cli, args.kind, args.type_name.as_deref()),
        _ => {}
    }

    let config = load_provider_config(cli)?;
    let mut diags = Diagnostics::new();
    let Some(client) = config.configure(&mut diags) else {
        output_diagnostics(&diags);
        return Ok(false);
    };
    debug!("Using Prefect API at {}", client.endpoint());

    let registry = registry(Some(client));
    run_lifecycle(cli, &registry, &mut diags).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FLOW_ID: &str = "3c8f5c2e-2a47-4a7e-9d55-0f3f8f1b6a10";

    fn document(value: Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", value).unwrap();
        file
    }

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("terraform-provider-prefect").chain(args.iter().copied()))
    }

    #[test]
    fn test_read_document_errors() {
        let err = read_document(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = read_document(file.path()).unwrap_err();
        assert!(err.to_string().contains("is not valid JSON"));
    }

    #[test]
    fn test_provider_config_file_with_flag_override() {
        let file = document(json!({
            "endpoint": "http://from-file:4200",
            "basic_auth_key": "admin:pass"
        }));
        let path = file.path().to_str().unwrap();
        let cli = cli(&["--provider-config", path, "--endpoint", "http://from-flag:4200", "list"]);

        let config = load_provider_config(&cli).unwrap();
        assert_eq!(config.endpoint.as_deref(), Some("http://from-flag:4200"));
        assert_eq!(config.basic_auth_key.as_deref(), Some("admin:pass"));
    }

    #[test]
    fn test_provider_config_rejects_unknown_fields() {
        let file = document(json!({"host": "http://localhost:4200"}));
        let path = file.path().to_str().unwrap();
        let cli = cli(&["--provider-config", path, "list"]);
        assert!(load_provider_config(&cli)
            .unwrap_err()
            .to_string()
            .contains("invalid provider configuration"));
    }

    #[tokio::test]
    async fn test_schema_and_list_need_no_client() {
        assert!(run_command(&cli(&["list"])).await.unwrap());
        assert!(run_command(&cli(&["schema", "deployment"])).await.unwrap());
        assert!(run_command(&cli(&["schema", "--kind", "provider"])).await.unwrap());

        let err = run_command(&cli(&["schema", "nope"])).await.unwrap_err();
        assert!(err.to_string().contains("unknown resource type \"nope\""));
    }

    #[tokio::test]
    async fn test_create_flow_end_to_end() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/flows/"))
            .and(body_json(json!({"name": "etl", "tags": []})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": FLOW_ID,
                "name": "etl",
                "tags": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = document(json!({"name": "etl"}));
        let uri = server.uri();
        let cli = cli(&["create", "flow", "--file", file.path().to_str().unwrap(), "--endpoint", &uri]);
        assert!(run_command(&cli).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_removed_resource_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/flows/{}", FLOW_ID)))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .expect(1)
            .mount(&server)
            .await;

        let file = document(json!({"id": FLOW_ID, "name": "etl", "tags": []}));
        let uri = server.uri();
        let cli = cli(&["read", "flow", "--state", file.path().to_str().unwrap(), "--endpoint", &uri]);
        assert!(run_command(&cli).await.unwrap());
    }

    #[tokio::test]
    async fn test_schema_errors_fail_without_network() {
        let file = document(json!({"name": "etl", "color": "blue"}));
        let cli = cli(&[
            "create",
            "flow",
            "--file",
            file.path().to_str().unwrap(),
            "--endpoint",
            "http://127.0.0.1:9",
        ]);
        assert!(!run_command(&cli).await.unwrap());
    }

    #[tokio::test]
    async fn test_invalid_provider_settings_fail_configuration() {
        let cli = cli(&[
            "import",
            "flow",
            FLOW_ID,
            "--endpoint",
            "http://127.0.0.1:9",
            "--account-id",
            "not-a-uuid",
        ]);
        assert!(!run_command(&cli).await.unwrap());
    }
}
