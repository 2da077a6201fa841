//! Integration tests for CLI functionality

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

/// Build a command for the compiled binary with no PREFECT_* settings leaking in
fn provider_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("terraform-provider-prefect"));
    for var in [
        "PREFECT_API_URL",
        "PREFECT_API_KEY",
        "PREFECT_BASIC_AUTH_KEY",
        "PREFECT_CLOUD_ACCOUNT_ID",
        "PREFECT_CLOUD_WORKSPACE_ID",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn json_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_help_flag() {
    provider_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("resources and data sources"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn test_version_flag() {
    provider_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("terraform-provider-prefect"));
}

#[test]
fn test_list_types() {
    provider_cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("prefect_deployment"))
        .stdout(predicate::str::contains("prefect_worker_metadata"));
}

#[test]
fn test_schema_deployment() {
    provider_cmd()
        .args(["schema", "prefect_deployment"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pull_steps"))
        .stdout(predicate::str::contains("requires_replace"));
}

#[test]
fn test_schema_provider_yaml() {
    provider_cmd()
        .args(["schema", "--kind", "provider", "-o", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("basic_auth_key:"));
}

#[test]
fn test_schema_unknown_type() {
    provider_cmd()
        .args(["schema", "prefect_block"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown resource type \"prefect_block\""));
}

#[test]
fn test_invalid_output_format() {
    provider_cmd()
        .args(["list", "-o", "table"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'table'"));
}

#[test]
fn test_import_rejects_malformed_identifier() {
    provider_cmd()
        .args(["import", "deployment", "a,b,c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unexpected Import Identifier"));
}

#[test]
fn test_create_rejects_unknown_attribute() {
    let file = json_file(r#"{"name": "etl", "colour": "blue"}"#);
    provider_cmd()
        .args(["create", "flow", "--file"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported argument"))
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_create_reports_invalid_pull_step() {
    let file = json_file(
        r#"{
            "name": "nightly",
            "flow_id": "3c8f5c2e-2a47-4a7e-9d55-0f3f8f1b6a10",
            "pull_steps": [{"type": "git_clone", "bucket": "artifacts"}]
        }"#,
    );
    provider_cmd()
        .args(["create", "deployment", "--file"])
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("pull_steps"));
}

#[test]
fn test_missing_model_file() {
    provider_cmd()
        .args(["create", "flow", "--file", "/nonexistent/flow.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn test_conflicting_credentials() {
    provider_cmd()
        .args(["data", "worker_metadata", "--api-key", "pnu_key", "--basic-auth-key", "admin:pass"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Conflicting Prefect credentials"));
}

#[test]
fn test_cloud_endpoint_requires_api_key() {
    provider_cmd()
        .args(["data", "work_pools", "--endpoint", "https://api.prefect.cloud"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing Prefect API Key"))
        .stderr(predicate::str::contains("Missing Prefect Cloud Account ID"));
}
