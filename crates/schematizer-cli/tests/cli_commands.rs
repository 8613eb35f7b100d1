// crates/schematizer-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests that run the schematizer binary end to end.
// Purpose: Ensure commands emit JSON on stdout and fail closed with stderr errors.
// Dependencies: schematizer binary, serde_json, tempfile
// ============================================================================

//! ## Overview
//! Runs the CLI binary against temporary config files and a `SQLite` store,
//! checking that registrations persist across invocations and that invalid
//! configuration exits non-zero.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn schematizer_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_schematizer"))
}

fn sqlite_config(root: &Path) -> PathBuf {
    let db_path = root.join("data").join("schematizer.db");
    let config = format!(
        "[store]\ntype = \"sqlite\"\npath = \"{}\"\n\n[logging]\nlevel = \"warn\"\n",
        db_path.to_string_lossy().replace('\\', "/")
    );
    let config_path = root.join("schematizer.toml");
    fs::write(&config_path, config).expect("write config");
    config_path
}

fn run(config: &Path, args: &[&str]) -> Output {
    Command::new(schematizer_bin())
        .args(args)
        .arg("--config")
        .arg(config)
        .env_remove("RUST_LOG")
        .env_remove("SCHEMATIZER_CONFIG")
        .output()
        .expect("run schematizer")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout json")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Verifies config validation reports the configured backend.
#[test]
fn config_validate_reports_store() {
    let root = TempDir::new().unwrap();
    let config = sqlite_config(root.path());
    let output = run(&config, &["config", "validate"]);
    let value = stdout_json(&output);
    assert_eq!(value["status"], "valid");
    assert_eq!(value["store"], "sqlite");
}

/// Verifies invalid configuration fails closed with a stderr message.
#[test]
fn config_validate_rejects_unknown_keys() {
    let root = TempDir::new().unwrap();
    let config = root.path().join("schematizer.toml");
    fs::write(&config, "[store]\ntype = \"memory\"\nbogus = 1\n").unwrap();
    let output = run(&config, &["config", "validate"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config parse error"), "{stderr}");
}

/// Verifies the example config is printed and itself validates.
#[test]
fn config_example_round_trips_through_validate() {
    let root = TempDir::new().unwrap();
    let placeholder = sqlite_config(root.path());
    let output = run(&placeholder, &["config", "example"]);
    assert!(output.status.success());
    let example = String::from_utf8(output.stdout).unwrap();
    assert!(example.contains("[store]"));

    let example_path = root.path().join("example.toml");
    fs::write(&example_path, example).unwrap();
    let validated = stdout_json(&run(&example_path, &["config", "validate"]));
    assert_eq!(validated["status"], "valid");
}

/// Verifies registrations persist in `SQLite` across invocations.
#[test]
fn register_persists_across_invocations() {
    let root = TempDir::new().unwrap();
    let config = sqlite_config(root.path());
    let schema_path = root.path().join("users.avsc");
    fs::write(
        &schema_path,
        r#"{"type": "record", "name": "users", "fields": [{"name": "id", "type": "int"}]}"#,
    )
    .unwrap();
    let schema_arg = schema_path.to_string_lossy().to_string();
    let register = [
        "register",
        "--namespace",
        "ns1",
        "--source",
        "users",
        "--owner-email",
        "owner@example.com",
        "--schema-file",
        schema_arg.as_str(),
    ];

    let first = stdout_json(&run(&config, &register));
    let second = stdout_json(&run(&config, &register));
    assert_eq!(first["schema_id"], second["schema_id"]);

    let listed = stdout_json(&run(&config, &["list", "--namespace", "ns1", "--source", "users"]));
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let id = first["schema_id"].as_u64().unwrap().to_string();
    let fetched = stdout_json(&run(&config, &["get", "--schema-id", id.as_str()]));
    assert_eq!(fetched["canonical_document"], first["canonical_document"]);
}

/// Verifies DDL conversion prints the Avro record and bad DDL fails.
#[test]
fn convert_prints_record_and_rejects_bad_ddl() {
    let root = TempDir::new().unwrap();
    let config = sqlite_config(root.path());
    let ddl_path = root.path().join("t.sql");
    fs::write(&ddl_path, "CREATE TABLE t (id INT NOT NULL);\nALTER TABLE t DROP COLUMN missing_col;")
        .unwrap();
    let ddl_arg = ddl_path.to_string_lossy().to_string();
    let output = run(&config, &["convert", "--ddl-file", ddl_arg.as_str()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing_col"));

    fs::write(&ddl_path, "CREATE TABLE t (id INT NOT NULL, name VARCHAR(10));").unwrap();
    let document = stdout_json(&run(
        &config,
        &["convert", "--ddl-file", ddl_arg.as_str(), "--namespace", "ns1"],
    ));
    assert_eq!(document["name"], "t");
    assert_eq!(document["namespace"], "ns1");
    assert_eq!(document["fields"].as_array().unwrap().len(), 2);
}

/// Verifies lookups of absent schemas exit non-zero.
#[test]
fn get_missing_schema_fails() {
    let root = TempDir::new().unwrap();
    let config = sqlite_config(root.path());
    let output = run(&config, &["get", "--schema-id", "7"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not found"));
}
