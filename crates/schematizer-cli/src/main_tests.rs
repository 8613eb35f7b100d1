// crates/schematizer-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing, bounded reads, and commands.
// Purpose: Ensure CLI commands drive the repository and fail closed on bad input.
// Dependencies: schematizer-cli main helpers, tempfile
// ============================================================================

//! ## Overview
//! Exercises the command functions against an in-memory repository and
//! validates `read_bytes_with_limit` enforces size limits for CLI inputs.

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
use std::num::NonZeroU64;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use schematizer_config::SchematizerConfig;
use serde_json::json;
use tempfile::TempDir;

use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::ConvertCommand;
use super::DialectArg;
use super::ReadLimitError;
use super::RegisterCommand;
use super::RegisterDdlCommand;
use super::Repository;
use super::SchemaIdCommand;
use super::SetOwnerCommand;
use super::SourceArgs;
use super::command_convert;
use super::command_get;
use super::command_lineage;
use super::command_list;
use super::command_register;
use super::command_register_ddl;
use super::command_set_owner;
use super::open_repository;
use super::read_bytes_with_limit;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const USERS_SCHEMA: &str = r#"{"type":"record","name":"users","fields":[{"name":"id","type":"int"}]}"#;

const USERS_DDL: &str = "CREATE TABLE users (id INT NOT NULL, name VARCHAR(10));\n\
                         ALTER TABLE users ADD COLUMN age INT;";

fn memory_repository() -> Repository {
    open_repository(&SchematizerConfig::default()).expect("open memory repository")
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write input");
    path
}

fn target() -> SourceArgs {
    SourceArgs {
        namespace: "ns1".to_string(),
        source: "users".to_string(),
    }
}

fn register_command(path: &Path, base: Option<u64>) -> RegisterCommand {
    RegisterCommand {
        target: target(),
        owner_email: "owner@example.com".to_string(),
        base_schema_id: base.and_then(NonZeroU64::new),
        schema_file: path.to_path_buf(),
    }
}

fn schema_id(value: &serde_json::Value) -> u64 {
    value["schema_id"].as_u64().expect("schema_id")
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn read_bytes_with_limit_rejects_oversized_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "big.json", "0123456789");
    match read_bytes_with_limit(&path, 4) {
        Err(ReadLimitError::TooLarge {
            size,
            limit,
        }) => {
            assert_eq!(size, 10);
            assert_eq!(limit, 4);
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[test]
fn read_bytes_with_limit_accepts_exact_limit() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "exact.json", "0123");
    let bytes = read_bytes_with_limit(&path, 4).unwrap();
    assert_eq!(bytes, b"0123");
}

#[test]
fn read_bytes_with_limit_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = read_bytes_with_limit(&dir.path().join("absent.json"), 16);
    assert!(matches!(result, Err(ReadLimitError::Io(_))));
}

#[test]
fn cli_parses_register_ddl_with_global_config() {
    let cli = Cli::try_parse_from([
        "schematizer",
        "register-ddl",
        "--namespace",
        "ns1",
        "--source",
        "users",
        "--owner-email",
        "owner@example.com",
        "--ddl-file",
        "users.sql",
        "--config",
        "custom.toml",
    ])
    .unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    let Commands::RegisterDdl(command) = cli.command else {
        panic!("expected register-ddl");
    };
    assert_eq!(command.target.namespace, "ns1");
    assert_eq!(command.dialect, DialectArg::Mysql);
    assert!(command.base_schema_id.is_none());
}

#[test]
fn cli_rejects_zero_schema_id() {
    assert!(Cli::try_parse_from(["schematizer", "get", "--schema-id", "0"]).is_err());
}

#[test]
fn cli_parses_config_subcommands() {
    let cli = Cli::try_parse_from(["schematizer", "config", "validate"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommand::Validate
        }
    ));
}

#[test]
fn register_is_idempotent_and_get_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "users.avsc", USERS_SCHEMA);
    let repository = memory_repository();

    let first = command_register(&repository, &register_command(&path, None)).unwrap();
    let second = command_register(&repository, &register_command(&path, None)).unwrap();
    assert_eq!(first, second);

    let fetched = command_get(
        &repository,
        &SchemaIdCommand {
            schema_id: NonZeroU64::new(schema_id(&first)).unwrap(),
        },
    )
    .unwrap();
    assert_eq!(fetched, first);
    assert_eq!(
        fetched["canonical_document"],
        json!(r#"{"fields":[{"name":"id","type":"int"}],"name":"users","type":"record"}"#)
    );
}

#[test]
fn register_rejects_oversized_schema_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "huge.avsc", &" ".repeat(2 * 1024 * 1024));
    let err = command_register(&memory_repository(), &register_command(&path, None)).unwrap_err();
    assert!(err.to_string().contains("byte limit"), "{err}");
}

#[test]
fn register_ddl_lineage_and_list_follow_registrations() {
    let dir = TempDir::new().unwrap();
    let ddl = write_file(&dir, "users.sql", USERS_DDL);
    let repository = memory_repository();

    let from_ddl = command_register_ddl(
        &repository,
        &RegisterDdlCommand {
            target: target(),
            owner_email: "owner@example.com".to_string(),
            base_schema_id: None,
            ddl_file: ddl,
            dialect: DialectArg::Mysql,
        },
    )
    .unwrap();
    assert!(from_ddl["base_schema_id"].is_null());

    let avsc = write_file(&dir, "users.avsc", USERS_SCHEMA);
    let second = command_register(&repository, &register_command(&avsc, None)).unwrap();
    assert_eq!(second["base_schema_id"], from_ddl["schema_id"]);

    let chain = command_lineage(
        &repository,
        &SchemaIdCommand {
            schema_id: NonZeroU64::new(schema_id(&second)).unwrap(),
        },
    )
    .unwrap();
    let ids: Vec<u64> = chain.as_array().unwrap().iter().map(schema_id).collect();
    assert_eq!(ids, vec![schema_id(&second), schema_id(&from_ddl)]);

    let listed = command_list(&repository, &target()).unwrap();
    assert_eq!(listed.as_array().unwrap().len(), 2);
}

#[test]
fn register_with_foreign_base_fails() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "users.avsc", USERS_SCHEMA);
    let repository = memory_repository();
    let err = command_register(&repository, &register_command(&path, Some(42))).unwrap_err();
    assert!(err.to_string().contains("invalid base schema"), "{err}");
}

#[test]
fn convert_emits_avro_record() {
    let dir = TempDir::new().unwrap();
    let ddl = write_file(&dir, "users.sql", USERS_DDL);
    let document = command_convert(
        &SchematizerConfig::default(),
        &ConvertCommand {
            ddl_file: ddl,
            namespace: None,
            dialect: DialectArg::Mysql,
        },
    )
    .unwrap();
    assert_eq!(document["type"], json!("record"));
    assert_eq!(document["name"], json!("users"));
    let names: Vec<&str> = document["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|field| field["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["id", "name", "age"]);
}

#[test]
fn convert_rejects_empty_script() {
    let dir = TempDir::new().unwrap();
    let ddl = write_file(&dir, "empty.sql", "  -- nothing here\n");
    let err = command_convert(
        &SchematizerConfig::default(),
        &ConvertCommand {
            ddl_file: ddl,
            namespace: None,
            dialect: DialectArg::Mysql,
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("no statements"), "{err}");
}

#[test]
fn set_owner_updates_existing_source_only() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "users.avsc", USERS_SCHEMA);
    let repository = memory_repository();
    command_register(&repository, &register_command(&path, None)).unwrap();

    let updated = command_set_owner(
        &repository,
        &SetOwnerCommand {
            target: target(),
            owner_email: "new-owner@example.com".to_string(),
        },
    )
    .unwrap();
    assert_eq!(updated["source_owner_email"], json!("new-owner@example.com"));

    let missing = command_set_owner(
        &repository,
        &SetOwnerCommand {
            target: SourceArgs {
                namespace: "ns1".to_string(),
                source: "orders".to_string(),
            },
            owner_email: "owner@example.com".to_string(),
        },
    );
    assert!(missing.is_err());
}
