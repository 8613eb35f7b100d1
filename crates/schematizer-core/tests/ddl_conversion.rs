// crates/schematizer-core/tests/ddl_conversion.rs
// ============================================================================
// Module: DDL Conversion Tests
// Description: End-to-end tests from DDL statements to Avro documents.
// Purpose: Validate statement folding, conversion output, and determinism.
// Dependencies: schematizer-core, serde_json
// ============================================================================
//! ## Overview
//! Drives the parser and converter together through the public API and
//! checks field order, nullability, and failure kinds.

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

use schematizer_core::AvroSchema;
use schematizer_core::ConversionError;
use schematizer_core::SchemaKind;
use schematizer_core::SqlDialect;
use schematizer_core::convert;
use schematizer_core::convert_schema;
use schematizer_core::ddl::split_statements;
use schematizer_core::parse_table;
use serde_json::json;

#[test]
fn create_then_add_column_converts_in_order() {
    let statements =
        ["CREATE TABLE t (id INT NOT NULL, name VARCHAR(10))", "ALTER TABLE t ADD COLUMN age INT"];
    let table = parse_table(&statements, SqlDialect::MySql).expect("parse");
    let names: Vec<&str> = table.columns.iter().map(|column| column.name.as_str()).collect();
    assert_eq!(names, ["id", "name", "age"]);
    assert!(!table.columns[0].nullable);
    assert!(table.columns[1].nullable);
    assert!(table.columns[2].nullable);

    let document = convert(&statements, SqlDialect::MySql, None).expect("convert");
    assert_eq!(
        document,
        json!({
            "type": "record",
            "name": "t",
            "fields": [
                {"name": "id", "type": "int"},
                {"name": "name", "type": ["null", {"type": "string", "maxlen": 10}], "default": null},
                {"name": "age", "type": ["null", "int"], "default": null},
            ],
        })
    );
}

#[test]
fn dropping_missing_column_is_semantic_conflict() {
    let statements = ["CREATE TABLE t (id INT)", "ALTER TABLE t DROP COLUMN missing_col"];
    let err = parse_table(&statements, SqlDialect::MySql).unwrap_err();
    assert!(matches!(err, ConversionError::SemanticConflict(_)), "unexpected error: {err}");
}

#[test]
fn conversion_is_deterministic() {
    let statements = [
        "CREATE TABLE `orders` (`id` BIGINT UNSIGNED NOT NULL AUTO_INCREMENT, \
         `total` DECIMAL(10,2) NOT NULL DEFAULT '0.00', `placed_at` DATETIME, \
         PRIMARY KEY (`id`)) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
        "ALTER TABLE orders ADD COLUMN note TEXT AFTER id, MODIFY total DECIMAL(12,2) NOT NULL",
    ];
    let first = convert(&statements, SqlDialect::MySql, Some("shop")).expect("first");
    let second = convert(&statements, SqlDialect::MySql, Some("shop")).expect("second");
    assert_eq!(first.to_string(), second.to_string());
    let fields: Vec<&str> = first["fields"]
        .as_array()
        .expect("fields")
        .iter()
        .map(|field| field["name"].as_str().expect("name"))
        .collect();
    assert_eq!(fields, ["id", "note", "total", "placed_at"]);
    assert_eq!(first["fields"][2]["type"]["precision"], json!(12));
    AvroSchema::parse(first).expect("converted output is valid avro");
}

#[test]
fn statement_order_is_significant() {
    let add_then_drop = [
        "CREATE TABLE t (id INT)",
        "ALTER TABLE t ADD COLUMN extra INT",
        "ALTER TABLE t DROP COLUMN extra",
    ];
    let drop_then_add = [
        "CREATE TABLE t (id INT)",
        "ALTER TABLE t DROP COLUMN extra",
        "ALTER TABLE t ADD COLUMN extra INT",
    ];
    let table = parse_table(&add_then_drop, SqlDialect::MySql).expect("parse");
    assert_eq!(table.columns.len(), 1);
    assert!(parse_table(&drop_then_add, SqlDialect::MySql).is_err());
}

#[test]
fn last_alteration_of_a_column_wins() {
    let statements = [
        "CREATE TABLE t (a INT)",
        "ALTER TABLE t MODIFY a BIGINT NOT NULL",
        "ALTER TABLE t CHANGE a b VARCHAR(5)",
    ];
    let document = convert(&statements, SqlDialect::MySql, None).expect("convert");
    assert_eq!(
        document["fields"],
        json!([{"name": "b", "type": ["null", {"type": "string", "maxlen": 5}], "default": null}])
    );
}

#[test]
fn script_splitting_feeds_the_parser() {
    let script = "CREATE TABLE t (id INT NOT NULL);\nALTER TABLE t ADD name VARCHAR(3);";
    let statements = split_statements(script, SqlDialect::MySql).expect("split");
    assert_eq!(statements.len(), 2);
    let table = parse_table(&statements, SqlDialect::MySql).expect("parse");
    assert_eq!(table.columns.len(), 2);
}

#[test]
fn malformed_and_unsupported_inputs_fail_distinctly() {
    let err = parse_table(&["CREATE TABLE t (id INT"], SqlDialect::MySql).unwrap_err();
    assert!(matches!(err, ConversionError::MalformedStatement { .. }));

    let err = parse_table(&["ALTER TABLE t ADD COLUMN id INT"], SqlDialect::MySql).unwrap_err();
    assert!(matches!(err, ConversionError::SemanticConflict(_)));

    let err = convert(&["CREATE TABLE t (tags SET('a','b'))"], SqlDialect::MySql, None)
        .unwrap_err();
    assert!(matches!(err, ConversionError::UnsupportedType(_)));

    let err =
        convert_schema(SchemaKind::Avro, SchemaKind::MySql, &["CREATE TABLE t (id INT)"], None)
            .unwrap_err();
    assert_eq!(
        err,
        ConversionError::UnsupportedConversion {
            from: SchemaKind::Avro,
            to: SchemaKind::MySql,
        }
    );
}
