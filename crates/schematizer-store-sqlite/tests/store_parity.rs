// crates/schematizer-store-sqlite/tests/store_parity.rs
// ============================================================================
// Module: SQLite Store Parity Tests
// Description: Property tests comparing the SQLite and in-memory stores.
// Purpose: Ensure both backends assign identical ids, bases, and dedup results.
// Dependencies: schematizer-core, schematizer-store-sqlite, proptest, tempfile
// ============================================================================

//! ## Overview
//! Replays random registration sequences against both backends and requires
//! the returned records to agree field by field, timestamps aside.

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
    reason = "Test-only assertions and helpers are permitted."
)]

use proptest::prelude::*;
use schematizer_core::AvroConverter;
use schematizer_core::InMemorySchemaStore;
use schematizer_core::RegisterSchemaRequest;
use schematizer_core::RegistryLimits;
use schematizer_core::SchemaRepository;
use schematizer_store_sqlite::SqliteSchemaStore;
use schematizer_store_sqlite::SqliteStoreConfig;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

const SCHEMAS: [&str; 3] = [
    r#"{"type":"record","name":"users","fields":[{"name":"id","type":"int"}]}"#,
    r#"{"fields":[{"type":"int","name":"id"}],"name":"users","type":"record"}"#,
    r#"{"type":"record","name":"users","fields":[{"name":"id","type":"long"}]}"#,
];

const SOURCES: [&str; 2] = ["users", "accounts"];

fn request(schema: usize, source: usize) -> RegisterSchemaRequest {
    RegisterSchemaRequest {
        schema: SCHEMAS[schema].to_string(),
        namespace: "ns1".to_string(),
        source: SOURCES[source].to_string(),
        source_owner_email: "owner@example.com".to_string(),
        base_schema_id: None,
    }
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn sqlite_and_memory_stores_agree(
        steps in prop::collection::vec((0 .. SCHEMAS.len(), 0 .. SOURCES.len()), 1 .. 10)
    ) {
        let temp = TempDir::new().unwrap();
        let sqlite = SchemaRepository::new(
            SqliteSchemaStore::new(SqliteStoreConfig::new(temp.path().join("parity.db"))).unwrap(),
            AvroConverter::default(),
            RegistryLimits::default(),
        );
        let memory = SchemaRepository::new(
            InMemorySchemaStore::new(),
            AvroConverter::default(),
            RegistryLimits::default(),
        );

        for (schema, source) in steps {
            let durable = sqlite.register(&request(schema, source)).unwrap();
            let volatile = memory.register(&request(schema, source)).unwrap();
            prop_assert_eq!(durable.schema_id, volatile.schema_id);
            prop_assert_eq!(durable.base_schema_id, volatile.base_schema_id);
            prop_assert_eq!(durable.source_id, volatile.source_id);
            prop_assert_eq!(&durable.canonical_document, &volatile.canonical_document);
        }

        for source in SOURCES {
            let durable = sqlite.list_schemas("ns1", source).map(|rows| rows.len()).unwrap_or(0);
            let volatile = memory.list_schemas("ns1", source).map(|rows| rows.len()).unwrap_or(0);
            prop_assert_eq!(durable, volatile);
            prop_assert!(durable <= 2);
        }
    }
}
