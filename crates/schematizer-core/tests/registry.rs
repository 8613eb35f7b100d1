// crates/schematizer-core/tests/registry.rs
// ============================================================================
// Module: Schema Repository Tests
// Description: Registration, deduplication, and lineage over the memory store.
// Purpose: Validate idempotent registration and write-time lineage rules.
// Dependencies: schematizer-core
// ============================================================================
//! ## Overview
//! Exercises [`SchemaRepository`] against [`InMemorySchemaStore`], including
//! concurrent identical registrations from multiple threads.

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

use std::sync::Arc;
use std::sync::Barrier;
use std::thread;

use schematizer_core::AvroConverter;
use schematizer_core::InMemorySchemaStore;
use schematizer_core::RegisterSchemaFromDdlRequest;
use schematizer_core::RegisterSchemaRequest;
use schematizer_core::RegistryError;
use schematizer_core::RegistryLimits;
use schematizer_core::SchemaId;
use schematizer_core::SchemaRepository;
use schematizer_core::SchemaStore;
use schematizer_core::SqlDialect;
use schematizer_core::UpdateSourceOwnerRequest;

const USERS_V1: &str = r#"{"type":"record","name":"users","fields":[{"name":"id","type":"int"}]}"#;
const USERS_V2: &str = r#"{"type":"record","name":"users","fields":[{"name":"id","type":"long"}]}"#;
const USERS_V3: &str = r#"{"type":"record","name":"users","fields":[{"name":"id","type":"string"}]}"#;

fn repository() -> SchemaRepository<InMemorySchemaStore> {
    SchemaRepository::new(
        InMemorySchemaStore::new(),
        AvroConverter::default(),
        RegistryLimits::default(),
    )
}

fn request(schema: &str, source: &str) -> RegisterSchemaRequest {
    RegisterSchemaRequest {
        schema: schema.to_string(),
        namespace: "ns1".to_string(),
        source: source.to_string(),
        source_owner_email: "owner@example.com".to_string(),
        base_schema_id: None,
    }
}

#[test]
fn identical_registration_is_idempotent() {
    let repo = repository();
    let first = repo.register(&request(USERS_V1, "users")).expect("first");
    let second = repo.register(&request(USERS_V1, "users")).expect("second");
    assert_eq!(first.schema_id, second.schema_id);
    assert_eq!(first, second);
    assert_eq!(repo.list_schemas("ns1", "users").expect("list").len(), 1);
}

#[test]
fn equivalent_spelling_deduplicates() {
    let repo = repository();
    let first = repo.register(&request(USERS_V1, "users")).expect("first");
    let reformatted = r#"{
        "fields": [ {"type": {"type": "int"}, "name": "id"} ],
        "name": "users",
        "type": "record"
    }"#;
    let second = repo.register(&request(reformatted, "users")).expect("second");
    assert_eq!(first.schema_id, second.schema_id);
}

#[test]
fn same_schema_under_another_source_is_a_new_row() {
    let repo = repository();
    let users = repo.register(&request(USERS_V1, "users")).expect("users");
    let accounts = repo.register(&request(USERS_V1, "accounts")).expect("accounts");
    assert_ne!(users.schema_id, accounts.schema_id);
    assert_ne!(users.source_id, accounts.source_id);
    assert_eq!(users.namespace_id, accounts.namespace_id);
    assert_eq!(accounts.base_schema_id, None);
}

#[test]
fn lineage_defaults_to_latest_schema() {
    let repo = repository();
    let v1 = repo.register(&request(USERS_V1, "users")).expect("v1");
    let v2 = repo.register(&request(USERS_V2, "users")).expect("v2");
    let v3 = repo.register(&request(USERS_V3, "users")).expect("v3");
    assert_eq!(v1.base_schema_id, None);
    assert_eq!(v2.base_schema_id, Some(v1.schema_id));
    assert_eq!(v3.base_schema_id, Some(v2.schema_id));

    let lineage: Vec<SchemaId> =
        repo.lineage(v3.schema_id).expect("lineage").iter().map(|s| s.schema_id).collect();
    assert_eq!(lineage, [v3.schema_id, v2.schema_id, v1.schema_id]);
    assert_eq!(repo.latest_schema("ns1", "users").expect("latest").schema_id, v3.schema_id);

    // Re-registering an older schema returns it without moving lineage.
    let again = repo.register(&request(USERS_V1, "users")).expect("again");
    assert_eq!(again.schema_id, v1.schema_id);
    assert_eq!(repo.latest_schema("ns1", "users").expect("latest").schema_id, v3.schema_id);
}

#[test]
fn explicit_base_must_belong_to_the_source() {
    let repo = repository();
    let v1 = repo.register(&request(USERS_V1, "users")).expect("v1");
    let v2 = repo.register(&request(USERS_V2, "users")).expect("v2");
    let other = repo.register(&request(USERS_V1, "accounts")).expect("other");

    let mut branch = request(USERS_V3, "users");
    branch.base_schema_id = Some(v1.schema_id);
    let v3 = repo.register(&branch).expect("branch");
    assert_eq!(v3.base_schema_id, Some(v1.schema_id));
    assert_ne!(v3.base_schema_id, Some(v2.schema_id));

    let mut foreign = request(r#""string""#, "users");
    foreign.base_schema_id = Some(other.schema_id);
    let err = repo.register(&foreign).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidBaseSchema(_)), "{err}");

    let mut missing = request(r#""string""#, "fresh");
    missing.base_schema_id = SchemaId::from_raw(999);
    let err = repo.register(&missing).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidBaseSchema(_)), "{err}");
    // A rejected registration leaves no namespace or source behind.
    assert!(matches!(repo.get_source("ns1", "fresh"), Err(RegistryError::NotFound(_))));
}

#[test]
fn invalid_inputs_are_rejected_before_storage() {
    let repo = repository();
    let err = repo.register(&request(r#"{"type":"record","name":"r"}"#, "users")).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidSchema(_)));
    assert!(err.is_input_error());

    let mut bad_email = request(USERS_V1, "users");
    bad_email.source_owner_email = "nobody".to_string();
    let err = repo.register(&bad_email).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidRequest(_)));

    let tiny = SchemaRepository::new(
        InMemorySchemaStore::new(),
        AvroConverter::default(),
        RegistryLimits {
            max_schema_bytes: 8,
        },
    );
    let err = tiny.register(&request(USERS_V1, "users")).unwrap_err();
    assert!(matches!(err, RegistryError::InvalidSchema(_)));
    assert!(matches!(repo.get_namespace("ns1"), Err(RegistryError::NotFound(_))));
}

#[test]
fn ddl_registration_converts_and_deduplicates() {
    let repo = repository();
    let ddl = RegisterSchemaFromDdlRequest {
        ddl_statements: vec![
            "CREATE TABLE users (id INT NOT NULL, name VARCHAR(10))".to_string(),
            "ALTER TABLE users ADD COLUMN age INT".to_string(),
        ],
        dialect: SqlDialect::MySql,
        namespace: "ns1".to_string(),
        source: "users".to_string(),
        source_owner_email: "owner@example.com".to_string(),
        base_schema_id: None,
    };
    let first = repo.register_from_ddl(&ddl).expect("first");
    let second = repo.register_from_ddl(&ddl).expect("second");
    assert_eq!(first.schema_id, second.schema_id);
    assert!(first.canonical_document.contains(r#""name":"ns1.users""#));

    let mut broken = ddl.clone();
    broken.ddl_statements.push("ALTER TABLE users DROP COLUMN missing_col".to_string());
    let err = repo.register_from_ddl(&broken).unwrap_err();
    assert!(matches!(err, RegistryError::Conversion(_)));
    assert_eq!(repo.list_schemas("ns1", "users").expect("list").len(), 1);
}

#[test]
fn owner_is_set_on_creation_and_updated_explicitly() {
    let repo = repository();
    repo.register(&request(USERS_V1, "users")).expect("v1");
    let mut later = request(USERS_V2, "users");
    later.source_owner_email = "someone-else@example.com".to_string();
    repo.register(&later).expect("v2");
    let source = repo.get_source("ns1", "users").expect("source");
    assert_eq!(source.source_owner_email, "owner@example.com");

    let update = UpdateSourceOwnerRequest {
        namespace: "ns1".to_string(),
        source: "users".to_string(),
        source_owner_email: "new-owner@example.com".to_string(),
    };
    let updated = repo.update_source_owner(&update).expect("update");
    assert_eq!(updated.source_owner_email, "new-owner@example.com");
    assert_eq!(updated.source_id, source.source_id);

    let mut unknown = update;
    unknown.source = "ghost".to_string();
    assert!(matches!(repo.update_source_owner(&unknown), Err(RegistryError::NotFound(_))));
}

#[test]
fn concurrent_identical_registrations_create_one_row() {
    const WORKERS: usize = 8;
    let repo = Arc::new(repository());
    let barrier = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = (0 .. WORKERS)
        .map(|_| {
            let repo = Arc::clone(&repo);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                repo.register(&request(USERS_V1, "users")).expect("register")
            })
        })
        .collect();
    let ids: Vec<SchemaId> =
        handles.into_iter().map(|handle| handle.join().expect("join").schema_id).collect();
    assert!(ids.iter().all(|id| *id == ids[0]));
    let source = repo.get_source("ns1", "users").expect("source");
    assert_eq!(repo.store().list_schemas(source.source_id).expect("list").len(), 1);
}

#[test]
fn registering_the_canonical_document_returns_the_same_row() {
    let repo = repository();
    let nested = r#"{"type":"record","name":"Outer","namespace":"com.acme","fields":[
        {"name":"h","type":{"type":"fixed","name":"H","namespace":"","size":4}},
        {"name":"g","type":"H"},
        {"name":"e","type":{"type":"enum","name":"x.y.Kind","symbols":["A","B"]}}]}"#;
    let first = repo.register(&request(nested, "outer")).expect("first");
    let again = repo.register(&request(&first.canonical_document, "outer")).expect("again");
    assert_eq!(again.schema_id, first.schema_id);
    assert_eq!(again.canonical_document, first.canonical_document);
    assert_eq!(repo.list_schemas("ns1", "outer").expect("list").len(), 1);
}

#[test]
fn ddl_documents_are_held_to_the_size_limit() {
    let tiny = SchemaRepository::new(
        InMemorySchemaStore::new(),
        AvroConverter::default(),
        RegistryLimits {
            max_schema_bytes: 32,
        },
    );
    let ddl = RegisterSchemaFromDdlRequest {
        ddl_statements: vec!["CREATE TABLE users (id INT NOT NULL, name VARCHAR(10))".to_string()],
        dialect: SqlDialect::MySql,
        namespace: "ns1".to_string(),
        source: "users".to_string(),
        source_owner_email: "owner@example.com".to_string(),
        base_schema_id: None,
    };
    let err = tiny.register_from_ddl(&ddl).unwrap_err();
    let RegistryError::InvalidSchema(detail) = err else {
        panic!("expected size rejection, got {err:?}");
    };
    assert!(detail.reason.contains("exceeds 32 bytes"), "{}", detail.reason);
    assert!(matches!(tiny.get_namespace("ns1"), Err(RegistryError::NotFound(_))));
}
