// crates/schematizer-core/src/lib.rs
// ============================================================================
// Module: Schematizer Core Library
// Description: Public API surface for the Schematizer core.
// Purpose: Expose DDL ingestion, Avro conversion, canonicalization, and the
//          schema repository.
// Dependencies: crate::{avro, convert, core, ddl, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Schematizer turns relational table definitions into Avro record schemas
//! and keeps them in a deduplicated, lineage-tracking registry. The pipeline
//! is DDL parser, table-to-Avro converter, schema canonicalizer, then schema
//! repository. Persistence is reached only through
//! [`interfaces::SchemaStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod avro;
pub mod convert;
pub mod core;
pub mod ddl;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use avro::AvroSchema;
pub use avro::AvroSchemaError;
pub use avro::CanonicalSchema;
pub use avro::canonicalize;
pub use convert::AvroConverter;
pub use convert::ColumnMapping;
pub use convert::convert;
pub use convert::convert_schema;
pub use ddl::ConversionError;
pub use ddl::SchemaKind;
pub use ddl::SqlDialect;
pub use ddl::TableModel;
pub use ddl::parse_table;
pub use interfaces::SchemaStore;
pub use interfaces::StoreError;
pub use runtime::InMemorySchemaStore;
pub use runtime::RegistryError;
pub use runtime::RegistryLimits;
pub use runtime::SchemaRepository;
pub use runtime::SharedSchemaStore;
