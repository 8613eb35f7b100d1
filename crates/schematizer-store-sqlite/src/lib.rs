// crates/schematizer-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Schema Store
// Description: Durable SchemaStore backend using SQLite.
// Purpose: Provide persistent, deduplicated schema storage for Schematizer.
// Dependencies: schematizer-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`SchemaStore`] implementation that
//! persists namespaces, sources, and immutable schema rows with lineage
//! pointers. Registration is transactional and safe to share between threads
//! and between processes using the same database file.
//!
//! [`SchemaStore`]: schematizer_core::SchemaStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::SqliteSchemaStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
