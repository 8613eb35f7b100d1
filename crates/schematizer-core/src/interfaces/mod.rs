// crates/schematizer-core/src/interfaces/mod.rs
// ============================================================================
// Module: Schematizer Interfaces
// Description: Backend-agnostic persistence contract for schema records.
// Purpose: Define the store surface used by the schema repository.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The repository never talks to a database directly; it drives a
//! [`SchemaStore`]. A store must make [`SchemaStore::find_or_create_schema`]
//! atomic: the namespace upsert, source upsert, dedup lookup, base
//! resolution, and insert happen in one transaction, so concurrent identical
//! registrations create at most one row. Identifiers are monotonic and
//! timestamps are assigned by the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::NamespaceRecord;
use crate::core::NewSchema;
use crate::core::Registration;
use crate::core::SchemaId;
use crate::core::SchemaRecord;
use crate::core::SourceId;
use crate::core::SourceRecord;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Schema store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("schema store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("schema store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("schema store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("schema store invalid data: {0}")]
    Invalid(String),
    /// Requested lineage base is absent or belongs to another source.
    #[error("invalid base schema: {0}")]
    InvalidBase(String),
    /// A uniqueness constraint raced with a concurrent writer.
    #[error("schema store conflict: {0}")]
    Conflict(String),
    /// Store reported an error.
    #[error("schema store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Schema Store
// ============================================================================

/// Persistence collaborator for namespaces, sources, and schemas.
pub trait SchemaStore {
    /// Atomically finds an equivalent schema for the source or creates one.
    ///
    /// Creates the namespace and source when absent; the owner email is only
    /// applied to a newly created source. An equivalent schema matches on
    /// digest and canonical text. A new schema links to the requested base.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidBase`] when an explicit base is absent or
    /// belongs to another source, [`StoreError::Conflict`] on a uniqueness
    /// race, and other [`StoreError`] variants on storage failure.
    fn find_or_create_schema(&self, request: &NewSchema) -> Result<Registration, StoreError>;

    /// Loads a schema by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_schema(&self, schema_id: SchemaId) -> Result<Option<SchemaRecord>, StoreError>;

    /// Loads a namespace by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_namespace(&self, name: &str) -> Result<Option<NamespaceRecord>, StoreError>;

    /// Loads a source by namespace name and source name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get_source(&self, namespace: &str, source: &str)
    -> Result<Option<SourceRecord>, StoreError>;

    /// Lists a source's schemas in ascending identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn list_schemas(&self, source_id: SourceId) -> Result<Vec<SchemaRecord>, StoreError>;

    /// Returns the source's most recently created schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn latest_schema(&self, source_id: SourceId) -> Result<Option<SchemaRecord>, StoreError>;

    /// Replaces a source's owner email, returning the updated record.
    ///
    /// Returns `Ok(None)` when the source does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update_source_owner(
        &self,
        namespace: &str,
        source: &str,
        owner_email: &str,
    ) -> Result<Option<SourceRecord>, StoreError>;

    /// Reports store readiness.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
