// crates/schematizer-core/src/core/records.rs
// ============================================================================
// Module: Schematizer Registry Records
// Description: Persisted namespace, source, and schema records.
// Purpose: Provide shared types for schema repositories and stores.
// Dependencies: crate::core::{identifiers, time, hashing}, serde
// ============================================================================

//! ## Overview
//! Namespaces own sources; sources own an immutable, linearly linked chain of
//! schemas. Records here are what stores return; [`NewSchema`] is what the
//! repository hands to a store for an atomic find-or-create.

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::NamespaceId;
use crate::core::identifiers::SchemaId;
use crate::core::identifiers::SourceId;
use crate::core::time::Timestamp;

/// Namespace record grouping related sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRecord {
    /// Namespace identifier.
    pub namespace_id: NamespaceId,
    /// Unique namespace name.
    pub name: String,
    /// Store-assigned creation time.
    pub created_at: Timestamp,
    /// Store-assigned last update time.
    pub updated_at: Timestamp,
}

/// Source record: a concrete origin of data within a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Source identifier.
    pub source_id: SourceId,
    /// Source name, unique within its namespace.
    pub name: String,
    /// Contact email of the source owner.
    pub source_owner_email: String,
    /// Owning namespace identifier.
    pub namespace_id: NamespaceId,
    /// Store-assigned creation time.
    pub created_at: Timestamp,
    /// Store-assigned last update time.
    pub updated_at: Timestamp,
}

/// Immutable, versioned Avro schema belonging to one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRecord {
    /// Schema identifier.
    pub schema_id: SchemaId,
    /// Canonical Avro document text.
    pub canonical_document: String,
    /// Owning namespace identifier.
    pub namespace_id: NamespaceId,
    /// Owning source identifier.
    pub source_id: SourceId,
    /// Schema this version was derived from; `None` for the lineage root.
    pub base_schema_id: Option<SchemaId>,
    /// Store-assigned creation time.
    pub created_at: Timestamp,
    /// Store-assigned last update time.
    pub updated_at: Timestamp,
}

/// How a newly created schema picks its lineage predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseSchema {
    /// Link to the source's latest schema (root if the source has none).
    Latest,
    /// Link to an explicit schema, which must belong to the same source.
    Explicit(SchemaId),
}

/// Find-or-create request handed to a schema store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchema {
    /// Namespace name (created when absent).
    pub namespace: String,
    /// Source name (created when absent).
    pub source: String,
    /// Owner email applied only when the source is created.
    pub source_owner_email: String,
    /// Canonical Avro document text.
    pub canonical_document: String,
    /// Digest of the canonical text.
    pub digest: HashDigest,
    /// Lineage selection for a newly created schema.
    pub base: BaseSchema,
}

/// Outcome of a find-or-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// The existing or newly created schema.
    pub schema: SchemaRecord,
    /// True when this call created the schema row.
    pub created: bool,
}
