// crates/schematizer-core/src/core/mod.rs
// ============================================================================
// Module: Schematizer Core Types
// Description: Identifiers, records, requests, and canonical hashing.
// Purpose: Provide stable, serializable types shared by repositories and stores.
// Dependencies: serde, serde_jcs, sha2, time
// ============================================================================

//! ## Overview
//! Core types are the canonical source of truth for any derived surface (CLI,
//! store schemas). They carry no behavior beyond validation and encoding.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod hashing;
pub mod identifiers;
pub mod records;
pub mod requests;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use hashing::DEFAULT_HASH_ALGORITHM;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use identifiers::NamespaceId;
pub use identifiers::SchemaId;
pub use identifiers::SourceId;
pub use records::BaseSchema;
pub use records::NamespaceRecord;
pub use records::NewSchema;
pub use records::Registration;
pub use records::SchemaRecord;
pub use records::SourceRecord;
pub use requests::RegisterSchemaFromDdlRequest;
pub use requests::RegisterSchemaRequest;
pub use requests::RequestError;
pub use requests::UpdateSourceOwnerRequest;
pub use time::Timestamp;
