// crates/schematizer-core/src/runtime/mod.rs
// ============================================================================
// Module: Schematizer Runtime
// Description: Schema repository and in-process store implementations.
// Purpose: Register, deduplicate, and trace schemas over a schema store.
// Dependencies: crate::{avro, convert, core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules own the write path. Every surface (CLI, embedding code)
//! registers through [`SchemaRepository`] so validation, canonicalization,
//! and lineage rules are applied identically.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod registry;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use registry::DEFAULT_MAX_SCHEMA_BYTES;
pub use registry::RegistryError;
pub use registry::RegistryLimits;
pub use registry::SchemaRepository;
pub use store::InMemorySchemaStore;
pub use store::SharedSchemaStore;
