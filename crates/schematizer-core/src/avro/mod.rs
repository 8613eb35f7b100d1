// crates/schematizer-core/src/avro/mod.rs
// ============================================================================
// Module: Avro Schemas
// Description: Avro grammar validation and canonical form.
// Purpose: Gate every stored schema through one validator and one normalizer.
// Dependencies: serde_json, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! [`AvroSchema`] is a document that passed grammar validation.
//! [`canonicalize`] turns it into the text and digest used for identity:
//! equal canonical text means the same schema.

pub mod canonical;
pub mod schema;

pub use canonical::CanonicalSchema;
pub use canonical::canonicalize;
pub use schema::AvroSchema;
pub use schema::AvroSchemaError;
pub use schema::PRIMITIVE_TYPES;
pub use schema::is_primitive;
pub use schema::is_valid_name;
pub use schema::is_valid_namespace;
