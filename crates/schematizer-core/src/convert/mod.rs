// crates/schematizer-core/src/convert/mod.rs
// ============================================================================
// Module: Schema Conversion
// Description: Relational table models to Avro record schemas.
// Purpose: Derive serialization schemas from DDL without hidden state.
// Dependencies: crate::ddl, crate::avro, serde_json, time
// ============================================================================

//! ## Overview
//! Conversion is pure: [`AvroConverter`] owns only its [`ColumnMapping`], and
//! the same statements always yield byte-identical documents. [`convert`]
//! uses the standard MySQL mapping; callers that need a different table build
//! their own converter and inject it.

pub mod avro;
mod defaults;
pub mod mapping;

use serde_json::Value;

pub use self::avro::AvroConverter;
pub use self::avro::sanitize_name;
pub use self::mapping::AvroType;
pub use self::mapping::ColumnMapping;
pub use self::mapping::DefaultEncoding;
pub use self::mapping::LengthAttribute;
pub use self::mapping::LogicalType;
pub use self::mapping::MappingEntry;
use crate::ddl::ConversionError;
use crate::ddl::SchemaKind;
use crate::ddl::SqlDialect;

/// Converts ordered DDL statements into an Avro record document using the
/// standard MySQL mapping.
///
/// # Errors
///
/// Returns [`ConversionError::MalformedStatement`],
/// [`ConversionError::SemanticConflict`], or
/// [`ConversionError::UnsupportedType`].
pub fn convert<S: AsRef<str>>(
    ddl_statements: &[S],
    dialect: SqlDialect,
    namespace: Option<&str>,
) -> Result<Value, ConversionError> {
    AvroConverter::default().convert_statements(ddl_statements, dialect, namespace)
}

/// Dispatches a conversion between schema kinds.
///
/// Only MySQL to Avro is supported.
///
/// # Errors
///
/// Returns [`ConversionError::UnsupportedConversion`] for any other pair, and
/// the errors of [`convert`] otherwise.
pub fn convert_schema<S: AsRef<str>>(
    from: SchemaKind,
    to: SchemaKind,
    ddl_statements: &[S],
    namespace: Option<&str>,
) -> Result<Value, ConversionError> {
    match (from, to) {
        (SchemaKind::MySql, SchemaKind::Avro) => convert(ddl_statements, SqlDialect::MySql, namespace),
        _ => Err(ConversionError::UnsupportedConversion {
            from,
            to,
        }),
    }
}
