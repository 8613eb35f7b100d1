// crates/schematizer-core/src/ddl/mod.rs
// ============================================================================
// Module: DDL Ingestion
// Description: Table-definition statements folded into a relational model.
// Purpose: Resolve ordered CREATE/ALTER statements into one table model.
// Dependencies: sqlparser (tokenizer), serde, thiserror
// ============================================================================

//! ## Overview
//! [`parse_table`] folds an ordered list of DDL statements for one table into
//! a [`TableModel`]. The first statement must create the table; every later
//! statement alters the accumulated state. Statements are never reordered or
//! deduplicated, and the last alteration of a column wins.
//!
//! Lexing is delegated to the `sqlparser` tokenizer; the grammar subset is
//! parsed here so the accepted language stays stable across tokenizer
//! releases.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod lexer;
pub mod parser;
pub mod table;
pub mod types;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use lexer::split_statements;
pub use parser::parse_table;
pub use table::Column;
pub use table::DefaultValue;
pub use table::Index;
pub use table::IndexKind;
pub use table::Placement;
pub use table::TableModel;
pub use types::SqlType;
pub use types::TypeFamily;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures raised while parsing DDL or converting a table model.
///
/// # Invariants
/// - Every variant is caused by caller-supplied input and is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Statement does not match the supported grammar subset.
    #[error("malformed statement ({reason}): {statement}")]
    MalformedStatement {
        /// Offending statement text.
        statement: String,
        /// What failed to parse, naming the offending token.
        reason: String,
    },
    /// Statement contradicts the accumulated table state.
    #[error("semantic conflict: {0}")]
    SemanticConflict(String),
    /// Column type has no parser or mapping support.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    /// No converter exists between the requested schema kinds.
    #[error("unsupported conversion from {from} to {to}")]
    UnsupportedConversion {
        /// Source schema kind.
        from: SchemaKind,
        /// Target schema kind.
        to: SchemaKind,
    },
}

impl ConversionError {
    /// Builds a semantic conflict error.
    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::SemanticConflict(message.into())
    }
}

// ============================================================================
// SECTION: Dialects
// ============================================================================

/// SQL dialect of incoming DDL statements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlDialect {
    /// MySQL / MariaDB DDL.
    #[default]
    MySql,
}

impl SqlDialect {
    /// Returns the stable label for this dialect.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Schema languages known to the converter dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    /// MySQL table definitions.
    MySql,
    /// Avro schema documents.
    Avro,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySql => f.write_str("mysql"),
            Self::Avro => f.write_str("avro"),
        }
    }
}
