// crates/schematizer-core/src/core/requests.rs
// ============================================================================
// Module: Schematizer Requests
// Description: Typed registration requests with boundary validation.
// Purpose: Validate caller input once before it reaches the repository.
// Dependencies: crate::core::identifiers, crate::ddl, serde, thiserror
// ============================================================================

//! ## Overview
//! Requests are strict serde structs (`deny_unknown_fields`). `validate`
//! checks names and owner email at the boundary; the repository assumes a
//! validated request and never re-checks these fields.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::SchemaId;
use crate::ddl::SqlDialect;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum length of namespace and source names.
pub const MAX_NAME_LENGTH: usize = 255;
/// Maximum length of an owner email address.
pub const MAX_EMAIL_LENGTH: usize = 320;
/// Maximum number of DDL statements per request.
pub const MAX_DDL_STATEMENTS: usize = 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request: {0}")]
pub struct RequestError(pub String);

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Registers an Avro schema under a namespace/source pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterSchemaRequest {
    /// Avro schema document as JSON text.
    pub schema: String,
    /// Target namespace name.
    pub namespace: String,
    /// Target source name.
    pub source: String,
    /// Owner email, applied when the source is new.
    pub source_owner_email: String,
    /// Explicit lineage predecessor; defaults to the source's latest schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_schema_id: Option<SchemaId>,
}

impl RegisterSchemaRequest {
    /// Validates request fields.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when a field is empty, too long, or malformed.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.schema.trim().is_empty() {
            return Err(RequestError("schema must be non-empty".to_string()));
        }
        validate_target(&self.namespace, &self.source, &self.source_owner_email)
    }
}

/// Registers the schema derived from a table's DDL statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterSchemaFromDdlRequest {
    /// Ordered CREATE/ALTER statements for one table.
    pub ddl_statements: Vec<String>,
    /// SQL dialect of the statements.
    #[serde(default)]
    pub dialect: SqlDialect,
    /// Target namespace name.
    pub namespace: String,
    /// Target source name.
    pub source: String,
    /// Owner email, applied when the source is new.
    pub source_owner_email: String,
    /// Explicit lineage predecessor; defaults to the source's latest schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_schema_id: Option<SchemaId>,
}

impl RegisterSchemaFromDdlRequest {
    /// Validates request fields.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when statements are missing or a target field
    /// is invalid.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.ddl_statements.is_empty() {
            return Err(RequestError("ddl_statements must be non-empty".to_string()));
        }
        if self.ddl_statements.len() > MAX_DDL_STATEMENTS {
            return Err(RequestError(format!(
                "too many ddl statements: {} (max {MAX_DDL_STATEMENTS})",
                self.ddl_statements.len()
            )));
        }
        if self.ddl_statements.iter().any(|stmt| stmt.trim().is_empty()) {
            return Err(RequestError("ddl statements must be non-empty".to_string()));
        }
        validate_target(&self.namespace, &self.source, &self.source_owner_email)
    }
}

/// Replaces the owner email of an existing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSourceOwnerRequest {
    /// Namespace name.
    pub namespace: String,
    /// Source name.
    pub source: String,
    /// New owner email.
    pub source_owner_email: String,
}

impl UpdateSourceOwnerRequest {
    /// Validates request fields.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when a field is empty, too long, or malformed.
    pub fn validate(&self) -> Result<(), RequestError> {
        validate_target(&self.namespace, &self.source, &self.source_owner_email)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the namespace/source/owner triple shared by all requests.
fn validate_target(namespace: &str, source: &str, owner_email: &str) -> Result<(), RequestError> {
    validate_name("namespace", namespace)?;
    validate_name("source", source)?;
    validate_email(owner_email)
}

/// Validates a namespace or source name.
fn validate_name(field: &str, value: &str) -> Result<(), RequestError> {
    if value.trim().is_empty() {
        return Err(RequestError(format!("{field} must be non-empty")));
    }
    if value.trim() != value {
        return Err(RequestError(format!("{field} must not have surrounding whitespace")));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(RequestError(format!("{field} exceeds {MAX_NAME_LENGTH} bytes")));
    }
    if value.chars().any(char::is_control) {
        return Err(RequestError(format!("{field} contains control characters")));
    }
    Ok(())
}

/// Validates the rough shape of an email address (`local@domain`).
fn validate_email(value: &str) -> Result<(), RequestError> {
    if value.len() > MAX_EMAIL_LENGTH {
        return Err(RequestError(format!("source_owner_email exceeds {MAX_EMAIL_LENGTH} bytes")));
    }
    let Some((local, domain)) = value.split_once('@') else {
        return Err(RequestError("source_owner_email must contain '@'".to_string()));
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(RequestError(format!("malformed source_owner_email: {value}")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(RequestError("source_owner_email must not contain whitespace".to_string()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use super::*;

    fn request() -> RegisterSchemaRequest {
        RegisterSchemaRequest {
            schema: "\"int\"".to_string(),
            namespace: "ns1".to_string(),
            source: "users".to_string(),
            source_owner_email: "owner@example.com".to_string(),
            base_schema_id: None,
        }
    }

    #[test]
    fn valid_request_passes() {
        request().validate().unwrap();
    }

    #[test]
    fn rejects_blank_namespace() {
        let mut req = request();
        req.namespace = "  ".to_string();
        assert!(req.validate().unwrap_err().0.contains("namespace"));
    }

    #[test]
    fn rejects_malformed_email() {
        for email in ["owner", "@example.com", "owner@", "a@b@c", "own er@example.com"] {
            let mut req = request();
            req.source_owner_email = email.to_string();
            assert!(req.validate().is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn ddl_request_requires_statements() {
        let req = RegisterSchemaFromDdlRequest {
            ddl_statements: Vec::new(),
            dialect: SqlDialect::MySql,
            namespace: "ns1".to_string(),
            source: "users".to_string(),
            source_owner_email: "owner@example.com".to_string(),
            base_schema_id: None,
        };
        assert!(req.validate().unwrap_err().0.contains("ddl_statements"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let raw = r#"{"schema":"\"int\"","namespace":"a","source":"b",
            "source_owner_email":"x@y","extra":1}"#;
        assert!(serde_json::from_str::<RegisterSchemaRequest>(raw).is_err());
    }
}
