// crates/schematizer-core/src/runtime/registry.rs
// ============================================================================
// Module: Schema Repository
// Description: Registration, deduplication, and lineage over a schema store.
// Purpose: Turn validated requests into immutable, deduplicated schema rows.
// Dependencies: crate::{avro, convert, core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! [`SchemaRepository`] is the only writer of schema rows. Registration
//! validates the document against the Avro grammar, canonicalizes it, and
//! hands a find-or-create to the injected [`SchemaStore`]. Resubmitting an
//! equivalent schema returns the existing row; a new schema links to the
//! caller's base or, by default, the source's latest schema.
//!
//! A uniqueness race surfaces from the store as a conflict. The repository
//! retries the registration once; the retry normally observes the row the
//! competing writer created.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::avro::AvroSchema;
use crate::avro::AvroSchemaError;
use crate::convert::AvroConverter;
use crate::core::BaseSchema;
use crate::core::NamespaceRecord;
use crate::core::NewSchema;
use crate::core::RegisterSchemaFromDdlRequest;
use crate::core::RegisterSchemaRequest;
use crate::core::Registration;
use crate::core::SchemaId;
use crate::core::SchemaRecord;
use crate::core::SourceRecord;
use crate::core::UpdateSourceOwnerRequest;
use crate::ddl::ConversionError;
use crate::interfaces::SchemaStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum schema document size in bytes.
pub const DEFAULT_MAX_SCHEMA_BYTES: usize = 1024 * 1024;

/// Repository limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryLimits {
    /// Maximum schema document size in bytes.
    pub max_schema_bytes: usize,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            max_schema_bytes: DEFAULT_MAX_SCHEMA_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Schema repository errors.
///
/// # Invariants
/// - Input errors are never retried; [`RegistryError::Conflict`] is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Request fields failed boundary validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Schema document violates the Avro grammar or size limit.
    #[error("invalid schema: {0}")]
    InvalidSchema(AvroSchemaError),
    /// DDL could not be converted.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    /// Explicit base schema is absent or belongs to another source.
    #[error("invalid base schema: {0}")]
    InvalidBaseSchema(String),
    /// Atomic find-or-create could not be honored.
    #[error("persistence conflict: {0}")]
    Conflict(String),
    /// Requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Storage failure.
    #[error(transparent)]
    Store(StoreError),
}

impl RegistryError {
    /// Returns true for errors caused by caller-supplied data.
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::InvalidSchema(_)
                | Self::Conversion(_)
                | Self::InvalidBaseSchema(_)
        )
    }

    /// Returns true when retrying the whole operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<StoreError> for RegistryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidBase(message) => Self::InvalidBaseSchema(message),
            StoreError::Conflict(message) => Self::Conflict(message),
            other => Self::Store(other),
        }
    }
}

// ============================================================================
// SECTION: Repository
// ============================================================================

/// Schema repository over an injected store and converter.
#[derive(Debug, Clone)]
pub struct SchemaRepository<S> {
    /// Persistence collaborator.
    store: S,
    /// DDL-to-Avro converter.
    converter: AvroConverter,
    /// Request limits.
    limits: RegistryLimits,
}

impl<S: SchemaStore> SchemaRepository<S> {
    /// Creates a repository.
    #[must_use]
    pub const fn new(store: S, converter: AvroConverter, limits: RegistryLimits) -> Self {
        Self {
            store,
            converter,
            limits,
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the converter used by [`Self::register_from_ddl`].
    #[must_use]
    pub const fn converter(&self) -> &AvroConverter {
        &self.converter
    }

    /// Returns the request limits.
    #[must_use]
    pub const fn limits(&self) -> RegistryLimits {
        self.limits
    }

    /// Registers an Avro schema, returning the existing row for an equivalent
    /// schema or a newly created one.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidRequest`], [`RegistryError::InvalidSchema`],
    /// [`RegistryError::InvalidBaseSchema`], [`RegistryError::Conflict`] when
    /// the retry also conflicts, or [`RegistryError::Store`].
    pub fn register(&self, request: &RegisterSchemaRequest) -> Result<SchemaRecord, RegistryError> {
        request.validate().map_err(|err| RegistryError::InvalidRequest(err.0))?;
        self.check_document_size(request.schema.len())?;
        let schema = AvroSchema::parse_str(&request.schema).map_err(RegistryError::InvalidSchema)?;
        self.register_document(
            &schema,
            &request.namespace,
            &request.source,
            &request.source_owner_email,
            request.base_schema_id,
        )
    }

    /// Converts DDL statements to Avro and registers the result.
    ///
    /// The Avro namespace is the target namespace name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Conversion`] for DDL failures and
    /// [`RegistryError::InvalidSchema`] when the converted document exceeds
    /// the size limit, otherwise the errors of [`Self::register`].
    pub fn register_from_ddl(
        &self,
        request: &RegisterSchemaFromDdlRequest,
    ) -> Result<SchemaRecord, RegistryError> {
        request.validate().map_err(|err| RegistryError::InvalidRequest(err.0))?;
        let document = self.converter.convert_statements(
            &request.ddl_statements,
            request.dialect,
            Some(&request.namespace),
        )?;
        self.check_document_size(document.to_string().len())?;
        let schema = AvroSchema::parse(document).map_err(RegistryError::InvalidSchema)?;
        self.register_document(
            &schema,
            &request.namespace,
            &request.source,
            &request.source_owner_email,
            request.base_schema_id,
        )
    }

    /// Rejects schema documents larger than `max_schema_bytes`.
    fn check_document_size(&self, len: usize) -> Result<(), RegistryError> {
        if len > self.limits.max_schema_bytes {
            return Err(RegistryError::InvalidSchema(AvroSchemaError {
                path: "$".to_string(),
                reason: format!("schema document exceeds {} bytes", self.limits.max_schema_bytes),
            }));
        }
        Ok(())
    }

    /// Canonicalizes a validated schema and runs the find-or-create.
    fn register_document(
        &self,
        schema: &AvroSchema,
        namespace: &str,
        source: &str,
        owner_email: &str,
        base_schema_id: Option<SchemaId>,
    ) -> Result<SchemaRecord, RegistryError> {
        let canonical = schema.canonical_form();
        let new_schema = NewSchema {
            namespace: namespace.to_string(),
            source: source.to_string(),
            source_owner_email: owner_email.to_string(),
            canonical_document: canonical.text,
            digest: canonical.digest,
            base: base_schema_id.map_or(BaseSchema::Latest, BaseSchema::Explicit),
        };
        let registration = match self.store.find_or_create_schema(&new_schema) {
            Err(StoreError::Conflict(message)) => {
                warn!(namespace, source, conflict = %message, "schema registration conflicted, retrying");
                self.store.find_or_create_schema(&new_schema)?
            }
            other => other?,
        };
        log_registration(&registration, namespace, source);
        Ok(registration.schema)
    }

    /// Converts DDL statements without registering.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Conversion`] for DDL failures.
    pub fn convert(
        &self,
        request: &RegisterSchemaFromDdlRequest,
    ) -> Result<Value, RegistryError> {
        Ok(self.converter.convert_statements(
            &request.ddl_statements,
            request.dialect,
            Some(&request.namespace),
        )?)
    }

    /// Loads a schema by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when absent.
    pub fn get_schema(&self, schema_id: SchemaId) -> Result<SchemaRecord, RegistryError> {
        self.store
            .get_schema(schema_id)?
            .ok_or_else(|| RegistryError::NotFound(format!("schema {schema_id}")))
    }

    /// Loads a namespace by name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when absent.
    pub fn get_namespace(&self, name: &str) -> Result<NamespaceRecord, RegistryError> {
        self.store
            .get_namespace(name)?
            .ok_or_else(|| RegistryError::NotFound(format!("namespace {name}")))
    }

    /// Loads a source by namespace and source name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when absent.
    pub fn get_source(&self, namespace: &str, source: &str) -> Result<SourceRecord, RegistryError> {
        self.store
            .get_source(namespace, source)?
            .ok_or_else(|| RegistryError::NotFound(format!("source {namespace}/{source}")))
    }

    /// Lists a source's schemas in ascending identifier order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the source is absent.
    pub fn list_schemas(
        &self,
        namespace: &str,
        source: &str,
    ) -> Result<Vec<SchemaRecord>, RegistryError> {
        let source = self.get_source(namespace, source)?;
        Ok(self.store.list_schemas(source.source_id)?)
    }

    /// Returns a source's latest schema.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the source is absent or has no
    /// schemas.
    pub fn latest_schema(&self, namespace: &str, source: &str) -> Result<SchemaRecord, RegistryError> {
        let record = self.get_source(namespace, source)?;
        self.store
            .latest_schema(record.source_id)?
            .ok_or_else(|| RegistryError::NotFound(format!("schemas for source {namespace}/{source}")))
    }

    /// Returns the lineage of a schema, starting with the schema itself and
    /// ending at its source's root.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] when the schema is absent and
    /// [`RegistryError::Store`] with [`StoreError::Corrupt`] when the chain is
    /// broken, crosses sources, or cycles.
    pub fn lineage(&self, schema_id: SchemaId) -> Result<Vec<SchemaRecord>, RegistryError> {
        let mut current = self.get_schema(schema_id)?;
        let mut seen = BTreeSet::from([current.schema_id]);
        let mut chain = Vec::new();
        while let Some(base_id) = current.base_schema_id {
            if !seen.insert(base_id) {
                return Err(corrupt(format!("lineage cycle at schema {base_id}")));
            }
            let base = self.store.get_schema(base_id)?.ok_or_else(|| {
                corrupt(format!("schema {} references missing base {base_id}", current.schema_id))
            })?;
            if base.source_id != current.source_id {
                return Err(corrupt(format!(
                    "schema {} has base {base_id} from another source",
                    current.schema_id
                )));
            }
            chain.push(current);
            current = base;
        }
        chain.push(current);
        Ok(chain)
    }

    /// Replaces a source's owner email.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidRequest`] for invalid fields and
    /// [`RegistryError::NotFound`] when the source is absent.
    pub fn update_source_owner(
        &self,
        request: &UpdateSourceOwnerRequest,
    ) -> Result<SourceRecord, RegistryError> {
        request.validate().map_err(|err| RegistryError::InvalidRequest(err.0))?;
        let updated = self
            .store
            .update_source_owner(&request.namespace, &request.source, &request.source_owner_email)?
            .ok_or_else(|| {
                RegistryError::NotFound(format!("source {}/{}", request.namespace, request.source))
            })?;
        info!(
            namespace = %request.namespace,
            source = %request.source,
            source_id = %updated.source_id,
            "updated source owner"
        );
        Ok(updated)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a corruption error.
fn corrupt(message: String) -> RegistryError {
    RegistryError::Store(StoreError::Corrupt(message))
}

/// Logs the outcome of a find-or-create.
fn log_registration(registration: &Registration, namespace: &str, source: &str) {
    let schema = &registration.schema;
    if registration.created {
        info!(
            namespace,
            source,
            schema_id = %schema.schema_id,
            base_schema_id = schema.base_schema_id.map(SchemaId::get),
            "registered new schema"
        );
    } else {
        debug!(namespace, source, schema_id = %schema.schema_id, "schema already registered");
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions.")]

    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;
    use crate::core::NamespaceId;
    use crate::core::SourceId;
    use crate::core::Timestamp;

    /// Store serving fixed schema rows and scripted find-or-create results.
    #[derive(Default)]
    struct ScriptedStore {
        /// Rows returned by `get_schema`.
        rows: BTreeMap<SchemaId, SchemaRecord>,
        /// Conflicts to report before succeeding.
        conflicts: Mutex<u32>,
        /// Number of find-or-create calls observed.
        calls: Mutex<u32>,
    }

    impl SchemaStore for ScriptedStore {
        fn find_or_create_schema(&self, request: &NewSchema) -> Result<Registration, StoreError> {
            *self.calls.lock().unwrap() += 1;
            let mut conflicts = self.conflicts.lock().unwrap();
            if *conflicts > 0 {
                *conflicts -= 1;
                return Err(StoreError::Conflict("unique constraint".to_string()));
            }
            Ok(Registration {
                schema: row(1, 1, None, &request.canonical_document),
                created: false,
            })
        }

        fn get_schema(&self, schema_id: SchemaId) -> Result<Option<SchemaRecord>, StoreError> {
            Ok(self.rows.get(&schema_id).cloned())
        }

        fn get_namespace(&self, _name: &str) -> Result<Option<NamespaceRecord>, StoreError> {
            Ok(None)
        }

        fn get_source(
            &self,
            _namespace: &str,
            _source: &str,
        ) -> Result<Option<SourceRecord>, StoreError> {
            Ok(None)
        }

        fn list_schemas(&self, _source_id: SourceId) -> Result<Vec<SchemaRecord>, StoreError> {
            Ok(Vec::new())
        }

        fn latest_schema(&self, _source_id: SourceId) -> Result<Option<SchemaRecord>, StoreError> {
            Ok(None)
        }

        fn update_source_owner(
            &self,
            _namespace: &str,
            _source: &str,
            _owner_email: &str,
        ) -> Result<Option<SourceRecord>, StoreError> {
            Ok(None)
        }
    }

    fn id(raw: u64) -> SchemaId {
        SchemaId::from_raw(raw).unwrap()
    }

    fn row(schema_id: u64, source_id: u64, base: Option<u64>, document: &str) -> SchemaRecord {
        SchemaRecord {
            schema_id: id(schema_id),
            canonical_document: document.to_string(),
            namespace_id: NamespaceId::from_raw(1).unwrap(),
            source_id: SourceId::from_raw(source_id).unwrap(),
            base_schema_id: base.map(id),
            created_at: Timestamp::from_unix_millis(0),
            updated_at: Timestamp::from_unix_millis(0),
        }
    }

    fn repository(store: ScriptedStore) -> SchemaRepository<ScriptedStore> {
        SchemaRepository::new(store, AvroConverter::default(), RegistryLimits::default())
    }

    fn store_with(rows: &[SchemaRecord]) -> ScriptedStore {
        ScriptedStore {
            rows: rows.iter().map(|record| (record.schema_id, record.clone())).collect(),
            ..ScriptedStore::default()
        }
    }

    fn register_request() -> RegisterSchemaRequest {
        RegisterSchemaRequest {
            schema: "\"int\"".to_string(),
            namespace: "ns1".to_string(),
            source: "users".to_string(),
            source_owner_email: "owner@example.com".to_string(),
            base_schema_id: None,
        }
    }

    fn is_corrupt(result: Result<Vec<SchemaRecord>, RegistryError>) -> bool {
        matches!(result, Err(RegistryError::Store(StoreError::Corrupt(_))))
    }

    #[test]
    fn lineage_detects_cycles() {
        let repo = repository(store_with(&[
            row(1, 1, Some(2), "\"a\""),
            row(2, 1, Some(1), "\"b\""),
        ]));
        assert!(is_corrupt(repo.lineage(id(1))));
    }

    #[test]
    fn lineage_rejects_missing_and_foreign_bases() {
        let missing = repository(store_with(&[row(3, 1, Some(9), "\"a\"")]));
        assert!(is_corrupt(missing.lineage(id(3))));

        let foreign =
            repository(store_with(&[row(1, 2, None, "\"a\""), row(2, 1, Some(1), "\"b\"")]));
        assert!(is_corrupt(foreign.lineage(id(2))));
    }

    #[test]
    fn single_conflict_is_retried() {
        let store = ScriptedStore {
            conflicts: Mutex::new(1),
            ..ScriptedStore::default()
        };
        let repo = repository(store);
        repo.register(&register_request()).unwrap();
        assert_eq!(*repo.store().calls.lock().unwrap(), 2);
    }

    #[test]
    fn repeated_conflict_surfaces_as_retryable() {
        let store = ScriptedStore {
            conflicts: Mutex::new(2),
            ..ScriptedStore::default()
        };
        let repo = repository(store);
        let err = repo.register(&register_request()).unwrap_err();
        assert!(matches!(err, RegistryError::Conflict(_)), "{err}");
        assert!(err.is_retryable());
        assert_eq!(*repo.store().calls.lock().unwrap(), 2);
    }
}
