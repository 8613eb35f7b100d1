// crates/schematizer-core/src/runtime/store.rs
// ============================================================================
// Module: Schematizer In-Memory Store
// Description: Mutex-guarded schema store and a shared store handle.
// Purpose: Provide a process-local store and type-erased store sharing.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`InMemorySchemaStore`] keeps namespaces, sources, and schemas behind one
//! mutex, which serializes every find-or-create. All lookups and validation
//! run before the first insert, so a failed call leaves no partial rows.
//! [`SharedSchemaStore`] wraps any store in an `Arc` for use across threads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::BaseSchema;
use crate::core::NamespaceId;
use crate::core::NamespaceRecord;
use crate::core::NewSchema;
use crate::core::Registration;
use crate::core::SchemaId;
use crate::core::SchemaRecord;
use crate::core::SourceId;
use crate::core::SourceRecord;
use crate::core::Timestamp;
use crate::interfaces::SchemaStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Mutable store state.
#[derive(Debug, Default)]
struct MemoryState {
    /// Last assigned namespace identifier.
    last_namespace_id: u64,
    /// Last assigned source identifier.
    last_source_id: u64,
    /// Last assigned schema identifier.
    last_schema_id: u64,
    /// Namespaces keyed by name.
    namespaces: BTreeMap<String, NamespaceRecord>,
    /// Sources keyed by (namespace, source name).
    sources: BTreeMap<(NamespaceId, String), SourceRecord>,
    /// Schemas keyed by identifier.
    schemas: BTreeMap<SchemaId, SchemaRecord>,
    /// Dedup index keyed by (source, digest).
    by_digest: BTreeMap<(SourceId, String), SchemaId>,
}

impl MemoryState {
    /// Looks up a source by names.
    fn source(&self, namespace: &str, source: &str) -> Option<&SourceRecord> {
        let namespace_id = self.namespaces.get(namespace)?.namespace_id;
        self.sources.get(&(namespace_id, source.to_string()))
    }

    /// Returns the latest schema of a source.
    fn latest(&self, source_id: SourceId) -> Option<&SchemaRecord> {
        self.schemas.values().rev().find(|record| record.source_id == source_id)
    }
}

/// Allocates the next identifier from a counter.
fn next_id<T>(counter: &mut u64, from_raw: fn(u64) -> Option<T>) -> Result<T, StoreError> {
    let next = counter
        .checked_add(1)
        .ok_or_else(|| StoreError::Store("identifier space exhausted".to_string()))?;
    let id = from_raw(next).ok_or_else(|| StoreError::Store("invalid identifier".to_string()))?;
    *counter = next;
    Ok(id)
}

/// In-memory schema store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchemaStore {
    /// Shared state guarded by a mutex.
    state: Arc<Mutex<MemoryState>>,
}

impl InMemorySchemaStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the state.
    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Store("schema store mutex poisoned".to_string()))
    }
}

impl SchemaStore for InMemorySchemaStore {
    fn find_or_create_schema(&self, request: &NewSchema) -> Result<Registration, StoreError> {
        let mut state = self.lock()?;
        let now = Timestamp::now();
        let namespace_id = state.namespaces.get(&request.namespace).map(|ns| ns.namespace_id);
        let source = state.source(&request.namespace, &request.source).cloned();

        if let Some(source) = &source {
            let key = (source.source_id, request.digest.value.clone());
            if let Some(existing) = state.by_digest.get(&key).and_then(|id| state.schemas.get(id)) {
                if existing.canonical_document != request.canonical_document {
                    return Err(StoreError::Corrupt(format!(
                        "digest collision for source {}",
                        source.source_id
                    )));
                }
                return Ok(Registration {
                    schema: existing.clone(),
                    created: false,
                });
            }
        }

        let base_schema_id = match request.base {
            BaseSchema::Latest => source
                .as_ref()
                .and_then(|source| state.latest(source.source_id))
                .map(|record| record.schema_id),
            BaseSchema::Explicit(base_id) => {
                let owned = source.as_ref().is_some_and(|source| {
                    state
                        .schemas
                        .get(&base_id)
                        .is_some_and(|existing| existing.source_id == source.source_id)
                });
                if !owned {
                    return Err(StoreError::InvalidBase(format!(
                        "schema {base_id} does not exist for source {}/{}",
                        request.namespace, request.source
                    )));
                }
                Some(base_id)
            }
        };

        let state = &mut *state;
        let namespace_id = match namespace_id {
            Some(namespace_id) => namespace_id,
            None => {
                let namespace_id = next_id(&mut state.last_namespace_id, NamespaceId::from_raw)?;
                state.namespaces.insert(
                    request.namespace.clone(),
                    NamespaceRecord {
                        namespace_id,
                        name: request.namespace.clone(),
                        created_at: now,
                        updated_at: now,
                    },
                );
                namespace_id
            }
        };
        let source_id = match source {
            Some(source) => source.source_id,
            None => {
                let source_id = next_id(&mut state.last_source_id, SourceId::from_raw)?;
                state.sources.insert(
                    (namespace_id, request.source.clone()),
                    SourceRecord {
                        source_id,
                        name: request.source.clone(),
                        source_owner_email: request.source_owner_email.clone(),
                        namespace_id,
                        created_at: now,
                        updated_at: now,
                    },
                );
                source_id
            }
        };
        let schema_id = next_id(&mut state.last_schema_id, SchemaId::from_raw)?;
        let record = SchemaRecord {
            schema_id,
            canonical_document: request.canonical_document.clone(),
            namespace_id,
            source_id,
            base_schema_id,
            created_at: now,
            updated_at: now,
        };
        state.by_digest.insert((source_id, request.digest.value.clone()), schema_id);
        state.schemas.insert(schema_id, record.clone());
        Ok(Registration {
            schema: record,
            created: true,
        })
    }

    fn get_schema(&self, schema_id: SchemaId) -> Result<Option<SchemaRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state.schemas.get(&schema_id).cloned())
    }

    fn get_namespace(&self, name: &str) -> Result<Option<NamespaceRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state.namespaces.get(name).cloned())
    }

    fn get_source(
        &self,
        namespace: &str,
        source: &str,
    ) -> Result<Option<SourceRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state.source(namespace, source).cloned())
    }

    fn list_schemas(&self, source_id: SourceId) -> Result<Vec<SchemaRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .schemas
            .values()
            .filter(|record| record.source_id == source_id)
            .cloned()
            .collect())
    }

    fn latest_schema(&self, source_id: SourceId) -> Result<Option<SchemaRecord>, StoreError> {
        let state = self.lock()?;
        Ok(state.latest(source_id).cloned())
    }

    fn update_source_owner(
        &self,
        namespace: &str,
        source: &str,
        owner_email: &str,
    ) -> Result<Option<SourceRecord>, StoreError> {
        let mut state = self.lock()?;
        let Some(namespace_id) = state.namespaces.get(namespace).map(|ns| ns.namespace_id) else {
            return Ok(None);
        };
        let Some(record) = state.sources.get_mut(&(namespace_id, source.to_string())) else {
            return Ok(None);
        };
        record.source_owner_email = owner_email.to_string();
        record.updated_at = Timestamp::now();
        Ok(Some(record.clone()))
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}

// ============================================================================
// SECTION: Shared Store
// ============================================================================

/// Shared schema store handle backed by an `Arc`.
#[derive(Clone)]
pub struct SharedSchemaStore {
    /// Inner store implementation.
    inner: Arc<dyn SchemaStore + Send + Sync>,
}

impl SharedSchemaStore {
    /// Wraps a store in a shared handle.
    #[must_use]
    pub fn from_store(store: impl SchemaStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(inner: Arc<dyn SchemaStore + Send + Sync>) -> Self {
        Self {
            inner,
        }
    }
}

impl SchemaStore for SharedSchemaStore {
    fn find_or_create_schema(&self, request: &NewSchema) -> Result<Registration, StoreError> {
        self.inner.find_or_create_schema(request)
    }

    fn get_schema(&self, schema_id: SchemaId) -> Result<Option<SchemaRecord>, StoreError> {
        self.inner.get_schema(schema_id)
    }

    fn get_namespace(&self, name: &str) -> Result<Option<NamespaceRecord>, StoreError> {
        self.inner.get_namespace(name)
    }

    fn get_source(
        &self,
        namespace: &str,
        source: &str,
    ) -> Result<Option<SourceRecord>, StoreError> {
        self.inner.get_source(namespace, source)
    }

    fn list_schemas(&self, source_id: SourceId) -> Result<Vec<SchemaRecord>, StoreError> {
        self.inner.list_schemas(source_id)
    }

    fn latest_schema(&self, source_id: SourceId) -> Result<Option<SchemaRecord>, StoreError> {
        self.inner.latest_schema(source_id)
    }

    fn update_source_owner(
        &self,
        namespace: &str,
        source: &str,
        owner_email: &str,
    ) -> Result<Option<SourceRecord>, StoreError> {
        self.inner.update_source_owner(namespace, source, owner_email)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.inner.readiness()
    }
}
