// crates/schematizer-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Schema Store
// Description: Durable SchemaStore backed by SQLite.
// Purpose: Persist namespaces, sources, and deduplicated schemas atomically.
// Dependencies: schematizer-core, rusqlite, serde, thiserror, tracing
// ============================================================================

//! ## Overview
//! This module implements a durable [`SchemaStore`] using `SQLite`. Every
//! find-or-create runs in one `BEGIN IMMEDIATE` transaction on a
//! mutex-guarded connection, so the dedup lookup, base resolution, and
//! inserts observe a single snapshot. `UNIQUE(source_id, schema_hash)` backs
//! the dedup rule across processes sharing one database file; a violation is
//! reported as [`StoreError::Conflict`].
//!
//! Loads recompute the stored digest and fail closed on mismatch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::ErrorCode;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use schematizer_core::BaseSchema;
use schematizer_core::HashAlgorithm;
use schematizer_core::NamespaceId;
use schematizer_core::NamespaceRecord;
use schematizer_core::NewSchema;
use schematizer_core::Registration;
use schematizer_core::SchemaId;
use schematizer_core::SchemaRecord;
use schematizer_core::SchemaStore;
use schematizer_core::SourceId;
use schematizer_core::SourceRecord;
use schematizer_core::StoreError;
use schematizer_core::Timestamp;
use schematizer_core::hashing::hash_bytes;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Column list shared by schema queries.
const SCHEMA_COLUMNS: &str = "schema_id, schema_json, schema_hash, hash_algorithm, namespace_id, \
                              source_id, base_schema_id, created_at, updated_at";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` schema store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a config for `path` with default pragmas.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Default busy timeout for serde.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding schema payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Requested lineage base is absent or foreign to the source.
    #[error("sqlite store invalid base schema: {0}")]
    InvalidBase(String),
    /// Uniqueness constraint violated by a concurrent writer.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::InvalidBase(message) => Self::InvalidBase(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
        }
    }
}

/// Maps an engine error, classifying constraint violations as conflicts.
fn db_error(err: &rusqlite::Error) -> SqliteStoreError {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            SqliteStoreError::Conflict(err.to_string())
        }
        _ => SqliteStoreError::Db(err.to_string()),
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed schema store.
///
/// # Invariants
/// - Connection access is serialized through a mutex.
/// - Schema rows are never updated or deleted.
#[derive(Debug, Clone)]
pub struct SqliteSchemaStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteSchemaStore {
    /// Opens an `SQLite`-backed schema store, creating tables when absent.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or its schema version is unsupported.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        debug!(
            path = %config.path.display(),
            journal_mode = config.journal_mode.pragma_value(),
            sync_mode = config.sync_mode.pragma_value(),
            "opened sqlite schema store"
        );
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Locks the connection.
    fn lock(&self) -> Result<MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }

    /// Runs the find-or-create inside one immediate transaction.
    fn find_or_create(&self, request: &NewSchema) -> Result<Registration, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| db_error(&err))?;
        let registration = find_or_create_in_tx(&tx, request)?;
        if registration.created {
            tx.commit().map_err(|err| db_error(&err))?;
        }
        Ok(registration)
    }

    /// Loads a schema by identifier, verifying its digest.
    fn load_schema(&self, schema_id: SchemaId) -> Result<Option<SchemaRecord>, SqliteStoreError> {
        let guard = self.lock()?;
        query_schema(
            &guard,
            &format!("SELECT {SCHEMA_COLUMNS} FROM schemas WHERE schema_id = ?1"),
            schema_id.to_i64(),
        )
    }

    /// Loads a namespace by name.
    fn load_namespace(&self, name: &str) -> Result<Option<NamespaceRecord>, SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT namespace_id, name, created_at, updated_at FROM namespaces WHERE name = ?1",
                params![name],
                map_namespace_row,
            )
            .optional()
            .map_err(|err| db_error(&err))?
            .transpose()
    }

    /// Loads a source by names.
    fn load_source(
        &self,
        namespace: &str,
        source: &str,
    ) -> Result<Option<SourceRecord>, SqliteStoreError> {
        let guard = self.lock()?;
        source_by_names(&guard, namespace, source)
    }

    /// Lists a source's schemas in ascending identifier order.
    fn load_schemas(&self, source_id: SourceId) -> Result<Vec<SchemaRecord>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare_cached(&format!(
                "SELECT {SCHEMA_COLUMNS} FROM schemas WHERE source_id = ?1 ORDER BY schema_id ASC"
            ))
            .map_err(|err| db_error(&err))?;
        let rows = stmt
            .query_map(params![source_id.to_i64()], map_schema_row)
            .map_err(|err| db_error(&err))?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(|err| db_error(&err))?.verify()?);
        }
        Ok(records)
    }

    /// Loads the source's latest schema.
    fn load_latest(&self, source_id: SourceId) -> Result<Option<SchemaRecord>, SqliteStoreError> {
        let guard = self.lock()?;
        query_schema(
            &guard,
            &format!(
                "SELECT {SCHEMA_COLUMNS} FROM schemas WHERE source_id = ?1 \
                 ORDER BY schema_id DESC LIMIT 1"
            ),
            source_id.to_i64(),
        )
    }

    /// Replaces a source's owner email.
    fn set_owner(
        &self,
        namespace: &str,
        source: &str,
        owner_email: &str,
    ) -> Result<Option<SourceRecord>, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| db_error(&err))?;
        let Some(record) = source_by_names(&tx, namespace, source)? else {
            return Ok(None);
        };
        let now = Timestamp::now();
        tx.execute(
            "UPDATE sources SET owner_email = ?1, updated_at = ?2 WHERE source_id = ?3",
            params![owner_email, now.as_unix_millis(), record.source_id.to_i64()],
        )
        .map_err(|err| db_error(&err))?;
        tx.commit().map_err(|err| db_error(&err))?;
        Ok(Some(SourceRecord {
            source_owner_email: owner_email.to_string(),
            updated_at: now,
            ..record
        }))
    }

    /// Verifies the store can execute a simple SQL statement.
    fn check_connection(&self) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .query_row("SELECT 1", params![], |row| row.get::<_, i64>(0))
            .map(|_| ())
            .map_err(|err| db_error(&err))
    }
}

impl SchemaStore for SqliteSchemaStore {
    fn find_or_create_schema(&self, request: &NewSchema) -> Result<Registration, StoreError> {
        self.find_or_create(request).map_err(StoreError::from)
    }

    fn get_schema(&self, schema_id: SchemaId) -> Result<Option<SchemaRecord>, StoreError> {
        self.load_schema(schema_id).map_err(StoreError::from)
    }

    fn get_namespace(&self, name: &str) -> Result<Option<NamespaceRecord>, StoreError> {
        self.load_namespace(name).map_err(StoreError::from)
    }

    fn get_source(
        &self,
        namespace: &str,
        source: &str,
    ) -> Result<Option<SourceRecord>, StoreError> {
        self.load_source(namespace, source).map_err(StoreError::from)
    }

    fn list_schemas(&self, source_id: SourceId) -> Result<Vec<SchemaRecord>, StoreError> {
        self.load_schemas(source_id).map_err(StoreError::from)
    }

    fn latest_schema(&self, source_id: SourceId) -> Result<Option<SchemaRecord>, StoreError> {
        self.load_latest(source_id).map_err(StoreError::from)
    }

    fn update_source_owner(
        &self,
        namespace: &str,
        source: &str,
        owner_email: &str,
    ) -> Result<Option<SourceRecord>, StoreError> {
        self.set_owner(namespace, source, owner_email).map_err(StoreError::from)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.check_connection().map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Transactions
// ============================================================================

/// Resolves or creates the namespace, source, and schema inside `tx`.
///
/// All reads and validation happen before the first insert; an error drops
/// the transaction, which rolls back.
fn find_or_create_in_tx(
    tx: &Transaction<'_>,
    request: &NewSchema,
) -> Result<Registration, SqliteStoreError> {
    let namespace_id: Option<i64> = tx
        .query_row(
            "SELECT namespace_id FROM namespaces WHERE name = ?1",
            params![request.namespace],
            |row| row.get(0),
        )
        .optional()
        .map_err(|err| db_error(&err))?;
    let source = source_by_names(tx, &request.namespace, &request.source)?;

    if let Some(source) = &source {
        let existing = query_schema_by_digest(tx, source.source_id, &request.digest.value)?;
        if let Some(existing) = existing {
            if existing.canonical_document != request.canonical_document {
                return Err(SqliteStoreError::Corrupt(format!(
                    "digest collision for source {}",
                    source.source_id
                )));
            }
            return Ok(Registration {
                schema: existing,
                created: false,
            });
        }
    }

    let base_schema_id = match request.base {
        BaseSchema::Latest => match &source {
            Some(source) => latest_schema_id(tx, source.source_id)?,
            None => None,
        },
        BaseSchema::Explicit(base_id) => {
            let owner: Option<i64> = tx
                .query_row(
                    "SELECT source_id FROM schemas WHERE schema_id = ?1",
                    params![base_id.to_i64()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| db_error(&err))?;
            let owned = matches!(
                (owner, &source),
                (Some(owner), Some(source)) if owner == source.source_id.to_i64()
            );
            if !owned {
                return Err(SqliteStoreError::InvalidBase(format!(
                    "schema {base_id} does not exist for source {}/{}",
                    request.namespace, request.source
                )));
            }
            Some(base_id.to_i64())
        }
    };

    let now = Timestamp::now().as_unix_millis();
    let namespace_id = match namespace_id {
        Some(namespace_id) => namespace_id,
        None => {
            tx.execute(
                "INSERT INTO namespaces (name, created_at, updated_at) VALUES (?1, ?2, ?2)",
                params![request.namespace, now],
            )
            .map_err(|err| db_error(&err))?;
            tx.last_insert_rowid()
        }
    };
    let source_id = match &source {
        Some(source) => source.source_id.to_i64(),
        None => {
            tx.execute(
                "INSERT INTO sources (namespace_id, name, owner_email, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![namespace_id, request.source, request.source_owner_email, now],
            )
            .map_err(|err| db_error(&err))?;
            tx.last_insert_rowid()
        }
    };
    tx.execute(
        "INSERT INTO schemas (schema_json, schema_hash, hash_algorithm, namespace_id, source_id, \
         base_schema_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![
            request.canonical_document,
            request.digest.value,
            request.digest.algorithm.label(),
            namespace_id,
            source_id,
            base_schema_id,
            now,
        ],
    )
    .map_err(|err| db_error(&err))?;
    let schema_id = tx.last_insert_rowid();
    let schema = query_schema(
        tx,
        &format!("SELECT {SCHEMA_COLUMNS} FROM schemas WHERE schema_id = ?1"),
        schema_id,
    )?
    .ok_or_else(|| SqliteStoreError::Corrupt(format!("inserted schema {schema_id} not found")))?;
    Ok(Registration {
        schema,
        created: true,
    })
}

// ============================================================================
// SECTION: Queries
// ============================================================================

/// Loads a source by namespace and source names.
fn source_by_names(
    connection: &Connection,
    namespace: &str,
    source: &str,
) -> Result<Option<SourceRecord>, SqliteStoreError> {
    connection
        .query_row(
            "SELECT s.source_id, s.name, s.owner_email, s.namespace_id, s.created_at, \
             s.updated_at FROM sources s JOIN namespaces n ON n.namespace_id = s.namespace_id \
             WHERE n.name = ?1 AND s.name = ?2",
            params![namespace, source],
            map_source_row,
        )
        .optional()
        .map_err(|err| db_error(&err))?
        .transpose()
}

/// Runs a single-row schema query keyed by one integer parameter.
fn query_schema(
    connection: &Connection,
    sql: &str,
    key: i64,
) -> Result<Option<SchemaRecord>, SqliteStoreError> {
    let row = connection
        .query_row(sql, params![key], map_schema_row)
        .optional()
        .map_err(|err| db_error(&err))?;
    row.map(SchemaRow::verify).transpose()
}

/// Finds a source's schema by digest.
fn query_schema_by_digest(
    connection: &Connection,
    source_id: SourceId,
    digest: &str,
) -> Result<Option<SchemaRecord>, SqliteStoreError> {
    let row = connection
        .query_row(
            &format!(
                "SELECT {SCHEMA_COLUMNS} FROM schemas WHERE source_id = ?1 AND schema_hash = ?2"
            ),
            params![source_id.to_i64(), digest],
            map_schema_row,
        )
        .optional()
        .map_err(|err| db_error(&err))?;
    row.map(SchemaRow::verify).transpose()
}

/// Returns the identifier of a source's latest schema.
fn latest_schema_id(
    connection: &Connection,
    source_id: SourceId,
) -> Result<Option<i64>, SqliteStoreError> {
    connection
        .query_row(
            "SELECT MAX(schema_id) FROM schemas WHERE source_id = ?1",
            params![source_id.to_i64()],
            |row| row.get(0),
        )
        .map_err(|err| db_error(&err))
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Raw schema row prior to integrity checks.
#[derive(Debug)]
struct SchemaRow {
    /// Schema identifier.
    schema_id: i64,
    /// Canonical schema text.
    schema_json: String,
    /// Stored digest value.
    schema_hash: String,
    /// Stored hash algorithm label.
    hash_algorithm: String,
    /// Owning namespace identifier.
    namespace_id: i64,
    /// Owning source identifier.
    source_id: i64,
    /// Lineage predecessor.
    base_schema_id: Option<i64>,
    /// Creation time (unix millis).
    created_at: i64,
    /// Update time (unix millis).
    updated_at: i64,
}

impl SchemaRow {
    /// Verifies the stored digest and converts the row into a record.
    fn verify(self) -> Result<SchemaRecord, SqliteStoreError> {
        let algorithm = HashAlgorithm::from_label(&self.hash_algorithm).ok_or_else(|| {
            SqliteStoreError::Invalid(format!(
                "unsupported hash algorithm: {}",
                self.hash_algorithm
            ))
        })?;
        let digest = hash_bytes(algorithm, self.schema_json.as_bytes());
        if digest.value != self.schema_hash {
            return Err(SqliteStoreError::Corrupt(format!(
                "hash mismatch for schema {}",
                self.schema_id
            )));
        }
        let base_schema_id = match self.base_schema_id {
            Some(raw) => Some(parse_id(raw, "base_schema_id", SchemaId::from_i64)?),
            None => None,
        };
        Ok(SchemaRecord {
            schema_id: parse_id(self.schema_id, "schema_id", SchemaId::from_i64)?,
            canonical_document: self.schema_json,
            namespace_id: parse_id(self.namespace_id, "namespace_id", NamespaceId::from_i64)?,
            source_id: parse_id(self.source_id, "source_id", SourceId::from_i64)?,
            base_schema_id,
            created_at: Timestamp::from_unix_millis(self.created_at),
            updated_at: Timestamp::from_unix_millis(self.updated_at),
        })
    }
}

/// Maps a schema query row.
fn map_schema_row(row: &Row<'_>) -> rusqlite::Result<SchemaRow> {
    Ok(SchemaRow {
        schema_id: row.get(0)?,
        schema_json: row.get(1)?,
        schema_hash: row.get(2)?,
        hash_algorithm: row.get(3)?,
        namespace_id: row.get(4)?,
        source_id: row.get(5)?,
        base_schema_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Maps a namespace query row.
fn map_namespace_row(
    row: &Row<'_>,
) -> rusqlite::Result<Result<NamespaceRecord, SqliteStoreError>> {
    let raw_id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let created_at: i64 = row.get(2)?;
    let updated_at: i64 = row.get(3)?;
    Ok(parse_id(raw_id, "namespace_id", NamespaceId::from_i64).map(|namespace_id| {
        NamespaceRecord {
            namespace_id,
            name,
            created_at: Timestamp::from_unix_millis(created_at),
            updated_at: Timestamp::from_unix_millis(updated_at),
        }
    }))
}

/// Maps a source query row.
fn map_source_row(row: &Row<'_>) -> rusqlite::Result<Result<SourceRecord, SqliteStoreError>> {
    let raw_id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let source_owner_email: String = row.get(2)?;
    let raw_namespace_id: i64 = row.get(3)?;
    let created_at: i64 = row.get(4)?;
    let updated_at: i64 = row.get(5)?;
    Ok(parse_id(raw_id, "source_id", SourceId::from_i64).and_then(|source_id| {
        Ok(SourceRecord {
            source_id,
            name,
            source_owner_email,
            namespace_id: parse_id(raw_namespace_id, "namespace_id", NamespaceId::from_i64)?,
            created_at: Timestamp::from_unix_millis(created_at),
            updated_at: Timestamp::from_unix_millis(updated_at),
        })
    }))
}

/// Parses a stored identifier, rejecting non-positive values.
fn parse_id<T>(raw: i64, column: &str, parse: fn(i64) -> Option<T>) -> Result<T, SqliteStoreError> {
    parse(raw).ok_or_else(|| SqliteStoreError::Invalid(format!("invalid {column}: {raw}")))
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS namespaces (
                    namespace_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS sources (
                    source_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    namespace_id INTEGER NOT NULL REFERENCES namespaces(namespace_id),
                    name TEXT NOT NULL,
                    owner_email TEXT NOT NULL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    UNIQUE (namespace_id, name)
                );
                CREATE TABLE IF NOT EXISTS schemas (
                    schema_id INTEGER PRIMARY KEY AUTOINCREMENT,
                    schema_json TEXT NOT NULL,
                    schema_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    namespace_id INTEGER NOT NULL REFERENCES namespaces(namespace_id),
                    source_id INTEGER NOT NULL REFERENCES sources(source_id),
                    base_schema_id INTEGER REFERENCES schemas(schema_id),
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    UNIQUE (source_id, schema_hash)
                );
                CREATE INDEX IF NOT EXISTS idx_schemas_source
                    ON schemas (source_id, schema_id);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            debug!(version = SCHEMA_VERSION, "initialized sqlite schema store tables");
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
