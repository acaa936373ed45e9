//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for Covault. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking. Records are
//! stored as CBOR blobs beside their key columns; the key columns exist for
//! indexing, the blob is the source of truth.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use covault_core::{AccountId, AuditEntry, Document, DocumentId, Entity, EntityId, NewAuditEntry};
use covault_perms::PermissionGrant;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking to
/// avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(&path)?;
        migration::migrate(&mut conn)?;
        debug!(path = %path.as_ref().display(), "opened covault database");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Connection(format!("mutex poisoned: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Connection(format!("blocking task failed: {}", e)))?
    }
}

/// Encode a record to its CBOR blob form.
fn encode_record<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

/// Decode a record from its CBOR blob form.
fn decode_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_entity(&self, id: &EntityId) -> Result<Option<Entity>> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let record: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT record FROM entities WHERE entity_id = ?1",
                    params![id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            record.as_deref().map(decode_record).transpose()
        })
        .await
    }

    async fn put_entity(&self, entity: &Entity) -> Result<()> {
        let entity = entity.clone();
        self.with_conn(move |conn| {
            let record = encode_record(&entity)?;
            conn.execute(
                "INSERT INTO entities (entity_id, owner, registered_at, active, record)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(entity_id) DO UPDATE SET
                    owner = excluded.owner,
                    registered_at = excluded.registered_at,
                    active = excluded.active,
                    record = excluded.record",
                params![
                    entity.id.as_str(),
                    entity.owner.as_str(),
                    entity.registered_at,
                    entity.active,
                    record,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_document(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
    ) -> Result<Option<Document>> {
        let entity_id = entity_id.clone();
        let document_id = document_id.clone();
        self.with_conn(move |conn| {
            let record: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT record FROM documents WHERE entity_id = ?1 AND document_id = ?2",
                    params![entity_id.as_str(), document_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            record.as_deref().map(decode_record).transpose()
        })
        .await
    }

    async fn put_document(&self, document: &Document) -> Result<()> {
        let document = document.clone();
        self.with_conn(move |conn| {
            let record = encode_record(&document)?;
            conn.execute(
                "INSERT INTO documents (
                    entity_id, document_id, version, active, last_modified_at, record
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(entity_id, document_id) DO UPDATE SET
                    version = excluded.version,
                    active = excluded.active,
                    last_modified_at = excluded.last_modified_at,
                    record = excluded.record",
                params![
                    document.entity_id.as_str(),
                    document.document_id.as_str(),
                    document.version as i64,
                    document.active,
                    document.last_modified_at,
                    record,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_grant(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        user: &AccountId,
    ) -> Result<Option<PermissionGrant>> {
        let entity_id = entity_id.clone();
        let document_id = document_id.clone();
        let user = user.clone();
        self.with_conn(move |conn| {
            let record: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT record FROM grants
                     WHERE entity_id = ?1 AND document_id = ?2 AND user = ?3",
                    params![entity_id.as_str(), document_id.as_str(), user.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            record.as_deref().map(decode_record).transpose()
        })
        .await
    }

    async fn put_grant(&self, grant: &PermissionGrant) -> Result<()> {
        let grant = grant.clone();
        self.with_conn(move |conn| {
            let record = encode_record(&grant)?;
            conn.execute(
                "INSERT INTO grants (entity_id, document_id, user, level, record)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(entity_id, document_id, user) DO UPDATE SET
                    level = excluded.level,
                    record = excluded.record",
                params![
                    grant.entity_id.as_str(),
                    grant.document_id.as_str(),
                    grant.user.as_str(),
                    grant.level.to_u8() as i64,
                    record,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_grant(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        user: &AccountId,
    ) -> Result<()> {
        let entity_id = entity_id.clone();
        let document_id = document_id.clone();
        let user = user.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "DELETE FROM grants
                 WHERE entity_id = ?1 AND document_id = ?2 AND user = ?3",
                params![entity_id.as_str(), document_id.as_str(), user.as_str()],
            )?;
            Ok(())
        })
        .await
    }

    async fn append_audit(&self, entry: NewAuditEntry) -> Result<AuditEntry> {
        self.with_conn(move |conn| {
            // Counter read, entry insert, and counter advance share one
            // transaction; they cannot diverge.
            let tx = conn.transaction()?;

            let next: Option<i64> = tx
                .query_row(
                    "SELECT next_log_id FROM audit_counters
                     WHERE entity_id = ?1 AND document_id = ?2",
                    params![entry.entity_id.as_str(), entry.document_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            let log_id = next.unwrap_or(1) as u64;

            let entry = entry.into_entry(log_id);
            let record = encode_record(&entry)?;

            tx.execute(
                "INSERT INTO audit_log (
                    entity_id, document_id, log_id, user, action, timestamp, record
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.entity_id.as_str(),
                    entry.document_id.as_str(),
                    log_id as i64,
                    entry.user.as_str(),
                    entry.action.to_u8() as i64,
                    entry.timestamp,
                    record,
                ],
            )?;

            tx.execute(
                "INSERT INTO audit_counters (entity_id, document_id, next_log_id)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(entity_id, document_id) DO UPDATE SET
                    next_log_id = excluded.next_log_id",
                params![
                    entry.entity_id.as_str(),
                    entry.document_id.as_str(),
                    (log_id + 1) as i64,
                ],
            )?;

            tx.commit()?;
            Ok(entry)
        })
        .await
    }

    async fn get_audit_entry(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        log_id: u64,
    ) -> Result<Option<AuditEntry>> {
        let entity_id = entity_id.clone();
        let document_id = document_id.clone();
        self.with_conn(move |conn| {
            let record: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT record FROM audit_log
                     WHERE entity_id = ?1 AND document_id = ?2 AND log_id = ?3",
                    params![entity_id.as_str(), document_id.as_str(), log_id as i64],
                    |row| row.get(0),
                )
                .optional()?;
            record.as_deref().map(decode_record).transpose()
        })
        .await
    }

    async fn audit_counter(&self, entity_id: &EntityId, document_id: &DocumentId) -> Result<u64> {
        let entity_id = entity_id.clone();
        let document_id = document_id.clone();
        self.with_conn(move |conn| {
            let next: Option<i64> = conn
                .query_row(
                    "SELECT next_log_id FROM audit_counters
                     WHERE entity_id = ?1 AND document_id = ?2",
                    params![entity_id.as_str(), document_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(next.unwrap_or(1) as u64)
        })
        .await
    }
}
