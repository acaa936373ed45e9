//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL
//! string that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Collateral entities
        CREATE TABLE entities (
            entity_id TEXT PRIMARY KEY,
            owner TEXT NOT NULL,
            registered_at INTEGER NOT NULL,       -- Unix ms, host clock
            active INTEGER NOT NULL DEFAULT 1,
            record BLOB NOT NULL                  -- CBOR-encoded Entity
        );

        -- Documents, keyed per entity
        CREATE TABLE documents (
            entity_id TEXT NOT NULL,
            document_id TEXT NOT NULL,
            version INTEGER NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            last_modified_at INTEGER NOT NULL,
            record BLOB NOT NULL,                 -- CBOR-encoded Document
            PRIMARY KEY (entity_id, document_id)
        );

        -- Permission grants, one row per (entity, document, user)
        CREATE TABLE grants (
            entity_id TEXT NOT NULL,
            document_id TEXT NOT NULL,
            user TEXT NOT NULL,
            level INTEGER NOT NULL,
            record BLOB NOT NULL,                 -- CBOR-encoded PermissionGrant
            PRIMARY KEY (entity_id, document_id, user)
        );

        -- Append-only audit log
        CREATE TABLE audit_log (
            entity_id TEXT NOT NULL,
            document_id TEXT NOT NULL,
            log_id INTEGER NOT NULL,              -- 1-indexed per pair
            user TEXT NOT NULL,
            action INTEGER NOT NULL,              -- AuditAction as u8
            timestamp INTEGER NOT NULL,
            record BLOB NOT NULL,                 -- CBOR-encoded AuditEntry
            PRIMARY KEY (entity_id, document_id, log_id)
        );

        -- Next log id per (entity, document); absent row means 1
        CREATE TABLE audit_counters (
            entity_id TEXT NOT NULL,
            document_id TEXT NOT NULL,
            next_log_id INTEGER NOT NULL,
            PRIMARY KEY (entity_id, document_id)
        );

        -- Indexes for common queries
        CREATE INDEX idx_documents_entity ON documents(entity_id);
        CREATE INDEX idx_grants_user ON grants(user);
        CREATE INDEX idx_audit_log_user ON audit_log(user);
        CREATE INDEX idx_audit_log_timestamp ON audit_log(timestamp);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"entities".to_string()));
        assert!(tables.contains(&"documents".to_string()));
        assert!(tables.contains(&"grants".to_string()));
        assert!(tables.contains(&"audit_log".to_string()));
        assert!(tables.contains(&"audit_counters".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap(); // Should not error
        migrate(&mut conn).unwrap(); // Still should not error

        let version: u32 = conn
            .query_row(
                "SELECT MAX(version) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, 1);
    }
}
