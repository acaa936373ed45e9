//! Store trait: the abstract interface over the five key-spaces.
//!
//! This trait keeps the registry storage-agnostic. Implementations include
//! SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use covault_core::{AccountId, AuditEntry, Document, DocumentId, Entity, EntityId, NewAuditEntry};
use covault_perms::PermissionGrant;

use crate::error::Result;

/// The Store trait: async interface over entities, documents, grants, and
/// the audit log.
///
/// All methods are async so SQLite can run behind `spawn_blocking` without
/// blocking the runtime.
///
/// # Design Notes
///
/// - **Five key-spaces**: entities (by id), documents (by entity+document),
///   grants (by entity+document+user), audit entries (by
///   entity+document+log id), audit counters (by entity+document). Each is
///   plain get/set/delete; uniqueness and authorization decisions belong to
///   the registry.
/// - **Upsert puts**: `put_grant` overwrites the grant for its triple; the
///   grant-overwrite rule is a store-level property.
/// - **Atomic audit append**: [`Store::append_audit`] reads the per-pair
///   counter (default 1), writes the entry under that id, and advances the
///   counter to id+1 in one atomic step. An entry at id N implies the
///   counter reads N+1; no id is ever reused or skipped.
#[async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Entity Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get an entity by id.
    async fn get_entity(&self, id: &EntityId) -> Result<Option<Entity>>;

    /// Insert or replace an entity record.
    async fn put_entity(&self, entity: &Entity) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a document by its (entity, document) key.
    async fn get_document(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
    ) -> Result<Option<Document>>;

    /// Insert or replace a document record.
    async fn put_document(&self, document: &Document) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Grant Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the stored grant for a (entity, document, user) triple.
    async fn get_grant(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        user: &AccountId,
    ) -> Result<Option<PermissionGrant>>;

    /// Insert or replace the grant for its triple.
    async fn put_grant(&self, grant: &PermissionGrant) -> Result<()>;

    /// Delete the grant for a triple. Deleting an absent grant is a no-op.
    async fn delete_grant(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        user: &AccountId,
    ) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Audit Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append an audit entry, assigning the next log id for its
    /// (entity, document) pair. Returns the finalized entry.
    async fn append_audit(&self, entry: NewAuditEntry) -> Result<AuditEntry>;

    /// Get an audit entry by (entity, document, log id).
    async fn get_audit_entry(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        log_id: u64,
    ) -> Result<Option<AuditEntry>>;

    /// The next log id that would be assigned for a pair (1 if nothing has
    /// been appended yet).
    async fn audit_counter(&self, entity_id: &EntityId, document_id: &DocumentId) -> Result<u64>;
}
