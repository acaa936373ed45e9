//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite but
//! keeps everything in memory with no persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use covault_core::{AccountId, AuditEntry, Document, DocumentId, Entity, EntityId, NewAuditEntry};
use covault_perms::PermissionGrant;

use crate::error::Result;
use crate::traits::Store;

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    /// Entities indexed by id.
    entities: HashMap<EntityId, Entity>,

    /// Documents indexed by (entity, document).
    documents: HashMap<(EntityId, DocumentId), Document>,

    /// Grants indexed by (entity, document, user).
    grants: HashMap<(EntityId, DocumentId, AccountId), PermissionGrant>,

    /// Audit entries indexed by (entity, document, log id).
    audit_entries: HashMap<(EntityId, DocumentId, u64), AuditEntry>,

    /// Next log id per (entity, document). Absent means 1.
    audit_counters: HashMap<(EntityId, DocumentId), u64>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                entities: HashMap::new(),
                documents: HashMap::new(),
                grants: HashMap::new(),
                audit_entries: HashMap::new(),
                audit_counters: HashMap::new(),
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_entity(&self, id: &EntityId) -> Result<Option<Entity>> {
        let inner = self.inner.read().unwrap();
        Ok(inner.entities.get(id).cloned())
    }

    async fn put_entity(&self, entity: &Entity) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.entities.insert(entity.id.clone(), entity.clone());
        Ok(())
    }

    async fn get_document(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
    ) -> Result<Option<Document>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .documents
            .get(&(entity_id.clone(), document_id.clone()))
            .cloned())
    }

    async fn put_document(&self, document: &Document) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.documents.insert(
            (document.entity_id.clone(), document.document_id.clone()),
            document.clone(),
        );
        Ok(())
    }

    async fn get_grant(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        user: &AccountId,
    ) -> Result<Option<PermissionGrant>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .grants
            .get(&(entity_id.clone(), document_id.clone(), user.clone()))
            .cloned())
    }

    async fn put_grant(&self, grant: &PermissionGrant) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner.grants.insert(
            (
                grant.entity_id.clone(),
                grant.document_id.clone(),
                grant.user.clone(),
            ),
            grant.clone(),
        );
        Ok(())
    }

    async fn delete_grant(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        user: &AccountId,
    ) -> Result<()> {
        let mut inner = self.inner.write().unwrap();
        inner
            .grants
            .remove(&(entity_id.clone(), document_id.clone(), user.clone()));
        Ok(())
    }

    async fn append_audit(&self, entry: NewAuditEntry) -> Result<AuditEntry> {
        // Counter read, entry write, and counter advance all happen under
        // one write lock; they cannot diverge.
        let mut inner = self.inner.write().unwrap();

        let pair = (entry.entity_id.clone(), entry.document_id.clone());
        let log_id = inner.audit_counters.get(&pair).copied().unwrap_or(1);

        let entry = entry.into_entry(log_id);
        inner
            .audit_entries
            .insert((pair.0.clone(), pair.1.clone(), log_id), entry.clone());
        inner.audit_counters.insert(pair, log_id + 1);

        Ok(entry)
    }

    async fn get_audit_entry(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        log_id: u64,
    ) -> Result<Option<AuditEntry>> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .audit_entries
            .get(&(entity_id.clone(), document_id.clone(), log_id))
            .cloned())
    }

    async fn audit_counter(&self, entity_id: &EntityId, document_id: &DocumentId) -> Result<u64> {
        let inner = self.inner.read().unwrap();
        Ok(inner
            .audit_counters
            .get(&(entity_id.clone(), document_id.clone()))
            .copied()
            .unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covault_core::{AuditAction, Detail, DocType, DocumentFields, ContentHash, Name};
    use covault_perms::PermissionLevel;

    fn entity_id() -> EntityId {
        EntityId::new("e1").unwrap()
    }

    fn document_id() -> DocumentId {
        DocumentId::new("d1").unwrap()
    }

    fn account(name: &str) -> AccountId {
        AccountId::new(name).unwrap()
    }

    fn make_document() -> Document {
        Document::create(
            entity_id(),
            document_id(),
            DocumentFields {
                name: Name::new("Collateral Agreement").unwrap(),
                description: Detail::new("loan 7").unwrap(),
                content_hash: ContentHash::digest(b"content"),
                doc_type: DocType::new("pdf").unwrap(),
            },
            1_000,
        )
    }

    fn make_audit(action: AuditAction) -> NewAuditEntry {
        NewAuditEntry {
            entity_id: entity_id(),
            document_id: document_id(),
            user: account("alice"),
            action,
            timestamp: 1_000,
            details: Detail::empty(),
        }
    }

    #[tokio::test]
    async fn test_entity_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get_entity(&entity_id()).await.unwrap().is_none());

        let entity = Entity::register(
            entity_id(),
            account("alice"),
            Name::new("Acme").unwrap(),
            1_000,
        );
        store.put_entity(&entity).await.unwrap();

        let found = store.get_entity(&entity_id()).await.unwrap().unwrap();
        assert_eq!(found, entity);
    }

    #[tokio::test]
    async fn test_document_roundtrip() {
        let store = MemoryStore::new();
        let document = make_document();
        store.put_document(&document).await.unwrap();

        let found = store
            .get_document(&entity_id(), &document_id())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.version, 1);
    }

    #[tokio::test]
    async fn test_put_grant_overwrites() {
        let store = MemoryStore::new();
        let bob = account("bob");

        let view = PermissionGrant::new(
            entity_id(),
            document_id(),
            bob.clone(),
            PermissionLevel::View,
            account("alice"),
            1_000,
        );
        store.put_grant(&view).await.unwrap();

        let manage = PermissionGrant::new(
            entity_id(),
            document_id(),
            bob.clone(),
            PermissionLevel::Manage,
            account("alice"),
            2_000,
        );
        store.put_grant(&manage).await.unwrap();

        let found = store
            .get_grant(&entity_id(), &document_id(), &bob)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.level, PermissionLevel::Manage);
    }

    #[tokio::test]
    async fn test_delete_absent_grant_is_noop() {
        let store = MemoryStore::new();
        store
            .delete_grant(&entity_id(), &document_id(), &account("bob"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_audit_ids_are_contiguous() {
        let store = MemoryStore::new();
        assert_eq!(
            store.audit_counter(&entity_id(), &document_id()).await.unwrap(),
            1
        );

        let e1 = store.append_audit(make_audit(AuditAction::Create)).await.unwrap();
        let e2 = store.append_audit(make_audit(AuditAction::Share)).await.unwrap();
        let e3 = store.append_audit(make_audit(AuditAction::View)).await.unwrap();

        assert_eq!((e1.log_id, e2.log_id, e3.log_id), (1, 2, 3));
        assert_eq!(
            store.audit_counter(&entity_id(), &document_id()).await.unwrap(),
            4
        );

        let found = store
            .get_audit_entry(&entity_id(), &document_id(), 2)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.action, AuditAction::Share);
    }

    #[tokio::test]
    async fn test_counters_are_per_pair() {
        let store = MemoryStore::new();
        store.append_audit(make_audit(AuditAction::Create)).await.unwrap();

        let other = DocumentId::new("d2").unwrap();
        let mut entry = make_audit(AuditAction::Create);
        entry.document_id = other.clone();
        let appended = store.append_audit(entry).await.unwrap();

        assert_eq!(appended.log_id, 1);
        assert_eq!(store.audit_counter(&entity_id(), &document_id()).await.unwrap(), 2);
        assert_eq!(store.audit_counter(&entity_id(), &other).await.unwrap(), 2);
    }
}
