//! The Registry: the public operation surface of Covault.
//!
//! Every state-changing operation runs its precondition checks in a fixed
//! order (existence, then authorization, then uniqueness/range) before the
//! first write, holds one exclusive critical section for its whole span,
//! and concludes with exactly one audit append on success. A failed
//! operation writes nothing, audit log included.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use covault_core::{
    AccountId, AuditAction, AuditEntry, Clock, Detail, Document, DocumentFields, DocumentId,
    Entity, EntityId, Name, NewAuditEntry, SystemClock,
};
use covault_perms::{access, PermissionGrant, PermissionLevel};
use covault_store::Store;

use crate::error::{RegistryError, Result};

/// The main Registry struct.
///
/// Provides the public API for:
/// - Registering entities
/// - Adding, updating, and soft-deleting documents
/// - Granting and revoking document permissions
/// - Logged document access and the read-only queries
pub struct Registry<S: Store> {
    /// The storage backend.
    store: Arc<S>,
    /// The host time source.
    clock: Arc<dyn Clock>,
    /// Serializes all state-changing operations. Held across the full
    /// check-then-mutate span so no partial effects interleave.
    write_lock: Mutex<()>,
}

impl<S: Store> Registry<S> {
    /// Create a registry on the system clock.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a registry with an injected clock.
    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(store),
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entity Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a new entity owned by `caller`.
    ///
    /// Registration is never idempotent: a second call under the same id
    /// fails with `EntityAlreadyExists` whatever the other fields say, and
    /// never merges or overwrites.
    ///
    /// No audit entry is written: the audit log is keyed per
    /// (entity, document), and registration has no document.
    pub async fn register_entity(
        &self,
        id: EntityId,
        name: Name,
        caller: AccountId,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if self.store.get_entity(&id).await?.is_some() {
            return Err(RegistryError::EntityAlreadyExists(id));
        }

        let entity = Entity::register(id, caller, name, self.clock.now());
        self.store.put_entity(&entity).await?;

        info!(entity = %entity.id, owner = %entity.owner, "entity registered");
        Ok(())
    }

    /// Look up an entity. Unauthenticated, unlogged.
    pub async fn entity(&self, id: &EntityId) -> Result<Option<Entity>> {
        Ok(self.store.get_entity(id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register a document under an entity.
    ///
    /// Only the entity owner may originate documents; this is stricter than
    /// the general permission check because creation establishes a new
    /// collateral instance. The creator receives an explicit Owner grant,
    /// and one Create audit entry is appended.
    pub async fn add_document(
        &self,
        entity_id: EntityId,
        document_id: DocumentId,
        fields: DocumentFields,
        caller: AccountId,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let entity = self
            .store
            .get_entity(&entity_id)
            .await?
            .ok_or_else(|| RegistryError::EntityNotFound(entity_id.clone()))?;
        if !entity.is_owner(&caller) {
            debug!(entity = %entity_id, document = %document_id, "add refused");
            return Err(RegistryError::NotAuthorized);
        }
        if self
            .store
            .get_document(&entity_id, &document_id)
            .await?
            .is_some()
        {
            return Err(RegistryError::DocumentAlreadyRegistered(
                entity_id,
                document_id,
            ));
        }

        let now = self.clock.now();
        let document = Document::create(entity_id.clone(), document_id.clone(), fields, now);
        self.store.put_document(&document).await?;

        let grant =
            PermissionGrant::creation_grant(entity_id.clone(), document_id.clone(), caller.clone(), now);
        self.store.put_grant(&grant).await?;

        let details = Detail::clamp(format!("registered {}", document.name));
        let entry = self
            .append_audit(entity_id, document_id, caller, AuditAction::Create, now, details)
            .await?;
        info!(
            entity = %entry.entity_id,
            document = %entry.document_id,
            log_id = entry.log_id,
            "document added"
        );
        Ok(())
    }

    /// Replace a document's mutable fields.
    ///
    /// Requires at least Manage. Increments the version by exactly one,
    /// refreshes `last_modified_at`, preserves `created_at`, and appends one
    /// Update audit entry.
    ///
    /// A soft-deleted document still accepts updates; there is no
    /// reactivation path.
    pub async fn update_document(
        &self,
        entity_id: EntityId,
        document_id: DocumentId,
        fields: DocumentFields,
        caller: AccountId,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut document = self
            .store
            .get_document(&entity_id, &document_id)
            .await?
            .ok_or_else(|| {
                RegistryError::DocumentNotFound(entity_id.clone(), document_id.clone())
            })?;
        if !self
            .has_permission(&entity_id, &document_id, &caller, PermissionLevel::Manage)
            .await?
        {
            debug!(entity = %entity_id, document = %document_id, "update refused");
            return Err(RegistryError::NotAuthorized);
        }

        let now = self.clock.now();
        document.apply_update(fields, now);
        self.store.put_document(&document).await?;

        let details = Detail::clamp(format!("version {}", document.version));
        let entry = self
            .append_audit(entity_id, document_id, caller, AuditAction::Update, now, details)
            .await?;
        info!(
            entity = %entry.entity_id,
            document = %entry.document_id,
            version = document.version,
            log_id = entry.log_id,
            "document updated"
        );
        Ok(())
    }

    /// Soft-delete a document.
    ///
    /// Requires at least Admin. Flips `active` to false, retains the record,
    /// its history, and its grants, and appends one Delete audit entry.
    /// There is no undelete.
    pub async fn delete_document(
        &self,
        entity_id: EntityId,
        document_id: DocumentId,
        caller: AccountId,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut document = self
            .store
            .get_document(&entity_id, &document_id)
            .await?
            .ok_or_else(|| {
                RegistryError::DocumentNotFound(entity_id.clone(), document_id.clone())
            })?;
        if !self
            .has_permission(&entity_id, &document_id, &caller, PermissionLevel::Admin)
            .await?
        {
            debug!(entity = %entity_id, document = %document_id, "delete refused");
            return Err(RegistryError::NotAuthorized);
        }

        let now = self.clock.now();
        document.mark_deleted();
        self.store.put_document(&document).await?;

        let entry = self
            .append_audit(
                entity_id,
                document_id,
                caller,
                AuditAction::Delete,
                now,
                Detail::clamp("deactivated"),
            )
            .await?;
        info!(
            entity = %entry.entity_id,
            document = %entry.document_id,
            log_id = entry.log_id,
            "document deleted"
        );
        Ok(())
    }

    /// Look up a document. Unauthenticated, unlogged.
    ///
    /// This is the free-form read path. The gated, logged read path is
    /// [`Registry::access_document`]; the two are deliberately distinct and
    /// must stay so; the audit trail's completeness depends on logged
    /// access being an intentionally invoked action.
    pub async fn document(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
    ) -> Result<Option<Document>> {
        Ok(self.store.get_document(entity_id, document_id).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Permission Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant `user` a permission level on a document.
    ///
    /// Requires at least Admin. The level must lie in [View, Admin]: Owner
    /// is reserved for the creation grant and None is represented by
    /// absence, so neither can be granted here. Overwrites any prior grant
    /// for the same user and appends one Share audit entry.
    pub async fn grant_permission(
        &self,
        entity_id: EntityId,
        document_id: DocumentId,
        user: AccountId,
        level: PermissionLevel,
        caller: AccountId,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if self
            .store
            .get_document(&entity_id, &document_id)
            .await?
            .is_none()
        {
            return Err(RegistryError::DocumentNotFound(entity_id, document_id));
        }
        if !self
            .has_permission(&entity_id, &document_id, &caller, PermissionLevel::Admin)
            .await?
        {
            debug!(entity = %entity_id, document = %document_id, "grant refused");
            return Err(RegistryError::NotAuthorized);
        }
        if !level.is_grantable() {
            return Err(RegistryError::InvalidPermissionLevel(level));
        }

        let now = self.clock.now();
        let grant = PermissionGrant::new(
            entity_id.clone(),
            document_id.clone(),
            user.clone(),
            level,
            caller.clone(),
            now,
        );
        self.store.put_grant(&grant).await?;

        let details = Detail::clamp(format!("granted {} to {}", level, user));
        let entry = self
            .append_audit(entity_id, document_id, caller, AuditAction::Share, now, details)
            .await?;
        info!(
            entity = %entry.entity_id,
            document = %entry.document_id,
            user = %user,
            level = %level,
            log_id = entry.log_id,
            "permission granted"
        );
        Ok(())
    }

    /// Revoke `user`'s stored grant on a document.
    ///
    /// Requires at least Admin. Revoking an absent grant is a no-op, not an
    /// error; either way one Share audit entry is appended. Note the entity
    /// owner's access is dynamic and survives any revocation.
    pub async fn revoke_permission(
        &self,
        entity_id: EntityId,
        document_id: DocumentId,
        user: AccountId,
        caller: AccountId,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if self
            .store
            .get_document(&entity_id, &document_id)
            .await?
            .is_none()
        {
            return Err(RegistryError::DocumentNotFound(entity_id, document_id));
        }
        if !self
            .has_permission(&entity_id, &document_id, &caller, PermissionLevel::Admin)
            .await?
        {
            debug!(entity = %entity_id, document = %document_id, "revoke refused");
            return Err(RegistryError::NotAuthorized);
        }

        let now = self.clock.now();
        self.store
            .delete_grant(&entity_id, &document_id, &user)
            .await?;

        let details = Detail::clamp(format!("revoked {}", user));
        let entry = self
            .append_audit(entity_id, document_id, caller, AuditAction::Share, now, details)
            .await?;
        info!(
            entity = %entry.entity_id,
            document = %entry.document_id,
            user = %user,
            log_id = entry.log_id,
            "permission revoked"
        );
        Ok(())
    }

    /// The effective permission level `user` holds on a document.
    ///
    /// Owner for the entity owner, the stored grant's level otherwise, None
    /// when nothing applies. Never a domain error.
    pub async fn user_permission(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        user: &AccountId,
    ) -> Result<PermissionLevel> {
        let entity = self.store.get_entity(entity_id).await?;
        let grant = self.store.get_grant(entity_id, document_id, user).await?;
        Ok(access::effective_level(entity.as_ref(), grant.as_ref(), user))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Access & Audit Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// The gated, logged read path.
    ///
    /// Requires at least View; fails `NoAccess` otherwise. Its only effect
    /// is one View audit entry; the point of the operation is to make read
    /// access auditable.
    pub async fn access_document(
        &self,
        entity_id: EntityId,
        document_id: DocumentId,
        caller: AccountId,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if self
            .store
            .get_document(&entity_id, &document_id)
            .await?
            .is_none()
        {
            return Err(RegistryError::DocumentNotFound(entity_id, document_id));
        }
        if !self
            .has_permission(&entity_id, &document_id, &caller, PermissionLevel::View)
            .await?
        {
            debug!(entity = %entity_id, document = %document_id, "access refused");
            return Err(RegistryError::NoAccess);
        }

        let now = self.clock.now();
        let entry = self
            .append_audit(
                entity_id,
                document_id,
                caller,
                AuditAction::View,
                now,
                Detail::clamp("viewed"),
            )
            .await?;
        debug!(
            entity = %entry.entity_id,
            document = %entry.document_id,
            log_id = entry.log_id,
            "document accessed"
        );
        Ok(())
    }

    /// Look up an audit entry by log id. Unauthenticated, unlogged.
    pub async fn audit_entry(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        log_id: u64,
    ) -> Result<Option<AuditEntry>> {
        Ok(self
            .store
            .get_audit_entry(entity_id, document_id, log_id)
            .await?)
    }

    /// Whether `user` holds at least `required` on a document.
    ///
    /// Loads the entity and the stored grant and defers to the evaluator;
    /// the owner-bypass rule lives there and nowhere else. Authorization is
    /// always "at least this level", never an exact match.
    pub async fn has_permission(
        &self,
        entity_id: &EntityId,
        document_id: &DocumentId,
        user: &AccountId,
        required: PermissionLevel,
    ) -> Result<bool> {
        let entity = self.store.get_entity(entity_id).await?;
        let grant = self.store.get_grant(entity_id, document_id, user).await?;
        Ok(access::meets(entity.as_ref(), grant.as_ref(), user, required))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Append one audit entry; the store assigns the log id.
    async fn append_audit(
        &self,
        entity_id: EntityId,
        document_id: DocumentId,
        user: AccountId,
        action: AuditAction,
        timestamp: i64,
        details: Detail,
    ) -> Result<AuditEntry> {
        let entry = NewAuditEntry {
            entity_id,
            document_id,
            user,
            action,
            timestamp,
            details,
        };
        Ok(self.store.append_audit(entry).await?)
    }
}
