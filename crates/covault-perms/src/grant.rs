//! Permission grants.
//!
//! A grant is keyed by the (entity, document, user) triple; at most one is
//! active per triple. Granting overwrites, revoking deletes. The entity
//! owner never needs a stored grant; the evaluator handles ownership
//! dynamically.

use serde::{Deserialize, Serialize};

use covault_core::{AccountId, DocumentId, EntityId};

use crate::level::PermissionLevel;

/// A stored permission grant on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// The entity the document belongs to.
    pub entity_id: EntityId,

    /// The document the grant applies to.
    pub document_id: DocumentId,

    /// The account holding the grant.
    pub user: AccountId,

    /// The granted capability tier.
    pub level: PermissionLevel,

    /// Who issued the grant.
    pub granted_by: AccountId,

    /// When the grant was issued (Unix ms, host clock).
    pub granted_at: i64,
}

impl PermissionGrant {
    /// Create a grant issued by `granted_by`.
    pub fn new(
        entity_id: EntityId,
        document_id: DocumentId,
        user: AccountId,
        level: PermissionLevel,
        granted_by: AccountId,
        granted_at: i64,
    ) -> Self {
        Self {
            entity_id,
            document_id,
            user,
            level,
            granted_by,
            granted_at,
        }
    }

    /// The explicit Owner grant written for a document's creator at
    /// creation time. This is the only path that stores an Owner level.
    pub fn creation_grant(
        entity_id: EntityId,
        document_id: DocumentId,
        creator: AccountId,
        granted_at: i64,
    ) -> Self {
        Self {
            entity_id,
            document_id,
            user: creator.clone(),
            level: PermissionLevel::Owner,
            granted_by: creator,
            granted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_grant_is_owner_and_self_issued() {
        let grant = PermissionGrant::creation_grant(
            EntityId::new("e1").unwrap(),
            DocumentId::new("d1").unwrap(),
            AccountId::new("alice").unwrap(),
            1_000,
        );

        assert_eq!(grant.level, PermissionLevel::Owner);
        assert_eq!(grant.user, grant.granted_by);
        assert_eq!(grant.granted_at, 1_000);
    }
}
