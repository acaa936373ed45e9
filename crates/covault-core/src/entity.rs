//! Entity: a registered collateral-owning organization.

use serde::{Deserialize, Serialize};

use crate::types::{AccountId, EntityId, Name};

/// A collateral entity record.
///
/// Created once at registration and immutable afterwards except for the
/// `active` flag. The owner never changes; ownership of the entity implies
/// full access to every document registered under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Primary key.
    pub id: EntityId,

    /// The account that registered the entity. Never changes.
    pub owner: AccountId,

    /// Display name.
    pub name: Name,

    /// When the entity was registered (Unix ms, host clock).
    pub registered_at: i64,

    /// Whether the entity is active.
    pub active: bool,
}

impl Entity {
    /// Create a freshly registered entity owned by `owner`.
    pub fn register(id: EntityId, owner: AccountId, name: Name, registered_at: i64) -> Self {
        Self {
            id,
            owner,
            name,
            registered_at,
            active: true,
        }
    }

    /// Check whether `user` is the entity owner.
    pub fn is_owner(&self, user: &AccountId) -> bool {
        self.owner == *user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> Entity {
        Entity::register(
            EntityId::new("e1").unwrap(),
            AccountId::new("alice").unwrap(),
            Name::new("Acme").unwrap(),
            1_736_870_400_000,
        )
    }

    #[test]
    fn test_register_sets_active() {
        let entity = acme();
        assert!(entity.active);
        assert_eq!(entity.registered_at, 1_736_870_400_000);
    }

    #[test]
    fn test_is_owner() {
        let entity = acme();
        assert!(entity.is_owner(&AccountId::new("alice").unwrap()));
        assert!(!entity.is_owner(&AccountId::new("bob").unwrap()));
    }
}
