//! The access evaluator.
//!
//! A pure function over an entity record and a stored grant. The owner
//! bypass lives here and only here: no operation re-derives the ownership
//! rule inline.

use covault_core::{AccountId, Entity};

use crate::grant::PermissionGrant;
use crate::level::PermissionLevel;

/// Decide whether `user` holds at least `required` on a document.
///
/// Rules, in order:
/// 1. No entity, no access.
/// 2. The entity owner passes unconditionally, stored grant or not.
/// 3. Otherwise the stored grant's level must satisfy `held >= required`;
///    an absent grant never satisfies, whatever `required` is.
pub fn meets(
    entity: Option<&Entity>,
    grant: Option<&PermissionGrant>,
    user: &AccountId,
    required: PermissionLevel,
) -> bool {
    let Some(entity) = entity else {
        return false;
    };
    if entity.is_owner(user) {
        return true;
    }
    grant.map_or(false, |g| g.level >= required)
}

/// The effective level `user` holds on a document.
///
/// Owner for the entity owner, the stored grant's level otherwise, None
/// when the entity or the grant is absent.
pub fn effective_level(
    entity: Option<&Entity>,
    grant: Option<&PermissionGrant>,
    user: &AccountId,
) -> PermissionLevel {
    match entity {
        None => PermissionLevel::None,
        Some(entity) if entity.is_owner(user) => PermissionLevel::Owner,
        Some(_) => grant.map_or(PermissionLevel::None, |g| g.level),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covault_core::{DocumentId, EntityId, Name};
    use proptest::prelude::*;

    fn account(name: &str) -> AccountId {
        AccountId::new(name).unwrap()
    }

    fn entity(owner: &str) -> Entity {
        Entity::register(
            EntityId::new("e1").unwrap(),
            account(owner),
            Name::new("Acme").unwrap(),
            1_000,
        )
    }

    fn grant(user: &str, level: PermissionLevel) -> PermissionGrant {
        PermissionGrant::new(
            EntityId::new("e1").unwrap(),
            DocumentId::new("d1").unwrap(),
            account(user),
            level,
            account("alice"),
            1_000,
        )
    }

    #[test]
    fn test_owner_passes_without_grant() {
        let entity = entity("alice");
        let alice = account("alice");
        assert!(meets(Some(&entity), None, &alice, PermissionLevel::Owner));
        assert_eq!(
            effective_level(Some(&entity), None, &alice),
            PermissionLevel::Owner
        );
    }

    #[test]
    fn test_grant_satisfies_at_or_below_its_level() {
        let entity = entity("alice");
        let bob = account("bob");
        let grant = grant("bob", PermissionLevel::Manage);

        assert!(meets(Some(&entity), Some(&grant), &bob, PermissionLevel::View));
        assert!(meets(Some(&entity), Some(&grant), &bob, PermissionLevel::Manage));
        assert!(!meets(Some(&entity), Some(&grant), &bob, PermissionLevel::Admin));
    }

    #[test]
    fn test_absent_grant_denies_even_for_none() {
        let entity = entity("alice");
        let bob = account("bob");
        assert!(!meets(Some(&entity), None, &bob, PermissionLevel::None));
        assert_eq!(
            effective_level(Some(&entity), None, &bob),
            PermissionLevel::None
        );
    }

    #[test]
    fn test_absent_entity_denies_everyone() {
        let alice = account("alice");
        let grant = grant("alice", PermissionLevel::Admin);
        assert!(!meets(None, Some(&grant), &alice, PermissionLevel::View));
        assert_eq!(
            effective_level(None, Some(&grant), &alice),
            PermissionLevel::None
        );
    }

    proptest! {
        /// Passing at some level implies passing at every lower level.
        #[test]
        fn prop_meets_is_downward_closed(held in 1..=3u8, required in 0..=4u8) {
            let entity = entity("alice");
            let bob = account("bob");
            let held = PermissionLevel::from_u8(held).unwrap();
            let required = PermissionLevel::from_u8(required).unwrap();
            let grant = grant("bob", held);

            let passes = meets(Some(&entity), Some(&grant), &bob, required);
            prop_assert_eq!(passes, held >= required);
        }
    }
}
