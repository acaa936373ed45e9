//! Proptest strategies for Covault domain types.

use proptest::prelude::*;

use covault_core::{
    AccountId, AuditAction, ContentHash, Detail, DocType, DocumentFields, DocumentId, EntityId,
    Name,
};
use covault_perms::PermissionLevel;

/// An in-bounds ASCII identifier string.
pub fn arb_id_string() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,62}"
}

/// An arbitrary entity id.
pub fn arb_entity_id() -> impl Strategy<Value = EntityId> {
    arb_id_string().prop_map(|s| EntityId::new(s).expect("generated ids are in bounds"))
}

/// An arbitrary document id.
pub fn arb_document_id() -> impl Strategy<Value = DocumentId> {
    arb_id_string().prop_map(|s| DocumentId::new(s).expect("generated ids are in bounds"))
}

/// An arbitrary account id.
pub fn arb_account_id() -> impl Strategy<Value = AccountId> {
    arb_id_string().prop_map(|s| AccountId::new(s).expect("generated ids are in bounds"))
}

/// Any permission level, None through Owner.
pub fn arb_level() -> impl Strategy<Value = PermissionLevel> {
    (0..=4u8).prop_map(|v| PermissionLevel::from_u8(v).expect("0..=4 are valid levels"))
}

/// A level a grant may carry: View, Manage, or Admin.
pub fn arb_grantable_level() -> impl Strategy<Value = PermissionLevel> {
    (1..=3u8).prop_map(|v| PermissionLevel::from_u8(v).expect("1..=3 are valid levels"))
}

/// Any audit action.
pub fn arb_action() -> impl Strategy<Value = AuditAction> {
    (1..=5u8).prop_map(|v| AuditAction::from_u8(v).expect("1..=5 are valid actions"))
}

/// An arbitrary content hash.
pub fn arb_content_hash() -> impl Strategy<Value = ContentHash> {
    any::<[u8; 32]>().prop_map(ContentHash::from_bytes)
}

/// An arbitrary in-bounds document field set.
pub fn arb_document_fields() -> impl Strategy<Value = DocumentFields> {
    (
        "[ -~]{1,64}",
        ".{0,120}",
        arb_content_hash(),
        "[a-z]{1,16}",
    )
        .prop_map(|(name, description, content_hash, doc_type)| DocumentFields {
            name: Name::new(name).expect("generated names are in bounds"),
            description: Detail::new(description).expect("generated details are in bounds"),
            content_hash,
            doc_type: DocType::new(doc_type).expect("generated doc types are in bounds"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_generated_levels_are_valid(level in arb_level()) {
            prop_assert!(PermissionLevel::from_u8(level.to_u8()).is_some());
        }

        #[test]
        fn prop_grantable_levels_are_grantable(level in arb_grantable_level()) {
            prop_assert!(level.is_grantable());
        }

        #[test]
        fn prop_generated_fields_stay_in_bounds(fields in arb_document_fields()) {
            prop_assert!(fields.name.as_str().len() <= 256);
            prop_assert!(fields.doc_type.as_str().len() <= 64);
        }

        #[test]
        fn prop_generated_ids_distinct_types_share_grammar(
            entity in arb_entity_id(),
            document in arb_document_id(),
        ) {
            prop_assert!(entity.as_str().is_ascii());
            prop_assert!(document.as_str().is_ascii());
        }
    }
}
