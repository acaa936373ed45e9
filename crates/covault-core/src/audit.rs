//! Audit entries: the append-only record of actions against documents.
//!
//! An entry is immutable once written. Ids are assigned per
//! (entity, document) pair from a counter that starts at 1 and never skips
//! or reuses a value.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{AccountId, Detail, DocumentId, EntityId};

/// The action an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AuditAction {
    /// Document registered.
    Create = 1,
    /// Document read through the gated access path.
    View = 2,
    /// Document fields replaced.
    Update = 3,
    /// Permission granted or revoked.
    Share = 4,
    /// Document soft-deleted.
    Delete = 5,
}

impl AuditAction {
    /// Convert to u8 for serialization.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Create),
            2 => Some(Self::View),
            3 => Some(Self::Update),
            4 => Some(Self::Share),
            5 => Some(Self::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Create => "create",
            Self::View => "view",
            Self::Update => "update",
            Self::Share => "share",
            Self::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// An audit entry awaiting its log id.
///
/// The store assigns the id from the per-pair counter when the entry is
/// appended; see `Store::append_audit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuditEntry {
    pub entity_id: EntityId,
    pub document_id: DocumentId,
    pub user: AccountId,
    pub action: AuditAction,
    pub timestamp: i64,
    pub details: Detail,
}

impl NewAuditEntry {
    /// Finalize with the assigned log id.
    pub fn into_entry(self, log_id: u64) -> AuditEntry {
        AuditEntry {
            entity_id: self.entity_id,
            document_id: self.document_id,
            log_id,
            user: self.user,
            action: self.action,
            timestamp: self.timestamp,
            details: self.details,
        }
    }
}

/// An immutable audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The entity the document belongs to.
    pub entity_id: EntityId,

    /// The document acted on.
    pub document_id: DocumentId,

    /// Position in the per-(entity, document) log, starting at 1.
    pub log_id: u64,

    /// Who performed the action.
    pub user: AccountId,

    /// What was done.
    pub action: AuditAction,

    /// When (Unix ms, host clock).
    pub timestamp: i64,

    /// Free-form context for the action.
    pub details: Detail,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_roundtrip() {
        for action in [
            AuditAction::Create,
            AuditAction::View,
            AuditAction::Update,
            AuditAction::Share,
            AuditAction::Delete,
        ] {
            assert_eq!(AuditAction::from_u8(action.to_u8()), Some(action));
        }
    }

    #[test]
    fn test_action_rejects_unknown_values() {
        assert_eq!(AuditAction::from_u8(0), None);
        assert_eq!(AuditAction::from_u8(6), None);
        assert_eq!(AuditAction::from_u8(255), None);
    }

    #[test]
    fn test_into_entry_carries_fields() {
        let new_entry = NewAuditEntry {
            entity_id: EntityId::new("e1").unwrap(),
            document_id: DocumentId::new("d1").unwrap(),
            user: AccountId::new("alice").unwrap(),
            action: AuditAction::Create,
            timestamp: 1_000,
            details: Detail::new("registered").unwrap(),
        };

        let entry = new_entry.into_entry(7);
        assert_eq!(entry.log_id, 7);
        assert_eq!(entry.action, AuditAction::Create);
        assert_eq!(entry.user.as_str(), "alice");
    }

    #[test]
    fn test_entry_serde_roundtrip() {
        let entry = NewAuditEntry {
            entity_id: EntityId::new("e1").unwrap(),
            document_id: DocumentId::new("d1").unwrap(),
            user: AccountId::new("alice").unwrap(),
            action: AuditAction::Share,
            timestamp: 42,
            details: Detail::new("granted view to bob").unwrap(),
        }
        .into_entry(3);

        let json = serde_json::to_string(&entry).unwrap();
        let recovered: AuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, recovered);
    }
}
