//! Document: a tracked reference to an off-system collateral artifact.
//!
//! A document carries metadata and a 32-byte content digest, never the
//! content itself. Records are versioned: every update increments `version`
//! by exactly one and refreshes `last_modified_at`, while `created_at` is
//! fixed at creation.

use serde::{Deserialize, Serialize};

use crate::types::{ContentHash, Detail, DocType, DocumentId, EntityId, Name};

/// The caller-supplied field set of a document.
///
/// These are the fields replaced wholesale by an update; everything else on
/// [`Document`] is bookkeeping the store owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFields {
    /// Display name.
    pub name: Name,

    /// Free-form description.
    pub description: Detail,

    /// Digest of the document content.
    pub content_hash: ContentHash,

    /// Type tag ("pdf", "deed", ...).
    pub doc_type: DocType,
}

/// A document record, keyed by (entity id, document id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// The owning entity.
    pub entity_id: EntityId,

    /// Document id, unique within the entity.
    pub document_id: DocumentId,

    /// Display name.
    pub name: Name,

    /// Free-form description.
    pub description: Detail,

    /// Digest of the document content.
    pub content_hash: ContentHash,

    /// Type tag.
    pub doc_type: DocType,

    /// When the document was first registered (Unix ms). Never changes.
    pub created_at: i64,

    /// When the document was last updated (Unix ms).
    pub last_modified_at: i64,

    /// Version counter, 1 at creation, +1 per successful update. No gaps.
    pub version: u64,

    /// False once soft-deleted. The record and its history are retained.
    pub active: bool,
}

impl Document {
    /// Create a new version-1 document.
    pub fn create(
        entity_id: EntityId,
        document_id: DocumentId,
        fields: DocumentFields,
        now: i64,
    ) -> Self {
        Self {
            entity_id,
            document_id,
            name: fields.name,
            description: fields.description,
            content_hash: fields.content_hash,
            doc_type: fields.doc_type,
            created_at: now,
            last_modified_at: now,
            version: 1,
            active: true,
        }
    }

    /// Replace the mutable fields and advance the version.
    pub fn apply_update(&mut self, fields: DocumentFields, now: i64) {
        self.name = fields.name;
        self.description = fields.description;
        self.content_hash = fields.content_hash;
        self.doc_type = fields.doc_type;
        self.last_modified_at = now;
        self.version += 1;
    }

    /// Soft-delete: flips `active`, retains everything else.
    pub fn mark_deleted(&mut self) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str) -> DocumentFields {
        DocumentFields {
            name: Name::new(name).unwrap(),
            description: Detail::new("collateral for loan 7").unwrap(),
            content_hash: ContentHash::digest(name.as_bytes()),
            doc_type: DocType::new("pdf").unwrap(),
        }
    }

    fn make_document() -> Document {
        Document::create(
            EntityId::new("e1").unwrap(),
            DocumentId::new("d1").unwrap(),
            fields("Collateral Agreement"),
            1_000,
        )
    }

    #[test]
    fn test_create_starts_at_version_one() {
        let doc = make_document();
        assert_eq!(doc.version, 1);
        assert_eq!(doc.created_at, 1_000);
        assert_eq!(doc.last_modified_at, 1_000);
        assert!(doc.active);
    }

    #[test]
    fn test_update_increments_version_and_preserves_created_at() {
        let mut doc = make_document();

        doc.apply_update(fields("Amended Agreement"), 2_000);
        assert_eq!(doc.version, 2);
        assert_eq!(doc.created_at, 1_000);
        assert_eq!(doc.last_modified_at, 2_000);
        assert_eq!(doc.name.as_str(), "Amended Agreement");

        doc.apply_update(fields("Amended Again"), 3_000);
        assert_eq!(doc.version, 3);
        assert_eq!(doc.created_at, 1_000);
    }

    #[test]
    fn test_versions_have_no_gaps() {
        let mut doc = make_document();
        for i in 0..50u64 {
            doc.apply_update(fields("Agreement"), 1_000 + i as i64);
            assert_eq!(doc.version, i + 2);
        }
    }

    #[test]
    fn test_mark_deleted_retains_record() {
        let mut doc = make_document();
        doc.apply_update(fields("Amended"), 2_000);
        doc.mark_deleted();

        assert!(!doc.active);
        assert_eq!(doc.version, 2);
        assert_eq!(doc.name.as_str(), "Amended");
    }
}
