//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a registry on an in-memory
//! store with a manually driven clock.

use std::sync::Arc;

use covault::Registry;
use covault_core::{
    AccountId, ContentHash, Detail, DocType, DocumentFields, DocumentId, EntityId, ManualClock,
    Name,
};
use covault_store::MemoryStore;

/// The fixed start time fixtures run at (2025-01-14T16:00:00Z in Unix ms).
pub const FIXTURE_START_MS: i64 = 1_736_870_400_000;

/// A registry on a MemoryStore with a ManualClock.
///
/// The clock handle is shared: advancing it through `clock` is visible to
/// the registry immediately.
pub struct RegistryFixture {
    pub registry: Registry<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl RegistryFixture {
    /// Create a fixture starting at [`FIXTURE_START_MS`].
    pub fn new() -> Self {
        Self::at(FIXTURE_START_MS)
    }

    /// Create a fixture starting at an arbitrary time.
    pub fn at(start: i64) -> Self {
        let clock = Arc::new(ManualClock::new(start));
        let registry = Registry::with_clock(MemoryStore::new(), clock.clone());
        Self { registry, clock }
    }

    /// Register entity "e1" ("Acme", owned by "alice") and add document
    /// "d1" with [`sample_fields`].
    pub async fn seed_acme(&self) {
        self.registry
            .register_entity(entity_id("e1"), name("Acme"), account("alice"))
            .await
            .expect("seed: register entity");
        self.registry
            .add_document(entity_id("e1"), document_id("d1"), sample_fields(), account("alice"))
            .await
            .expect("seed: add document");
    }
}

impl Default for RegistryFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an account id from a literal.
pub fn account(value: &str) -> AccountId {
    AccountId::new(value).expect("fixture account ids are in bounds")
}

/// Build an entity id from a literal.
pub fn entity_id(value: &str) -> EntityId {
    EntityId::new(value).expect("fixture entity ids are in bounds")
}

/// Build a document id from a literal.
pub fn document_id(value: &str) -> DocumentId {
    DocumentId::new(value).expect("fixture document ids are in bounds")
}

/// Build a name from a literal.
pub fn name(value: &str) -> Name {
    Name::new(value).expect("fixture names are in bounds")
}

/// The document field set the canonical fixtures use.
pub fn sample_fields() -> DocumentFields {
    fields("Collateral Agreement")
}

/// A document field set with the given name.
pub fn fields(doc_name: &str) -> DocumentFields {
    DocumentFields {
        name: name(doc_name),
        description: Detail::new("warehouse pledge for loan 7").expect("fixture detail in bounds"),
        content_hash: ContentHash::digest(doc_name.as_bytes()),
        doc_type: DocType::new("pdf").expect("fixture doc type in bounds"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_acme_creates_entity_and_document() {
        let fixture = RegistryFixture::new();
        fixture.seed_acme().await;

        let entity = fixture
            .registry
            .entity(&entity_id("e1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entity.owner, account("alice"));
        assert_eq!(entity.registered_at, FIXTURE_START_MS);

        let document = fixture
            .registry
            .document(&entity_id("e1"), &document_id("d1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(document.version, 1);
    }

    #[tokio::test]
    async fn test_clock_handle_drives_registry_time() {
        let fixture = RegistryFixture::new();
        fixture.seed_acme().await;

        fixture.clock.advance(5_000);
        fixture
            .registry
            .update_document(entity_id("e1"), document_id("d1"), fields("Amended"), account("alice"))
            .await
            .unwrap();

        let document = fixture
            .registry
            .document(&entity_id("e1"), &document_id("d1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(document.last_modified_at, FIXTURE_START_MS + 5_000);
        assert_eq!(document.created_at, FIXTURE_START_MS);
    }
}
