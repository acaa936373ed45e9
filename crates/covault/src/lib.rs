//! # Covault
//!
//! The unified API for Covault - collateral entity ownership, document
//! permissions, and an append-only audit trail.
//!
//! ## Overview
//!
//! Covault tracks entities (collateral-owning organizations) and the
//! documents they register, enforces a tiered permission model over each
//! document, and logs every access, modification, and permission change:
//!
//! - **Entities**: registered once, owned forever by their registrar
//! - **Documents**: versioned metadata plus a 32-byte content digest
//! - **Permissions**: one grant per (entity, document, user), on a totally
//!   ordered scale; the entity owner bypasses the table entirely
//! - **Audit log**: per-document, 1-indexed, gapless, immutable
//!
//! ## Key Rules
//!
//! - An operation either fully succeeds (and appends exactly one audit
//!   entry) or fails with one error from a closed taxonomy (and writes
//!   nothing).
//! - Raw lookups are unauthenticated and unlogged; `access_document` is the
//!   gated, logged read. The split is deliberate.
//! - Deletes are soft. History and grants outlive the document's active
//!   flag.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use covault::{Registry, Result};
//! use covault::core::{AccountId, EntityId, Name};
//! use covault::store::SqliteStore;
//!
//! async fn example() -> Result<()> {
//!     // Open storage
//!     let store = SqliteStore::open("covault.db")?;
//!
//!     // Create the registry
//!     let registry = Registry::new(store);
//!
//!     // Register an entity
//!     let alice = AccountId::new("alice").unwrap();
//!     registry
//!         .register_entity(
//!             EntityId::new("e1").unwrap(),
//!             Name::new("Acme").unwrap(),
//!             alice,
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `covault::core` - Core primitives (Entity, Document, AuditEntry, ...)
//! - `covault::perms` - Permission levels, grants, and the evaluator
//! - `covault::store` - Storage abstraction, SQLite and in-memory backends

pub mod error;
pub mod registry;

// Re-export component crates
pub use covault_core as core;
pub use covault_perms as perms;
pub use covault_store as store;

// Re-export main types for convenience
pub use error::{RegistryError, Result};
pub use registry::Registry;

// Re-export commonly used component types
pub use covault_core::{
    AccountId, AuditAction, AuditEntry, Clock, ContentHash, Detail, DocType, Document,
    DocumentFields, DocumentId, Entity, EntityId, ManualClock, Name, SystemClock,
};
pub use covault_perms::{PermissionGrant, PermissionLevel};
