//! # Covault Store
//!
//! Storage abstraction for Covault. Provides a trait-based interface over
//! the five key-spaces (entities, documents, grants, audit entries, audit
//! counters) with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//!
//! ## Design Notes
//!
//! - **Dumb storage**: the store enforces no domain rules. Uniqueness
//!   checks and authorization live in the registry; puts are upserts.
//! - **Atomic audit append**: [`Store::append_audit`] assigns the next log
//!   id and advances the per-pair counter in one atomic step, so entries
//!   and counters never diverge.
//! - **CBOR records**: SQLite rows carry the full record as a CBOR blob
//!   beside the key columns used for lookups.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::Store;
