//! Error types for the registry.

use covault_core::{DocumentId, EntityId};
use covault_perms::PermissionLevel;
use covault_store::StoreError;
use thiserror::Error;

/// Errors returned by registry operations.
///
/// The domain variants form a closed, stable taxonomy; callers can match on
/// them exhaustively. `Store` carries infrastructure failures (I/O, SQLite)
/// that the domain model itself never produces.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Caller lacks the permission the operation requires. Deliberately
    /// carries no information about the level actually held.
    #[error("not authorized")]
    NotAuthorized,

    /// Registration attempted under an id that is already taken.
    #[error("entity already exists: {0}")]
    EntityAlreadyExists(EntityId),

    /// No entity under the given id.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A document already exists under the (entity, document) pair.
    #[error("document already registered: {0}/{1}")]
    DocumentAlreadyRegistered(EntityId, DocumentId),

    /// No document under the (entity, document) pair.
    #[error("document not found: {0}/{1}")]
    DocumentNotFound(EntityId, DocumentId),

    /// A grant was attempted at a level outside [View, Admin].
    #[error("invalid permission level: {0}")]
    InvalidPermissionLevel(PermissionLevel),

    /// Caller cannot read the document. Like `NotAuthorized`, carries no
    /// level information.
    #[error("no access")]
    NoAccess,

    /// Storage-layer failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
