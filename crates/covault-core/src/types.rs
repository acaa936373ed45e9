//! Strong type definitions for Covault.
//!
//! All identifiers are newtypes validated at construction, so the rest of
//! the system only ever sees in-bounds values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Maximum byte length of an identifier (entity id, document id, account id).
pub const MAX_ID_LEN: usize = 64;

/// Maximum byte length of a name (entity name, document name).
pub const MAX_NAME_LEN: usize = 256;

/// Maximum byte length of a document type tag.
pub const MAX_DOC_TYPE_LEN: usize = 64;

/// Maximum length of free-form text (descriptions, audit details), in
/// Unicode code points.
pub const MAX_DETAIL_CHARS: usize = 500;

fn check_ascii(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if !value.is_ascii() {
        return Err(ValidationError::NotAscii { field });
    }
    if value.len() > max {
        return Err(ValidationError::TooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}

/// Identifier of a collateral entity. ASCII, at most 64 bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new entity id, rejecting non-ASCII or over-long input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_ascii("entity id", &value, MAX_ID_LEN)?;
        Ok(Self(value))
    }

    /// Get the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a document within an entity. ASCII, at most 64 bytes.
///
/// Documents are keyed by the (entity id, document id) pair; a document id
/// alone is not globally unique.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a new document id, rejecting non-ASCII or over-long input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_ascii("document id", &value, MAX_ID_LEN)?;
        Ok(Self(value))
    }

    /// Get the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identity of an actor, as supplied by the host environment.
///
/// The host authenticates callers; Covault treats the account id as an
/// opaque, trusted value. ASCII, at most 64 bytes.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account id, rejecting non-ASCII or over-long input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_ascii("account id", &value, MAX_ID_LEN)?;
        Ok(Self(value))
    }

    /// Get the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({})", self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A display name for an entity or document. ASCII, at most 256 bytes.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name(String);

impl Name {
    /// Create a new name, rejecting non-ASCII or over-long input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_ascii("name", &value, MAX_NAME_LEN)?;
        Ok(Self(value))
    }

    /// Get the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document type tag ("pdf", "deed", ...). ASCII, at most 64 bytes.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocType(String);

impl DocType {
    /// Create a new document type tag.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        check_ascii("doc type", &value, MAX_DOC_TYPE_LEN)?;
        Ok(Self(value))
    }

    /// Get the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocType({})", self.0)
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form Unicode text, at most 500 code points.
///
/// Used for document descriptions and audit details. [`Detail::new`] is the
/// boundary for caller-supplied text; [`Detail::clamp`] is for text the
/// system composes itself and may need to truncate.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Detail(String);

impl Detail {
    /// Create from caller input, rejecting over-long text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let count = value.chars().count();
        if count > MAX_DETAIL_CHARS {
            return Err(ValidationError::TooManyChars {
                field: "detail",
                count,
                max: MAX_DETAIL_CHARS,
            });
        }
        Ok(Self(value))
    }

    /// Create from system-composed text, truncating to the limit.
    pub fn clamp(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.chars().count() <= MAX_DETAIL_CHARS {
            return Self(value);
        }
        Self(value.chars().take(MAX_DETAIL_CHARS).collect())
    }

    /// Empty detail text.
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Get the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Detail({})", self.0)
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 32-byte Blake3 digest of document content.
///
/// Covault never stores document bytes; a document is tracked through its
/// metadata and this digest alone.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a ContentHash from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Digest arbitrary content.
    pub fn digest(content: &[u8]) -> Self {
        Self(*blake3::hash(content).as_bytes())
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The zero hash (used as a placeholder).
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for ContentHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for ContentHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for ContentHash {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}
