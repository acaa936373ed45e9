//! The permission scale.
//!
//! Levels form a total order; every authorization decision in the system is
//! the single comparison `held >= required`. There is no exact-match
//! semantics anywhere.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered capability tier over a document.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum PermissionLevel {
    /// No capability. Represented in the permission table by absence, never
    /// by a stored grant.
    None = 0,
    /// May read through the gated access path.
    View = 1,
    /// May update document fields.
    Manage = 2,
    /// May delete and may grant/revoke up to Admin.
    Admin = 3,
    /// Full control. Reserved for the creator's implicit grant and the
    /// entity owner's dynamic bypass; never grantable.
    Owner = 4,
}

impl PermissionLevel {
    /// Convert to u8 for serialization.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::View),
            2 => Some(Self::Manage),
            3 => Some(Self::Admin),
            4 => Some(Self::Owner),
            _ => None,
        }
    }

    /// Whether a grant may carry this level: [View, Admin] inclusive.
    pub fn is_grantable(self) -> bool {
        matches!(self, Self::View | Self::Manage | Self::Admin)
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "none",
            Self::View => "view",
            Self::Manage => "manage",
            Self::Admin => "admin",
            Self::Owner => "owner",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scale_is_totally_ordered() {
        use PermissionLevel::*;
        assert!(None < View);
        assert!(View < Manage);
        assert!(Manage < Admin);
        assert!(Admin < Owner);
    }

    #[test]
    fn test_wire_roundtrip() {
        for value in 0..=4u8 {
            let level = PermissionLevel::from_u8(value).unwrap();
            assert_eq!(level.to_u8(), value);
        }
        assert_eq!(PermissionLevel::from_u8(5), Option::None);
        assert_eq!(PermissionLevel::from_u8(255), Option::None);
    }

    #[test]
    fn test_grantable_range() {
        use PermissionLevel::*;
        assert!(!None.is_grantable());
        assert!(View.is_grantable());
        assert!(Manage.is_grantable());
        assert!(Admin.is_grantable());
        assert!(!Owner.is_grantable());
    }

    proptest! {
        #[test]
        fn prop_order_matches_wire_order(a in 0..=4u8, b in 0..=4u8) {
            let la = PermissionLevel::from_u8(a).unwrap();
            let lb = PermissionLevel::from_u8(b).unwrap();
            prop_assert_eq!(la.cmp(&lb), a.cmp(&b));
        }
    }
}
