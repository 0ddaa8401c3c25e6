use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Permission level granted to a user within a context
///
/// Values are bit patterns shared with the existing role tables, hence the
/// hex constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(u32);

impl RoleId {
    pub const SITE_ADMIN: Self = Self(0x1);
    pub const MANAGER: Self = Self(0x10);
    pub const SUB_EDITOR: Self = Self(0x11);
    pub const REVIEWER: Self = Self(0x1000);
    pub const ASSISTANT: Self = Self(0x1001);
    pub const AUTHOR: Self = Self(0x10000);
    pub const READER: Self = Self(0x100000);

    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Roles that may administer users of their context
    #[inline]
    pub const fn is_manager_equivalent(&self) -> bool {
        self.0 == Self::MANAGER.0
    }

    #[inline]
    pub const fn code(&self) -> Option<&'static str> {
        match self.0 {
            0x1 => Some("site_admin"),
            0x10 => Some("manager"),
            0x11 => Some("sub_editor"),
            0x1000 => Some("reviewer"),
            0x1001 => Some("assistant"),
            0x10000 => Some("author"),
            0x100000 => Some("reader"),
            _ => None,
        }
    }
}

impl From<u32> for RoleId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_equivalence() {
        assert!(RoleId::MANAGER.is_manager_equivalent());
        assert!(!RoleId::SITE_ADMIN.is_manager_equivalent());
        assert!(!RoleId::SUB_EDITOR.is_manager_equivalent());
        assert!(!RoleId::AUTHOR.is_manager_equivalent());
    }

    #[test]
    fn test_codes() {
        assert_eq!(RoleId::SITE_ADMIN.code(), Some("site_admin"));
        assert_eq!(RoleId::READER.code(), Some("reader"));
        assert_eq!(RoleId::new(0x42).code(), None);
        assert_eq!(RoleId::MANAGER.to_string(), "16");
    }
}
