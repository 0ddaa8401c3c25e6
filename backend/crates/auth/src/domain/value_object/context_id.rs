//! Context Value Objects
//!
//! A context is a tenant scope (a journal, a press, ...) under which roles
//! and group memberships are granted. Context `0` is the site itself.

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContextId(u64);

impl ContextId {
    /// The site-global context
    pub const SITE: Self = Self(0);

    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_site(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for ContextId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Which context an authorization check applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextSelector {
    /// Whatever context the current request is operating in
    #[default]
    Active,
    /// A specific context
    Explicit(ContextId),
}

impl ContextSelector {
    /// Resolve against the request's active context; no active context means the site
    pub fn resolve(self, active: Option<ContextId>) -> ContextId {
        match self {
            ContextSelector::Active => active.unwrap_or(ContextId::SITE),
            ContextSelector::Explicit(id) => id,
        }
    }
}

impl From<ContextId> for ContextSelector {
    fn from(id: ContextId) -> Self {
        ContextSelector::Explicit(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_context() {
        assert!(ContextId::SITE.is_site());
        assert!(!ContextId::new(7).is_site());
        assert_eq!(ContextId::new(7).to_string(), "7");
    }

    #[test]
    fn test_selector_resolution() {
        let journal = ContextId::new(3);
        assert_eq!(ContextSelector::Active.resolve(Some(journal)), journal);
        assert_eq!(ContextSelector::Active.resolve(None), ContextId::SITE);
        assert_eq!(
            ContextSelector::Explicit(ContextId::SITE).resolve(Some(journal)),
            ContextId::SITE
        );
        assert_eq!(ContextSelector::from(journal).resolve(None), journal);
    }
}
