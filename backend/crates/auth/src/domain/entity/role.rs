//! Role grant

use crate::domain::value_object::{context_id::ContextId, role_id::RoleId, user_id::UserId};

/// A user holding a role within a context
///
/// A user may hold several roles in the same context; grants have set semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Role {
    pub context_id: ContextId,
    pub user_id: UserId,
    pub role_id: RoleId,
}

impl Role {
    pub fn new(context_id: ContextId, user_id: UserId, role_id: RoleId) -> Self {
        Self {
            context_id,
            user_id,
            role_id,
        }
    }
}
