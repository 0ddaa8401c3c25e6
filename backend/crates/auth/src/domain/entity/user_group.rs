use crate::domain::value_object::{
    context_id::ContextId, role_id::RoleId, user_group_id::UserGroupId,
};

/// A context-scoped group users can belong to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserGroup {
    pub group_id: UserGroupId,
    pub context_id: ContextId,
    /// Role members of this group receive
    pub role_id: RoleId,
    pub name: String,
}

impl UserGroup {
    pub fn new(context_id: ContextId, role_id: RoleId, name: impl Into<String>) -> Self {
        Self {
            group_id: UserGroupId::new(),
            context_id,
            role_id,
            name: name.into(),
        }
    }
}
