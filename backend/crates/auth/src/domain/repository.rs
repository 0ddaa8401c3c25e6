//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.
//! Every mutating method is a single-record update that is durable before it
//! returns.

use crate::domain::entity::{role::Role, session::Session, user::User, user_group::UserGroup};
use crate::domain::value_object::{
    context_id::ContextId, role_id::RoleId, session_id::SessionId, user_id::UserId,
};
use crate::error::AuthResult;

/// User repository trait
///
/// User name and email comparisons are case-insensitive.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by user name, optionally including disabled accounts
    async fn find_by_user_name(
        &self,
        user_name: &str,
        include_disabled: bool,
    ) -> AuthResult<Option<User>>;

    /// Check if user name exists (disabled accounts included)
    async fn exists_by_user_name(&self, user_name: &str) -> AuthResult<bool>;

    /// Check if email exists
    async fn exists_by_email(&self, email: &str) -> AuthResult<bool>;

    /// Update user
    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Create a new session
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find session by ID
    async fn find_by_id(&self, session_id: &SessionId) -> AuthResult<Option<Session>>;

    /// Give the session a fresh id
    ///
    /// The old id stops resolving in the same step the new one starts, so no
    /// reader can observe both. On return `session.session_id` is the new id.
    async fn regenerate_id(&self, session: &mut Session) -> AuthResult<()>;

    /// Update session (variables, owner, expiry, activity)
    async fn update(&self, session: &Session) -> AuthResult<()>;

    /// Delete a session
    async fn delete(&self, session_id: &SessionId) -> AuthResult<()>;
}

/// Role repository trait
#[trait_variant::make(RoleRepository: Send)]
pub trait LocalRoleRepository {
    /// Does the user hold the role in the context
    async fn user_has_role(
        &self,
        context_id: ContextId,
        user_id: &UserId,
        role_id: RoleId,
    ) -> AuthResult<bool>;

    /// All roles the user holds, in any context
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Vec<Role>>;

    /// Grant a role (no-op if already held)
    async fn grant(&self, role: &Role) -> AuthResult<()>;

    /// Revoke a role (no-op if not held)
    async fn revoke(&self, role: &Role) -> AuthResult<()>;
}

/// User group membership source
#[trait_variant::make(UserGroupRepository: Send)]
pub trait LocalUserGroupRepository {
    /// Groups the user belongs to, in any context
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Vec<UserGroup>>;
}
