//! In-Memory Repository Implementations
//!
//! Everything lives behind one `RwLock`, so each repository call is atomic
//! with respect to every other. Used by tests and by hosts that embed the
//! engine without a database.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::entity::{role::Role, session::Session, user::User, user_group::UserGroup};
use crate::domain::repository::{
    RoleRepository, SessionRepository, UserGroupRepository, UserRepository,
};
use crate::domain::value_object::{
    context_id::ContextId, role_id::RoleId, session_id::SessionId, user_group_id::UserGroupId,
    user_id::UserId,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    sessions: HashMap<SessionId, Session>,
    roles: HashSet<Role>,
    groups: HashMap<UserGroupId, UserGroup>,
    memberships: HashSet<(UserGroupId, UserId)>,
}

impl State {
    fn user_by_name(&self, user_name: &str) -> Option<&User> {
        let wanted = user_name.trim().to_lowercase();
        self.users
            .values()
            .find(|user| user.user_name.canonical() == wanted)
    }

    fn email_taken(&self, email: &str, except: Option<&UserId>) -> bool {
        !email.is_empty()
            && self
                .users
                .values()
                .filter(|user| Some(&user.user_id) != except)
                .any(|user| user.email.eq_ignore_ascii_case(email))
    }
}

/// In-memory auth repository
#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a group so memberships can refer to it
    pub async fn add_user_group(&self, group: UserGroup) {
        self.state
            .write()
            .await
            .groups
            .insert(group.group_id, group);
    }

    pub async fn add_membership(&self, group_id: &UserGroupId, user_id: &UserId) {
        self.state
            .write()
            .await
            .memberships
            .insert((*group_id, *user_id));
    }

    pub async fn remove_membership(&self, group_id: &UserGroupId, user_id: &UserId) {
        self.state
            .write()
            .await
            .memberships
            .remove(&(*group_id, *user_id));
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for InMemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if state.user_by_name(user.user_name.as_str()).is_some() {
            return Err(AuthError::Conflict("user name".to_string()));
        }
        if state.email_taken(&user.email, None) {
            return Err(AuthError::Conflict("email".to_string()));
        }
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn find_by_user_name(
        &self,
        user_name: &str,
        include_disabled: bool,
    ) -> AuthResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .user_by_name(user_name)
            .filter(|user| include_disabled || !user.disabled)
            .cloned())
    }

    async fn exists_by_user_name(&self, user_name: &str) -> AuthResult<bool> {
        Ok(self.state.read().await.user_by_name(user_name).is_some())
    }

    async fn exists_by_email(&self, email: &str) -> AuthResult<bool> {
        Ok(self.state.read().await.email_taken(email.trim(), None))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&user.user_id) {
            return Err(AuthError::UserNotFound);
        }
        if state.email_taken(&user.email, Some(&user.user_id)) {
            return Err(AuthError::Conflict("email".to_string()));
        }
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for InMemoryAuthRepository {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        self.state
            .write()
            .await
            .sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: &SessionId) -> AuthResult<Option<Session>> {
        Ok(self.state.read().await.sessions.get(session_id).cloned())
    }

    async fn regenerate_id(&self, session: &mut Session) -> AuthResult<()> {
        let mut state = self.state.write().await;
        let stored = state.sessions.remove(&session.session_id);

        let new_id = SessionId::generate();
        tracing::debug!(
            old_session_id = %session.session_id,
            new_session_id = %new_id,
            persisted = stored.is_some(),
            "Regenerated session id"
        );
        session.session_id = new_id;

        let mut record = stored.unwrap_or_else(|| session.clone());
        record.session_id = session.session_id.clone();
        state.sessions.insert(record.session_id.clone(), record);
        Ok(())
    }

    async fn update(&self, session: &Session) -> AuthResult<()> {
        let mut state = self.state.write().await;
        match state.sessions.get_mut(&session.session_id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(AuthError::SessionInvalid),
        }
    }

    async fn delete(&self, session_id: &SessionId) -> AuthResult<()> {
        self.state.write().await.sessions.remove(session_id);
        Ok(())
    }
}

// ============================================================================
// Role Repository Implementation
// ============================================================================

impl RoleRepository for InMemoryAuthRepository {
    async fn user_has_role(
        &self,
        context_id: ContextId,
        user_id: &UserId,
        role_id: RoleId,
    ) -> AuthResult<bool> {
        let role = Role::new(context_id, *user_id, role_id);
        Ok(self.state.read().await.roles.contains(&role))
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Vec<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .filter(|role| &role.user_id == user_id)
            .copied()
            .collect())
    }

    async fn grant(&self, role: &Role) -> AuthResult<()> {
        self.state.write().await.roles.insert(*role);
        Ok(())
    }

    async fn revoke(&self, role: &Role) -> AuthResult<()> {
        self.state.write().await.roles.remove(role);
        Ok(())
    }
}

// ============================================================================
// User Group Repository Implementation
// ============================================================================

impl UserGroupRepository for InMemoryAuthRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Vec<UserGroup>> {
        let state = self.state.read().await;
        Ok(state
            .memberships
            .iter()
            .filter(|(_, member)| member == user_id)
            .filter_map(|(group_id, _)| state.groups.get(group_id).cloned())
            .collect())
    }
}
