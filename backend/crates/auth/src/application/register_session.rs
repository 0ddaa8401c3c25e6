//! Register Session Use Case
//!
//! Promotes a session to authenticated once credentials have been validated.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::domain::entity::{
    session::{SIGNED_IN_AS_VAR, Session, USER_ID_VAR, USER_NAME_VAR},
    user::User,
};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Register session use case
pub struct RegisterSessionUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<U, S> RegisterSessionUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    /// Attach `user` to `session`
    ///
    /// Disabled accounts are refused before the session is touched. On success
    /// the session has a new id, carries the user, and the user's last login
    /// time is persisted.
    pub async fn execute(
        &self,
        session: &mut Session,
        mut user: User,
        remember: bool,
    ) -> AuthResult<User> {
        if user.disabled {
            tracing::warn!(user_id = %user.user_id, "Login refused for disabled account");
            return Err(AuthError::account_disabled(user.disabled_reason.as_deref()));
        }

        let previous_id = session.session_id.clone();
        self.session_repo.regenerate_id(session).await?;

        // a fresh login never inherits an earlier identity's impersonation
        session.remove_var(SIGNED_IN_AS_VAR);
        session.set_var(USER_ID_VAR, user.user_id.to_string());
        session.set_var(USER_NAME_VAR, user.user_name.as_str());
        session.user_id = Some(user.user_id);
        session.remember = remember;
        session.expires_at = match self.config.remember_lifetime() {
            Some(lifetime) if remember => Some(
                Utc::now()
                    .checked_add_signed(lifetime)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            _ => None,
        };
        session.touch();
        self.session_repo.update(session).await?;

        user.record_login();
        self.user_repo.update(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            previous_session_id = %previous_id,
            remember,
            "User signed in"
        );

        Ok(user)
    }
}
