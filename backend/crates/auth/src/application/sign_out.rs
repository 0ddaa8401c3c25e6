//! Sign Out Use Case
//!
//! Detaches the user from the session. Safe to call on a session that is
//! already anonymous.

use std::sync::Arc;

use crate::domain::entity::session::{SIGNED_IN_AS_VAR, Session, USER_ID_VAR};
use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    pub async fn execute(&self, session: &mut Session) -> AuthResult<()> {
        let user_id = session.user_id.take();
        session.remove_var(USER_ID_VAR);
        session.remove_var(SIGNED_IN_AS_VAR);

        if session.remember {
            // back to browser-session lifetime
            session.remember = false;
            session.expires_at = None;
        }

        session.touch();
        self.session_repo.update(session).await?;

        if let Some(user_id) = user_id {
            tracing::info!(
                user_id = %user_id,
                session_id = %session.session_id,
                "User signed out"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_id::UserId;
    use crate::infra::memory::InMemoryAuthRepository;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_sign_out_clears_identity_and_remember() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let mut session = Session::new();
        let user_id = UserId::new();
        session.user_id = Some(user_id);
        session.set_var(USER_ID_VAR, user_id.to_string());
        session.set_var(SIGNED_IN_AS_VAR, UserId::new().to_string());
        session.remember = true;
        session.expires_at = Some(Utc::now() + Duration::days(30));
        repo.create(&session).await.unwrap();

        let uc = SignOutUseCase::new(repo.clone());
        uc.execute(&mut session).await.unwrap();

        assert!(!session.is_logged_in());
        assert!(!session.is_logged_in_as());
        assert!(session.user_id.is_none());
        assert!(!session.remember);
        assert!(session.expires_at.is_none());

        let stored = repo.find_by_id(&session.session_id).await.unwrap().unwrap();
        assert!(!stored.is_logged_in());

        // idempotent
        uc.execute(&mut session).await.unwrap();
        assert!(!session.is_logged_in());
    }
}
