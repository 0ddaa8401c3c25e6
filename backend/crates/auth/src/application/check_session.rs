//! Check Session Use Case
//!
//! Resolves the session a request is operating in. Expiry is evaluated here,
//! lazily; nothing sweeps expired sessions in the background.

use std::sync::Arc;

use crate::domain::entity::session::Session;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_id::SessionId;
use crate::error::{AuthError, AuthResult};

/// Check session use case
pub struct CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Session for the presented id, or a fresh anonymous one
    ///
    /// Unknown and expired ids are never reused: the caller gets a session
    /// with a newly generated id.
    pub async fn resolve(&self, session_id: Option<&SessionId>) -> AuthResult<Session> {
        if let Some(session_id) = session_id {
            match self.get_session(session_id).await {
                Ok(session) => return Ok(session),
                Err(AuthError::SessionInvalid) => {}
                Err(e) => return Err(e),
            }
        }

        let session = Session::new();
        self.session_repo.create(&session).await?;
        tracing::debug!(session_id = %session.session_id, "Started anonymous session");
        Ok(session)
    }

    /// Just check if session is valid (returns bool)
    pub async fn is_valid(&self, session_id: &SessionId) -> bool {
        self.get_session(session_id).await.is_ok()
    }

    /// Get session and update last activity
    pub async fn get_session(&self, session_id: &SessionId) -> AuthResult<Session> {
        let mut session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.is_expired() {
            self.session_repo.delete(session_id).await?;
            return Err(AuthError::SessionInvalid);
        }

        session.touch();
        self.session_repo.update(&session).await?;

        Ok(session)
    }
}
