//! Authorization Checks
//!
//! Pure predicates over the request's session and the role store. An
//! anonymous session is never authorized for anything.

use std::sync::Arc;

use crate::domain::entity::session::Session;
use crate::domain::repository::RoleRepository;
use crate::domain::value_object::{
    context_id::{ContextId, ContextSelector},
    role_id::RoleId,
};
use crate::error::AuthResult;

/// What an authorization check needs to know about the current request
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub session: &'a Session,
    /// Context the request is operating in; `None` at site level
    pub active_context: Option<ContextId>,
}

impl<'a> RequestContext<'a> {
    pub fn new(session: &'a Session, active_context: Option<ContextId>) -> Self {
        Self {
            session,
            active_context,
        }
    }

    /// A request operating at site level
    pub fn site(session: &'a Session) -> Self {
        Self::new(session, None)
    }
}

/// Authorization checker
pub struct AuthorizationChecker<R>
where
    R: RoleRepository,
{
    role_repo: Arc<R>,
}

impl<R> AuthorizationChecker<R>
where
    R: RoleRepository,
{
    pub fn new(role_repo: Arc<R>) -> Self {
        Self { role_repo }
    }

    /// Does the session's user hold `role_id` in the selected context
    pub async fn is_authorized(
        &self,
        request: &RequestContext<'_>,
        role_id: RoleId,
        context: ContextSelector,
    ) -> AuthResult<bool> {
        let Some(user_id) = request.session.authenticated_user_id() else {
            return Ok(false);
        };
        let context_id = context.resolve(request.active_context);

        let authorized = self
            .role_repo
            .user_has_role(context_id, &user_id, role_id)
            .await?;

        tracing::debug!(
            user_id = %user_id,
            context_id = %context_id,
            role_id = %role_id,
            authorized,
            "Authorization check"
        );

        Ok(authorized)
    }

    pub async fn is_site_admin(&self, request: &RequestContext<'_>) -> AuthResult<bool> {
        self.is_authorized(
            request,
            RoleId::SITE_ADMIN,
            ContextSelector::Explicit(ContextId::SITE),
        )
        .await
    }

    pub fn is_logged_in(&self, request: &RequestContext<'_>) -> bool {
        request.session.is_logged_in()
    }

    pub fn is_logged_in_as(&self, request: &RequestContext<'_>) -> bool {
        request.session.is_logged_in_as()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::role::Role;
    use crate::domain::entity::session::USER_ID_VAR;
    use crate::domain::value_object::user_id::UserId;
    use crate::infra::memory::InMemoryAuthRepository;

    fn logged_in(user_id: UserId) -> Session {
        let mut session = Session::new();
        session.user_id = Some(user_id);
        session.set_var(USER_ID_VAR, user_id.to_string());
        session
    }

    #[tokio::test]
    async fn test_anonymous_is_never_authorized() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let checker = AuthorizationChecker::new(repo);
        let session = Session::new();
        let request = RequestContext::site(&session);

        assert!(!checker.is_logged_in(&request));
        assert!(
            !checker
                .is_authorized(&request, RoleId::READER, ContextSelector::Active)
                .await
                .unwrap()
        );
        assert!(!checker.is_site_admin(&request).await.unwrap());
    }

    #[tokio::test]
    async fn test_active_context_resolution() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let user_id = UserId::new();
        let journal = ContextId::new(5);
        repo.grant(&Role::new(journal, user_id, RoleId::MANAGER))
            .await
            .unwrap();
        let checker = AuthorizationChecker::new(repo);
        let session = logged_in(user_id);

        let in_journal = RequestContext::new(&session, Some(journal));
        assert!(
            checker
                .is_authorized(&in_journal, RoleId::MANAGER, ContextSelector::Active)
                .await
                .unwrap()
        );

        // no active context falls back to the site
        let at_site = RequestContext::site(&session);
        assert!(
            !checker
                .is_authorized(&at_site, RoleId::MANAGER, ContextSelector::Active)
                .await
                .unwrap()
        );
        assert!(
            checker
                .is_authorized(&at_site, RoleId::MANAGER, journal.into())
                .await
                .unwrap()
        );
        assert!(!checker.is_site_admin(&in_journal).await.unwrap());
    }

    #[tokio::test]
    async fn test_site_admin() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let admin = UserId::new();
        repo.grant(&Role::new(ContextId::SITE, admin, RoleId::SITE_ADMIN))
            .await
            .unwrap();
        let checker = AuthorizationChecker::new(repo);
        let session = logged_in(admin);

        assert!(
            checker
                .is_site_admin(&RequestContext::new(&session, Some(ContextId::new(2))))
                .await
                .unwrap()
        );
    }
}
