//! Sign In As Use Case
//!
//! Lets an administrator act as another user. The administrator's id is kept
//! in the `signedInAs` session variable until they sign out as that user.

use std::sync::Arc;

use crate::application::administration::AdministrationPolicy;
use crate::domain::entity::{
    session::{SIGNED_IN_AS_VAR, Session, USER_ID_VAR, USER_NAME_VAR},
    user::User,
};
use crate::domain::repository::{
    RoleRepository, SessionRepository, UserGroupRepository, UserRepository,
};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Sign in as use case
pub struct SignInAsUseCase<U, S, R, G>
where
    U: UserRepository,
    S: SessionRepository,
    R: RoleRepository,
    G: UserGroupRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    policy: AdministrationPolicy<R, G>,
}

impl<U, S, R, G> SignInAsUseCase<U, S, R, G>
where
    U: UserRepository,
    S: SessionRepository,
    R: RoleRepository,
    G: UserGroupRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        role_repo: Arc<R>,
        group_repo: Arc<G>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            policy: AdministrationPolicy::new(role_repo, group_repo),
        }
    }

    /// Switch the session to `target`
    ///
    /// While already impersonating, permission is checked against the
    /// original administrator, who stays recorded as the actor.
    pub async fn sign_in_as(&self, session: &mut Session, target: &UserId) -> AuthResult<User> {
        let actor = match impersonator(session) {
            Some(actor) => actor,
            None => session
                .authenticated_user_id()
                .ok_or(AuthError::NotLoggedIn)?,
        };

        if !self.policy.can_administer(target, &actor).await? {
            tracing::warn!(
                actor_user_id = %actor,
                target_user_id = %target,
                "Sign in as refused"
            );
            return Err(AuthError::NotPermitted);
        }

        let user = self
            .user_repo
            .find_by_id(target)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if user.disabled {
            return Err(AuthError::account_disabled(user.disabled_reason.as_deref()));
        }

        self.session_repo.regenerate_id(session).await?;
        session.set_var(SIGNED_IN_AS_VAR, actor.to_string());
        attach(session, &user);
        self.session_repo.update(session).await?;

        tracing::info!(
            actor_user_id = %actor,
            target_user_id = %user.user_id,
            session_id = %session.session_id,
            "Signed in as another user"
        );

        Ok(user)
    }

    /// Return the session to the impersonating administrator
    ///
    /// `None` when the session was not impersonating anyone.
    pub async fn sign_out_as(&self, session: &mut Session) -> AuthResult<Option<User>> {
        let Some(actor) = impersonator(session) else {
            return Ok(None);
        };

        let user = self
            .user_repo
            .find_by_id(&actor)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.session_repo.regenerate_id(session).await?;
        session.remove_var(SIGNED_IN_AS_VAR);
        attach(session, &user);
        self.session_repo.update(session).await?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %session.session_id,
            "Signed out as another user"
        );

        Ok(Some(user))
    }
}

fn impersonator(session: &Session) -> Option<UserId> {
    session
        .var(SIGNED_IN_AS_VAR)
        .and_then(|value| value.parse().ok())
}

fn attach(session: &mut Session, user: &User) {
    session.set_var(USER_ID_VAR, user.user_id.to_string());
    session.set_var(USER_NAME_VAR, user.user_name.as_str());
    session.user_id = Some(user.user_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::role::Role;
    use crate::domain::value_object::{
        context_id::ContextId, role_id::RoleId, user_name::UserName,
    };
    use crate::infra::memory::InMemoryAuthRepository;
    use platform::password::PasswordDigest;

    type UseCase = SignInAsUseCase<
        InMemoryAuthRepository,
        InMemoryAuthRepository,
        InMemoryAuthRepository,
        InMemoryAuthRepository,
    >;

    async fn add_user(repo: &InMemoryAuthRepository, name: &str) -> User {
        let user = User::new(
            UserName::new(name).unwrap(),
            PasswordDigest::from_stored("00"),
            format!("{name}@example.org"),
        );
        UserRepository::create(repo, &user).await.unwrap();
        user
    }

    fn session_for(user: &User) -> Session {
        let mut session = Session::new();
        attach(&mut session, user);
        session
    }

    async fn setup() -> (Arc<InMemoryAuthRepository>, UseCase, User, User) {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let admin = add_user(&repo, "admin").await;
        let author = add_user(&repo, "author").await;
        RoleRepository::grant(
            repo.as_ref(),
            &Role::new(ContextId::SITE, admin.user_id, RoleId::SITE_ADMIN),
        )
        .await
        .unwrap();
        let uc = SignInAsUseCase::new(repo.clone(), repo.clone(), repo.clone(), repo.clone());
        (repo, uc, admin, author)
    }

    #[tokio::test]
    async fn test_sign_in_as_and_back() {
        let (repo, uc, admin, author) = setup().await;
        let mut session = session_for(&admin);
        SessionRepository::create(repo.as_ref(), &session)
            .await
            .unwrap();

        let user = uc.sign_in_as(&mut session, &author.user_id).await.unwrap();
        assert_eq!(user.user_id, author.user_id);
        assert_eq!(session.authenticated_user_id(), Some(author.user_id));
        assert!(session.is_logged_in_as());

        let restored = uc.sign_out_as(&mut session).await.unwrap().unwrap();
        assert_eq!(restored.user_id, admin.user_id);
        assert_eq!(session.authenticated_user_id(), Some(admin.user_id));
        assert!(!session.is_logged_in_as());

        assert!(uc.sign_out_as(&mut session).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sign_in_as_requires_permission() {
        let (repo, uc, admin, author) = setup().await;
        let mut session = session_for(&author);
        SessionRepository::create(repo.as_ref(), &session)
            .await
            .unwrap();

        let err = uc.sign_in_as(&mut session, &admin.user_id).await.unwrap_err();
        assert!(matches!(err, AuthError::NotPermitted));
        assert_eq!(session.authenticated_user_id(), Some(author.user_id));

        let err = uc
            .sign_in_as(&mut Session::new(), &author.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NotLoggedIn));
    }
}
