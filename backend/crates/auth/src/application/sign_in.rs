//! Sign In Use Case
//!
//! Validates credentials and registers the session. With implicit
//! authentication enabled the identity comes from an [`IdentityAssertion`]
//! instead of a password.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::check_credentials::CheckCredentialsUseCase;
use crate::application::config::AuthConfig;
use crate::application::register_session::RegisterSessionUseCase;
use crate::domain::authenticator::{AuthenticatorRegistry, IdentityAssertion};
use crate::domain::entity::{session::Session, user::User};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    /// User name as entered
    pub user_name: String,
    /// Password
    pub password: ClearTextPassword,
    /// Remember me flag
    pub remember: bool,
}

/// Sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    check_credentials: CheckCredentialsUseCase<U>,
    register_session: RegisterSessionUseCase<U, S>,
    identity: Option<Arc<dyn IdentityAssertion>>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        authenticators: Arc<AuthenticatorRegistry>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            check_credentials: CheckCredentialsUseCase::new(
                user_repo.clone(),
                authenticators,
                config.clone(),
            ),
            register_session: RegisterSessionUseCase::new(
                user_repo.clone(),
                session_repo,
                config.clone(),
            ),
            user_repo,
            identity: None,
            config,
        }
    }

    /// Source of asserted identities for implicit authentication
    pub fn with_identity_assertion(mut self, identity: Arc<dyn IdentityAssertion>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub async fn execute(&self, session: &mut Session, input: SignInInput) -> AuthResult<User> {
        if self.config.implicit_auth {
            return self.sign_in_implicit(session, input.remember).await;
        }

        // malformed names can never match a stored account
        let user_name =
            UserName::new(input.user_name).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .check_credentials
            .execute(user_name.as_str(), &input.password)
            .await?;

        self.register_session
            .execute(session, user, input.remember)
            .await
    }

    async fn sign_in_implicit(&self, session: &mut Session, remember: bool) -> AuthResult<User> {
        if let Some(user_id) = session.authenticated_user_id() {
            return self
                .user_repo
                .find_by_id(&user_id)
                .await?
                .ok_or(AuthError::UserNotFound);
        }

        let Some(identity) = self.identity.as_ref() else {
            tracing::warn!("Implicit authentication enabled without an identity assertion");
            return Err(AuthError::InvalidCredentials);
        };
        let Some(user_name) = identity.asserted_user_name().await? else {
            return Err(AuthError::InvalidCredentials);
        };
        let user = self
            .user_repo
            .find_by_user_name(&user_name, true)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.register_session.execute(session, user, remember).await
    }
}
