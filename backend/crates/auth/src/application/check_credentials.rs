//! Check Credentials Use Case
//!
//! Decides whether a user name / password pair is valid. Disabled accounts are
//! validated like any other; refusing them is the session registrar's job.

use std::sync::Arc;

use platform::password::{ClearTextPassword, digest_credentials};

use crate::application::config::AuthConfig;
use crate::domain::authenticator::AuthenticatorRegistry;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// Check credentials use case
pub struct CheckCredentialsUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    authenticators: Arc<AuthenticatorRegistry>,
    config: Arc<AuthConfig>,
}

impl<U> CheckCredentialsUseCase<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        authenticators: Arc<AuthenticatorRegistry>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            authenticators,
            config,
        }
    }

    /// Validate credentials and return the matching user
    ///
    /// Unknown user, wrong password and external rejection all yield
    /// `InvalidCredentials`.
    pub async fn execute(
        &self,
        user_name: &str,
        password: &ClearTextPassword,
    ) -> AuthResult<User> {
        let Some(mut user) = self.user_repo.find_by_user_name(user_name, true).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let valid = if user.is_delegated() {
            self.check_external(&mut user, password).await?
        } else {
            self.check_local(&mut user, password).await?
        };

        if valid {
            Ok(user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Pure yes/no form of [`Self::execute`]
    pub async fn is_valid(
        &self,
        user_name: &str,
        password: &ClearTextPassword,
    ) -> AuthResult<bool> {
        match self.execute(user_name, password).await {
            Ok(_) => Ok(true),
            Err(AuthError::InvalidCredentials) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn check_external(
        &self,
        user: &mut User,
        password: &ClearTextPassword,
    ) -> AuthResult<bool> {
        let Some(auth_source_id) = user.auth_source_id else {
            return Ok(false);
        };
        let Some(authenticator) = self.authenticators.resolve(auth_source_id) else {
            tracing::warn!(
                user_id = %user.user_id,
                auth_source_id = %auth_source_id,
                "No authenticator registered for auth source"
            );
            return Ok(false);
        };

        if !authenticator
            .authenticate(user.user_name.as_str(), password)
            .await?
        {
            return Ok(false);
        }

        let old_email = user.email.clone();
        authenticator.refresh_profile(user).await?;

        if !user.email.eq_ignore_ascii_case(&old_email)
            && self.user_repo.exists_by_email(&user.email).await?
        {
            tracing::warn!(
                user_id = %user.user_id,
                "Remote email collides with another account, keeping the stored one"
            );
            user.set_email(old_email);
        }

        self.user_repo.update(user).await?;
        Ok(true)
    }

    async fn check_local(
        &self,
        user: &mut User,
        password: &ClearTextPassword,
    ) -> AuthResult<bool> {
        let algorithm = user
            .password_digest
            .algorithm()
            .unwrap_or(self.config.encryption);
        let candidate = digest_credentials(user.user_name.as_str(), password, algorithm);

        if !user.password_digest.matches(&candidate) {
            return Ok(false);
        }

        if self.config.upgrade_legacy_digests
            && algorithm.is_legacy()
            && !self.config.encryption.is_legacy()
        {
            let upgraded =
                digest_credentials(user.user_name.as_str(), password, self.config.encryption);
            user.set_password_digest(upgraded);
            self.user_repo.update(user).await?;
            tracing::info!(
                user_id = %user.user_id,
                from = %algorithm,
                to = %self.config.encryption,
                "Upgraded legacy password digest"
            );
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::authenticator::ExternalAuthenticator;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{auth_source_id::AuthSourceId, user_name::UserName};
    use crate::infra::memory::InMemoryAuthRepository;
    use async_trait::async_trait;
    use platform::password::DigestAlgorithm;

    struct Remote {
        accept: bool,
        email: &'static str,
    }

    #[async_trait]
    impl ExternalAuthenticator for Remote {
        async fn authenticate(&self, _: &str, _: &ClearTextPassword) -> AuthResult<bool> {
            Ok(self.accept)
        }

        async fn refresh_profile(&self, user: &mut User) -> AuthResult<()> {
            user.set_email(self.email);
            Ok(())
        }
    }

    fn local_user(name: &str, password: &str, algorithm: DigestAlgorithm) -> User {
        let digest = digest_credentials(name, &ClearTextPassword::new(password), algorithm);
        User::new(
            UserName::new(name).unwrap(),
            digest,
            format!("{name}@example.org"),
        )
    }

    fn use_case(
        repo: &Arc<InMemoryAuthRepository>,
        registry: AuthenticatorRegistry,
    ) -> CheckCredentialsUseCase<InMemoryAuthRepository> {
        CheckCredentialsUseCase::new(
            repo.clone(),
            Arc::new(registry),
            Arc::new(AuthConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_local_credentials() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        repo.create(&local_user("jdoe", "secret", DigestAlgorithm::Sha256))
            .await
            .unwrap();
        let uc = use_case(&repo, AuthenticatorRegistry::new());

        assert!(uc.is_valid("jdoe", &"secret".into()).await.unwrap());
        assert!(uc.is_valid("JDOE", &"secret".into()).await.unwrap());
        assert!(!uc.is_valid("jdoe", &"wrong".into()).await.unwrap());
        assert!(!uc.is_valid("nobody", &"secret".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_disabled_user_still_validates() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let mut user = local_user("jdoe", "secret", DigestAlgorithm::Sha256);
        user.disable(Some("left".to_string()));
        repo.create(&user).await.unwrap();
        let uc = use_case(&repo, AuthenticatorRegistry::new());

        assert!(uc.is_valid("jdoe", &"secret".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_legacy_digest_is_upgraded() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let user = local_user("jdoe", "secret", DigestAlgorithm::Sha1);
        repo.create(&user).await.unwrap();
        let uc = use_case(&repo, AuthenticatorRegistry::new());

        assert!(uc.is_valid("jdoe", &"secret".into()).await.unwrap());
        let stored = repo.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert_eq!(stored.password_digest.algorithm(), Some(DigestAlgorithm::Sha256));

        // still valid under the new digest
        assert!(uc.is_valid("jdoe", &"secret".into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_external_authority_refreshes_email() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let user = local_user("jdoe", "unused", DigestAlgorithm::Sha256)
            .with_auth_source(AuthSourceId::new(1));
        repo.create(&user).await.unwrap();

        let mut registry = AuthenticatorRegistry::new();
        registry.register(
            AuthSourceId::new(1),
            Arc::new(Remote {
                accept: true,
                email: "jane@remote.example",
            }),
        );
        let uc = use_case(&repo, registry);

        // local password is not authoritative
        let validated = uc.execute("jdoe", &"anything".into()).await.unwrap();
        assert_eq!(validated.email, "jane@remote.example");
        let stored = repo.find_by_id(&user.user_id).await.unwrap().unwrap();
        assert_eq!(stored.email, "jane@remote.example");
    }

    #[tokio::test]
    async fn test_external_email_collision_keeps_old_email() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        repo.create(&local_user("other", "pw", DigestAlgorithm::Sha256))
            .await
            .unwrap();
        let user = local_user("jdoe", "pw", DigestAlgorithm::Sha256)
            .with_auth_source(AuthSourceId::new(1));
        repo.create(&user).await.unwrap();

        let mut registry = AuthenticatorRegistry::new();
        registry.register(
            AuthSourceId::new(1),
            Arc::new(Remote {
                accept: true,
                email: "other@example.org",
            }),
        );
        let uc = use_case(&repo, registry);

        let validated = uc.execute("jdoe", &"pw".into()).await.unwrap();
        assert_eq!(validated.email, "jdoe@example.org");
    }

    #[tokio::test]
    async fn test_external_rejection_and_missing_source() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        repo.create(
            &local_user("jdoe", "pw", DigestAlgorithm::Sha256)
                .with_auth_source(AuthSourceId::new(1)),
        )
        .await
        .unwrap();
        repo.create(
            &local_user("orphan", "pw", DigestAlgorithm::Sha256)
                .with_auth_source(AuthSourceId::new(9)),
        )
        .await
        .unwrap();

        let mut registry = AuthenticatorRegistry::new();
        registry.register(
            AuthSourceId::new(1),
            Arc::new(Remote {
                accept: false,
                email: "x@example.org",
            }),
        );
        let uc = use_case(&repo, registry);

        assert!(!uc.is_valid("jdoe", &"pw".into()).await.unwrap());
        assert!(!uc.is_valid("orphan", &"pw".into()).await.unwrap());
    }
}
