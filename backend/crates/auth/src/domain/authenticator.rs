//! External Authentication Capabilities
//!
//! Accounts with an auth source delegate credential checks to an
//! [`ExternalAuthenticator`] registered under that source's id. The registry is
//! consulted once per validation and the handle dropped when it returns.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use platform::password::ClearTextPassword;

use crate::domain::entity::user::User;
use crate::domain::value_object::auth_source_id::AuthSourceId;
use crate::error::AuthResult;

/// An external authority that decides whether credentials are valid
#[async_trait]
pub trait ExternalAuthenticator: Send + Sync {
    /// Check the credentials; `Ok(false)` is a rejection, `Err` a failure to ask
    async fn authenticate(
        &self,
        user_name: &str,
        password: &ClearTextPassword,
    ) -> AuthResult<bool>;

    /// Refresh profile fields (notably email) from the remote source in place
    async fn refresh_profile(&self, user: &mut User) -> AuthResult<()>;
}

/// Identity established before the engine is invoked (implicit authentication)
#[async_trait]
pub trait IdentityAssertion: Send + Sync {
    /// The asserted user name, if the outer mechanism established one
    async fn asserted_user_name(&self) -> AuthResult<Option<String>>;
}

/// Auth source id -> authenticator
#[derive(Clone, Default)]
pub struct AuthenticatorRegistry {
    authenticators: HashMap<AuthSourceId, Arc<dyn ExternalAuthenticator>>,
}

impl AuthenticatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authenticator, replacing any previous one for the source
    pub fn register(
        &mut self,
        auth_source_id: AuthSourceId,
        authenticator: Arc<dyn ExternalAuthenticator>,
    ) -> &mut Self {
        self.authenticators.insert(auth_source_id, authenticator);
        self
    }

    pub fn resolve(&self, auth_source_id: AuthSourceId) -> Option<Arc<dyn ExternalAuthenticator>> {
        self.authenticators.get(&auth_source_id).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.authenticators.is_empty()
    }
}

impl std::fmt::Debug for AuthenticatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatorRegistry")
            .field("sources", &self.authenticators.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AcceptAll;

    #[async_trait]
    impl ExternalAuthenticator for AcceptAll {
        async fn authenticate(&self, _: &str, _: &ClearTextPassword) -> AuthResult<bool> {
            Ok(true)
        }

        async fn refresh_profile(&self, _: &mut User) -> AuthResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_registry_resolves_registered_sources_only() {
        let mut registry = AuthenticatorRegistry::new();
        assert!(registry.is_empty());
        registry.register(AuthSourceId::new(1), Arc::new(AcceptAll));

        assert!(registry.resolve(AuthSourceId::new(2)).is_none());
        let authenticator = registry.resolve(AuthSourceId::new(1)).unwrap();
        let ok = authenticator
            .authenticate("jdoe", &ClearTextPassword::new("pw"))
            .await
            .unwrap();
        assert!(ok);
    }
}
