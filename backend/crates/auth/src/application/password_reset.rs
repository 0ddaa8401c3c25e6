//! Password Reset Tokens
//!
//! A reset token is the first six hex characters of a digest over the user's
//! id, name and current password digest. Changing the password changes the
//! digest and so invalidates every outstanding token; other profile edits do
//! not.

use std::sync::Arc;

use platform::crypto::constant_time_eq;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Hex characters kept from the digest
pub const RESET_TOKEN_LENGTH: usize = 6;

/// Password reset use case
pub struct PasswordResetUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> PasswordResetUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Token for the user's current password; `UserNotFound` for unknown ids
    pub async fn generate(&self, user_id: &UserId) -> AuthResult<String> {
        let user = self.find_user(user_id).await?;
        Ok(self.token_for(&user))
    }

    /// Does `token` match the user's current password
    pub async fn verify(&self, user_id: &UserId, token: &str) -> AuthResult<bool> {
        let user = match self.find_user(user_id).await {
            Ok(user) => user,
            Err(AuthError::UserNotFound) => return Ok(false),
            Err(e) => return Err(e),
        };
        let expected = self.token_for(&user);
        Ok(constant_time_eq(expected.as_bytes(), token.trim().as_bytes()))
    }

    async fn find_user(&self, user_id: &UserId) -> AuthResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    fn token_for(&self, user: &User) -> String {
        let material = format!(
            "{}{}{}",
            user.user_id,
            user.user_name,
            user.password_digest.as_str()
        );
        let mut token = self.config.encryption.hex_digest(material.as_bytes());
        token.truncate(RESET_TOKEN_LENGTH);
        token
    }
}
