//! User Entity
//!
//! The account record the engine authenticates against.

use chrono::{DateTime, Utc};
use platform::password::PasswordDigest;

use crate::domain::value_object::{
    auth_source_id::AuthSourceId, user_id::UserId, user_name::UserName,
};

/// User entity
///
/// When `auth_source_id` is set the stored digest is not authoritative for
/// login; the external authenticator registered for that source is.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// User name (unique, case-insensitive)
    pub user_name: UserName,
    /// Credential digest, salted with the user name
    pub password_digest: PasswordDigest,
    /// External authority this account delegates login to
    pub auth_source_id: Option<AuthSourceId>,
    /// Email (unique, case-insensitive)
    pub email: String,
    /// Administratively disabled
    pub disabled: bool,
    /// Free text recorded when the account was disabled
    pub disabled_reason: Option<String>,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new, enabled, locally authenticated user
    pub fn new(
        user_name: UserName,
        password_digest: PasswordDigest,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            password_digest,
            auth_source_id: None,
            email: email.into(),
            disabled: false,
            disabled_reason: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Delegate login to an external authority
    pub fn with_auth_source(mut self, auth_source_id: AuthSourceId) -> Self {
        self.auth_source_id = Some(auth_source_id);
        self
    }

    /// Whether login is decided by an external authority
    pub fn is_delegated(&self) -> bool {
        self.auth_source_id.is_some()
    }

    /// Record successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn disable(&mut self, reason: Option<String>) {
        self.disabled = true;
        self.disabled_reason = reason.filter(|r| !r.is_empty());
        self.updated_at = Utc::now();
    }

    pub fn enable(&mut self) {
        self.disabled = false;
        self.disabled_reason = None;
        self.updated_at = Utc::now();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.updated_at = Utc::now();
    }

    /// Replace the credential digest (password change or algorithm upgrade)
    pub fn set_password_digest(&mut self, digest: PasswordDigest) {
        self.password_digest = digest;
        self.updated_at = Utc::now();
    }

    /// Disabled reason, empty when none was recorded
    pub fn disabled_reason_or_empty(&self) -> &str {
        self.disabled_reason.as_deref().unwrap_or_default()
    }
}
