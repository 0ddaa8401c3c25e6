//! Session Entity
//!
//! Server-side session: an opaque id, an optional owning user, and a bag of
//! named variables. Created anonymous on first request and promoted on login.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::value_object::{session_id::SessionId, user_id::UserId};

/// Session variable holding the authenticated user's id
pub const USER_ID_VAR: &str = "userId";
/// Session variable holding the authenticated user's name
pub const USER_NAME_VAR: &str = "username";
/// Session variable holding the id of the administrator impersonating the user
pub const SIGNED_IN_AS_VAR: &str = "signedInAs";

/// Session entity
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID (replaced on every successful login)
    pub session_id: SessionId,
    /// Owning user, `None` while anonymous
    pub user_id: Option<UserId>,
    /// Named session variables
    pub variables: HashMap<String, String>,
    /// Whether "Remember Me" was checked
    pub remember: bool,
    /// Absolute expiry; `None` lives as long as the browser session
    pub expires_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last activity timestamp
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    /// Create a new anonymous session with a fresh id
    pub fn new() -> Self {
        let now = Utc::now();

        Self {
            session_id: SessionId::generate(),
            user_id: None,
            variables: HashMap::new(),
            remember: false,
            expires_at: None,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn var(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn remove_var(&mut self, name: &str) -> Option<String> {
        self.variables.remove(name)
    }

    /// User id carried in the session variables
    ///
    /// A value that does not parse is treated as absent.
    pub fn authenticated_user_id(&self) -> Option<UserId> {
        self.var(USER_ID_VAR)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse().ok())
    }

    /// True iff the session carries a non-empty user id
    pub fn is_logged_in(&self) -> bool {
        self.var(USER_ID_VAR).is_some_and(|v| !v.is_empty())
    }

    /// True iff an administrator is signed in as another user
    pub fn is_logged_in_as(&self) -> bool {
        self.var(SIGNED_IN_AS_VAR).is_some_and(|v| !v.is_empty())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Update last activity timestamp
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_session_is_anonymous() {
        let session = Session::new();
        assert!(!session.is_logged_in());
        assert!(!session.is_logged_in_as());
        assert!(session.authenticated_user_id().is_none());
        assert!(!session.is_expired());
    }

    #[test]
    fn test_logged_in_requires_non_empty_user_id() {
        let mut session = Session::new();
        session.set_var(USER_ID_VAR, "");
        assert!(!session.is_logged_in());

        let user_id = UserId::new();
        session.set_var(USER_ID_VAR, user_id.to_string());
        assert!(session.is_logged_in());
        assert_eq!(session.authenticated_user_id(), Some(user_id));
    }

    #[test]
    fn test_unparseable_user_id_is_not_an_identity() {
        let mut session = Session::new();
        session.set_var(USER_ID_VAR, "not-a-uuid");
        assert!(session.is_logged_in());
        assert!(session.authenticated_user_id().is_none());
    }

    #[test]
    fn test_expiry() {
        let mut session = Session::new();
        let now = Utc::now();
        session.expires_at = Some(now + Duration::days(1));
        assert!(!session.is_expired_at(now));
        assert!(session.is_expired_at(now + Duration::days(2)));
    }
}
