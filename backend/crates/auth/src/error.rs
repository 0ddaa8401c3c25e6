//! Auth Error Types
//!
//! Every outcome the engine reports is a variant here; nothing is signalled by
//! panicking. The hosting layer converts into `kernel::error::AppError` to
//! decide user-facing messaging.

use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::value_object::user_name::UserNameError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Why session registration was refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionRejection {
    /// Credentials were fine but the account is administratively disabled
    #[error("account is disabled")]
    AccountDisabled {
        /// Free-text reason recorded by an administrator, empty if none
        reason: String,
    },
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user, wrong password, or rejected by the external authority.
    /// Deliberately not distinguished to prevent user name enumeration.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session registration refused
    #[error("Session rejected: {0}")]
    SessionRejected(SessionRejection),

    /// Addressed user does not exist
    #[error("User not found")]
    UserNotFound,

    /// User name or email already taken
    #[error("Already exists: {0}")]
    Conflict(String),

    /// Session not found or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Operation requires an authenticated session
    #[error("Not logged in")]
    NotLoggedIn,

    /// Authenticated, but the acting user may not do this
    #[error("Not permitted")]
    NotPermitted,

    /// User name failed value-object validation
    #[error("Invalid user name: {0}")]
    InvalidUserName(#[from] UserNameError),

    /// Configuration value could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// External authenticator failed (as opposed to rejecting credentials)
    #[error("External authenticator error: {0}")]
    External(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored session data could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Registration refusal for a disabled account
    pub fn account_disabled(reason: Option<&str>) -> Self {
        AuthError::SessionRejected(SessionRejection::AccountDisabled {
            reason: reason.unwrap_or_default().to_string(),
        })
    }

    /// The disabled reason, if this error is an account-disabled refusal
    pub fn disabled_reason(&self) -> Option<&str> {
        match self {
            AuthError::SessionRejected(SessionRejection::AccountDisabled { reason }) => {
                Some(reason)
            }
            _ => None,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials | AuthError::SessionInvalid | AuthError::NotLoggedIn => {
                ErrorKind::Unauthorized
            }
            AuthError::SessionRejected(_) | AuthError::NotPermitted => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Conflict(_) => ErrorKind::Conflict,
            AuthError::InvalidUserName(_) => ErrorKind::BadRequest,
            AuthError::External(_) => ErrorKind::ServiceUnavailable,
            AuthError::Config(_)
            | AuthError::Database(_)
            | AuthError::Serialization(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Serialization(e) => {
                tracing::error!(error = %e, "Auth session serialization error");
            }
            AuthError::Config(msg) | AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::External(msg) => {
                tracing::warn!(message = %msg, "External authenticator unavailable");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::SessionRejected(rejection) => {
                tracing::warn!(%rejection, "Session registration rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.log();
        match err {
            AuthError::Database(e) => AppError::from(e),
            AuthError::InvalidCredentials => {
                AppError::unauthorized("Invalid user name or password")
                    .with_action("Check your user name and password and try again")
            }
            AuthError::SessionRejected(SessionRejection::AccountDisabled { reason }) => {
                let err = AppError::forbidden("Your account has been disabled");
                if reason.is_empty() {
                    err
                } else {
                    err.with_action(format!("Reason given: {reason}"))
                }
            }
            AuthError::Config(_) | AuthError::Serialization(_) | AuthError::Internal(_) => {
                // internals stay in the log
                AppError::internal("Internal error")
            }
            other => AppError::new(other.kind(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_reason() {
        let err = AuthError::account_disabled(Some("spam"));
        assert_eq!(err.disabled_reason(), Some("spam"));

        let err = AuthError::account_disabled(None);
        assert_eq!(err.disabled_reason(), Some(""));

        assert_eq!(AuthError::InvalidCredentials.disabled_reason(), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(AuthError::InvalidCredentials.kind(), ErrorKind::Unauthorized);
        assert_eq!(
            AuthError::account_disabled(None).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(AuthError::UserNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(AuthError::NotPermitted.kind(), ErrorKind::Forbidden);
        assert_eq!(
            AuthError::Conflict("user name".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            AuthError::Internal("x".into()).kind(),
            ErrorKind::InternalServerError
        );
    }

    #[test]
    fn test_into_app_error() {
        let app: AppError = AuthError::InvalidCredentials.into();
        assert_eq!(app.status_code(), 401);
        assert_eq!(app.message(), "Invalid user name or password");

        let app: AppError = AuthError::account_disabled(Some("left the press")).into();
        assert_eq!(app.status_code(), 403);
        assert_eq!(app.action(), Some("Reason given: left the press"));

        let app: AppError = AuthError::account_disabled(None).into();
        assert!(app.action().is_none());

        let app: AppError = AuthError::Internal("secret detail".into()).into();
        assert!(!app.message().contains("secret detail"));

        let app: AppError = AuthError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(app.status_code(), 503);
    }
}
