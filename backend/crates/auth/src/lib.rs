//! Auth (Authentication & Authorization) Engine
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, external authenticators
//! - `application/` - Use cases and configuration
//! - `infra/` - In-memory and PostgreSQL repository implementations
//!
//! ## Features
//! - Credential validation against salted digests or a delegated external authority
//! - Session registration with id regeneration on every login
//! - Role checks scoped to contexts (context `0` is the site)
//! - Cross-context "may A administer B" policy and administrator impersonation
//! - Temporary passwords, password reset tokens, user name suggestions
//!
//! ## Security Model
//! - Digests are salted with the user name; SHA-256 by default, SHA-1 only
//!   verified and upgraded, never chosen implicitly
//! - Unknown user, wrong password and external rejection are indistinguishable
//! - Disabled accounts validate but are refused at session registration
//! - Every operation takes the session explicitly; there is no ambient state

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult, SessionRejection};
pub use infra::{memory::InMemoryAuthRepository, postgres::PgAuthRepository};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::{
        auth_source_id::AuthSourceId,
        context_id::{ContextId, ContextSelector},
        role_id::RoleId,
        session_id::SessionId,
        user_group_id::UserGroupId,
        user_id::UserId,
        user_name::{UserName, UserNameError},
    };
    pub use platform::password::{ClearTextPassword, DigestAlgorithm, PasswordDigest};
}

pub mod store {
    pub use crate::infra::postgres::PgAuthRepository as AuthStore;
}
