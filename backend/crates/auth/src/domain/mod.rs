//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the external
//! authentication capabilities.

pub mod authenticator;
pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use authenticator::{AuthenticatorRegistry, ExternalAuthenticator, IdentityAssertion};
pub use entity::{role::Role, session::Session, user::User, user_group::UserGroup};
pub use repository::{RoleRepository, SessionRepository, UserGroupRepository, UserRepository};
