//! Application Layer
//!
//! Use cases and application services.

pub mod administration;
pub mod authorization;
pub mod check_credentials;
pub mod check_session;
pub mod config;
pub mod password_reset;
pub mod register_session;
pub mod sign_in;
pub mod sign_in_as;
pub mod sign_out;
pub mod username_suggestion;

// Re-exports
pub use administration::AdministrationPolicy;
pub use authorization::{AuthorizationChecker, RequestContext};
pub use check_credentials::CheckCredentialsUseCase;
pub use check_session::CheckSessionUseCase;
pub use config::AuthConfig;
pub use password_reset::PasswordResetUseCase;
pub use register_session::RegisterSessionUseCase;
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_in_as::SignInAsUseCase;
pub use sign_out::SignOutUseCase;
pub use username_suggestion::SuggestUserNameUseCase;

/// Temporary password generation lives with the other password primitives
pub use platform::password::{DEFAULT_GENERATED_PASSWORD_LENGTH, generate_password};
