//! Application Configuration
//!
//! Process-wide settings for the Auth application layer.

use std::env;

use chrono::Duration;
use platform::password::DigestAlgorithm;

use crate::error::{AuthError, AuthResult};

/// Environment variable names read by [`AuthConfig::from_env`]
pub const ENV_ENCRYPTION: &str = "AUTH_ENCRYPTION";
pub const ENV_IMPLICIT: &str = "AUTH_IMPLICIT";
pub const ENV_SESSION_LIFETIME_DAYS: &str = "AUTH_SESSION_LIFETIME_DAYS";
pub const ENV_UPGRADE_LEGACY_DIGESTS: &str = "AUTH_UPGRADE_LEGACY_DIGESTS";

/// Auth application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Algorithm for every newly computed digest
    pub encryption: DigestAlgorithm,
    /// Identity is asserted by an outer mechanism; local password checks are skipped
    pub implicit_auth: bool,
    /// "Remember Me" session lifetime; 0 keeps browser-session expiry
    pub session_lifetime_days: u32,
    /// Re-digest legacy credentials with `encryption` after a successful check
    pub upgrade_legacy_digests: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            encryption: DigestAlgorithm::Sha256,
            implicit_auth: false,
            session_lifetime_days: 30,
            upgrade_legacy_digests: true,
        }
    }
}

impl AuthConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> AuthResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from a key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> AuthResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ENCRYPTION) {
            config.encryption = value
                .parse()
                .map_err(|e| AuthError::Config(format!("{ENV_ENCRYPTION}: {e}")))?;
        }
        if let Some(value) = lookup(ENV_IMPLICIT) {
            config.implicit_auth = parse_bool(ENV_IMPLICIT, &value)?;
        }
        if let Some(value) = lookup(ENV_SESSION_LIFETIME_DAYS) {
            config.session_lifetime_days = value.trim().parse().map_err(|_| {
                AuthError::Config(format!(
                    "{ENV_SESSION_LIFETIME_DAYS}: expected a whole number of days, got {value:?}"
                ))
            })?;
        }
        if let Some(value) = lookup(ENV_UPGRADE_LEGACY_DIGESTS) {
            config.upgrade_legacy_digests = parse_bool(ENV_UPGRADE_LEGACY_DIGESTS, &value)?;
        }

        Ok(config)
    }

    /// Expiry extension for remembered sessions, if any
    pub fn remember_lifetime(&self) -> Option<Duration> {
        (self.session_lifetime_days > 0)
            .then(|| Duration::days(i64::from(self.session_lifetime_days)))
    }
}

fn parse_bool(key: &str, value: &str) -> AuthResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(AuthError::Config(format!(
            "{key}: expected a boolean, got {value:?}"
        ))),
    }
}
