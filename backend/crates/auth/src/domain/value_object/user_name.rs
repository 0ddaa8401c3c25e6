//! User Name Value Object
//!
//! The user name is the public handle used to log in.
//!
//! ## Invariants
//! - leading and trailing whitespace is trimmed
//! - non-empty, at most 32 characters
//! - no inner whitespace or control characters
//! - comparison ignores case (`canonical()` is lower-case)

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 32;

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserNameError {
    #[error("User name cannot be empty")]
    Empty,

    #[error("User name must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("User name cannot contain whitespace or control characters")]
    InvalidCharacter,
}

/// Validated user name, kept as entered
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub fn new(raw: impl Into<String>) -> Result<Self, UserNameError> {
        let raw = raw.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(UserNameError::Empty);
        }

        let char_count = trimmed.chars().count();
        if char_count > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                max: USER_NAME_MAX_LENGTH,
                actual: char_count,
            });
        }

        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(UserNameError::InvalidCharacter);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_stored(user_name: impl Into<String>) -> Self {
        Self(user_name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-cased form used for uniqueness and lookups
    pub fn canonical(&self) -> String {
        self.0.to_lowercase()
    }

    /// Case-insensitive comparison with raw input
    pub fn matches(&self, other: &str) -> bool {
        self.canonical() == other.trim().to_lowercase()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
