//! Credential Digests and Temporary Passwords
//!
//! Credentials are stored as a hex digest of `user_name ++ password`:
//! - The user name acts as a per-account salt, so equal passwords on
//!   different accounts never share a digest
//! - The digest is deterministic, so it can be recomputed for comparison
//!   and for deriving password-reset tokens
//!
//! ## Algorithms
//! - **SHA-256**: the default for every digest this crate writes
//! - **SHA-1**: legacy, only recognised so digests written by older
//!   deployments keep verifying (see [`DigestAlgorithm::detect`])
//!
//! There is no silent downgrade: callers always name the algorithm, and the
//! strong one is always available.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::crypto::{constant_time_eq, sha1, sha256, to_hex};

// ============================================================================
// Constants
// ============================================================================

/// Default length of generated temporary passwords
pub const DEFAULT_GENERATED_PASSWORD_LENGTH: usize = 8;

/// Letters used for generated passwords (no `l` or `o`, which read as `1`/`0`)
const PASSWORD_LETTERS: &[u8] = b"abcdefghijkmnpqrstuvwxyz";

/// Digits used for generated passwords (no `0` or `1`)
const PASSWORD_DIGITS: &[u8] = b"23456789";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// Configuration named an algorithm this crate does not implement
    #[error("Unknown digest algorithm: {0}")]
    UnknownAlgorithm(String),
}

// ============================================================================
// Digest Algorithm
// ============================================================================

/// Digest function used for stored credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    /// Legacy; accepted for verification, never chosen implicitly
    Sha1,
}

impl DigestAlgorithm {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha1 => "sha1",
        }
    }

    /// Length of the hex-encoded digest
    #[inline]
    pub const fn hex_len(&self) -> usize {
        match self {
            Self::Sha256 => 64,
            Self::Sha1 => 40,
        }
    }

    #[inline]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Sha1)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        if code.eq_ignore_ascii_case("sha256") || code.eq_ignore_ascii_case("sha-256") {
            Some(Self::Sha256)
        } else if code.eq_ignore_ascii_case("sha1") || code.eq_ignore_ascii_case("sha-1") {
            Some(Self::Sha1)
        } else {
            None
        }
    }

    /// Identify the algorithm that produced a stored hex digest
    ///
    /// Returns `None` for anything that is not a hex string of a known length.
    pub fn detect(digest: &str) -> Option<Self> {
        if !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        [Self::Sha256, Self::Sha1]
            .into_iter()
            .find(|algorithm| algorithm.hex_len() == digest.len())
    }

    /// Hex digest of arbitrary bytes
    pub fn hex_digest(&self, data: &[u8]) -> String {
        match self {
            Self::Sha256 => to_hex(&sha256(data)),
            Self::Sha1 => to_hex(&sha1(data)),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = PasswordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| PasswordError::UnknownAlgorithm(s.to_string()))
    }
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// - Does not implement `Clone` to prevent accidental copies
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the secret, e.g. to hand it to an external authority
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

impl From<String> for ClearTextPassword {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<&str> for ClearTextPassword {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

// ============================================================================
// Password Digest (Safe to store)
// ============================================================================

/// Hex-encoded credential digest as stored on the user record
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest loaded from storage
    pub fn from_stored(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Algorithm that produced this digest, if recognisable
    pub fn algorithm(&self) -> Option<DigestAlgorithm> {
        DigestAlgorithm::detect(&self.0)
    }

    /// Compare two digests in constant time
    pub fn matches(&self, other: &PasswordDigest) -> bool {
        constant_time_eq(self.0.as_bytes(), other.0.as_bytes())
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PasswordDigest").field(&"[DIGEST]").finish()
    }
}

/// Compute the stored digest for a user name / password pair
///
/// The user name is prepended to the password before digesting.
pub fn digest_credentials(
    user_name: &str,
    password: &ClearTextPassword,
    algorithm: DigestAlgorithm,
) -> PasswordDigest {
    let mut salted = Zeroizing::new(Vec::with_capacity(user_name.len() + password.0.len()));
    salted.extend_from_slice(user_name.as_bytes());
    salted.extend_from_slice(password.as_bytes());
    PasswordDigest(algorithm.hex_digest(&salted))
}

// ============================================================================
// Temporary Passwords
// ============================================================================

/// Generate a temporary password from unambiguous letters and digits
///
/// Each character is a digit with probability 1/4, otherwise a letter.
/// Only meant for short-lived passwords the user is asked to replace.
pub fn generate_password(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let alphabet = if rng.random_range(0..4) == 0 {
                PASSWORD_DIGITS
            } else {
                PASSWORD_LETTERS
            };
            alphabet[rng.random_range(0..alphabet.len())] as char
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
