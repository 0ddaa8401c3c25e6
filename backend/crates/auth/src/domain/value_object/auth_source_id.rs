//! External authentication source identifier
//!
//! Names the `ExternalAuthenticator` a user record delegates login to.

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthSourceId(u64);

impl AuthSourceId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for AuthSourceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
