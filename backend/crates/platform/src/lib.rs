//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, SHA-1, hex/base64, random tokens)
//! - Credential digests (user-name salted, strong default with a legacy algorithm)
//! - Temporary password generation

pub mod crypto;
pub mod password;
