//! Infrastructure Layer
//!
//! Repository implementations: PostgreSQL for deployments, in-memory for
//! tests and embedded hosts.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAuthRepository;
pub use postgres::PgAuthRepository;
