//! Entity Module

pub mod role;
pub mod session;
pub mod user;
pub mod user_group;

pub use role::Role;
pub use session::Session;
pub use user::User;
pub use user_group::UserGroup;
