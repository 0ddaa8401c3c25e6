//! Value Object Module

pub mod auth_source_id;
pub mod context_id;
pub mod role_id;
pub mod session_id;
pub mod user_group_id;
pub mod user_id;
pub mod user_name;
