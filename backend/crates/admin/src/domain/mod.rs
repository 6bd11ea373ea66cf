//! Domain Layer
//!
//! Contains entities and repository traits.

pub mod entity;
pub mod repository;

// Re-exports
pub use entity::{admin_session::AdminSession, admin_user::AdminUser};
pub use repository::{AdminSessionRepository, AdminUserRepository};
