//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::{admin_session::AdminSession, admin_user::AdminUser};
use crate::error::AdminResult;
use kernel::email::Email;
use kernel::id::{AdminId, AdminSessionId};

/// Admin account repository trait
#[trait_variant::make(AdminUserRepository: Send)]
pub trait LocalAdminUserRepository {
    async fn create_admin(&self, admin: &AdminUser) -> AdminResult<()>;

    async fn find_admin_by_id(&self, admin_id: AdminId) -> AdminResult<Option<AdminUser>>;

    async fn find_admin_by_email(&self, email: &Email) -> AdminResult<Option<AdminUser>>;

    /// Persist login counters, lockout and profile changes
    async fn update_admin(&self, admin: &AdminUser) -> AdminResult<()>;

    async fn count_admins(&self) -> AdminResult<i64>;
}

/// Admin session repository trait
#[trait_variant::make(AdminSessionRepository: Send)]
pub trait LocalAdminSessionRepository {
    async fn create_admin_session(&self, session: &AdminSession) -> AdminResult<()>;

    async fn find_admin_session(
        &self,
        session_id: AdminSessionId,
    ) -> AdminResult<Option<AdminSession>>;

    /// Update session (last activity, sliding expiry)
    async fn update_admin_session(&self, session: &AdminSession) -> AdminResult<()>;

    async fn delete_admin_session(&self, session_id: AdminSessionId) -> AdminResult<()>;

    /// Clean up expired sessions
    async fn cleanup_expired_admin_sessions(&self) -> AdminResult<u64>;
}
