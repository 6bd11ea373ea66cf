//! Bootstrap Use Case
//!
//! Creates the first admin account from configuration. A no-op once
//! any admin exists.

use std::sync::Arc;

use kernel::email::Email;
use kernel::id::AdminId;
use platform::password::ClearTextPassword;

use crate::application::config::AdminConfig;
use crate::domain::entity::admin_user::AdminUser;
use crate::domain::repository::AdminUserRepository;
use crate::error::{AdminError, AdminResult};

/// Bootstrap admin use case
pub struct BootstrapAdminUseCase<U>
where
    U: AdminUserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AdminConfig>,
}

impl<U> BootstrapAdminUseCase<U>
where
    U: AdminUserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AdminConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Returns the new admin's id, or `None` when admins already exist
    pub async fn execute(
        &self,
        email: &str,
        password: String,
        display_name: Option<String>,
    ) -> AdminResult<Option<AdminId>> {
        if self.user_repo.count_admins().await? > 0 {
            tracing::debug!("Admin bootstrap skipped, accounts exist");
            return Ok(None);
        }

        let email = Email::new(email).map_err(|e| AdminError::Internal(e.to_string()))?;
        let password = ClearTextPassword::new(password)
            .map_err(|e| AdminError::PasswordValidation(e.to_string()))?;
        let hash = password
            .hash(self.config.pepper())
            .map_err(|e| AdminError::Internal(e.to_string()))?;

        let display_name = display_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let admin = AdminUser::new(email, display_name, hash);
        self.user_repo.create_admin(&admin).await?;

        tracing::info!(admin_id = %admin.admin_id, email = %admin.email.masked(), "Bootstrapped admin account");
        Ok(Some(admin.admin_id))
    }
}
