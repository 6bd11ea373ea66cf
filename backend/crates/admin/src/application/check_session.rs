//! Check Session Use Case
//!
//! Resolves an admin session token into an [`AdminPrincipal`].

use std::sync::Arc;

use chrono::Utc;
use kernel::principal::AdminPrincipal;
use platform::client::ClientFingerprint;

use crate::application::config::AdminConfig;
use crate::application::session_token;
use crate::domain::entity::admin_session::AdminSession;
use crate::domain::repository::{AdminSessionRepository, AdminUserRepository};
use crate::error::{AdminError, AdminResult};

/// Check session use case
pub struct CheckAdminSessionUseCase<U, S>
where
    U: AdminUserRepository,
    S: AdminSessionRepository + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    config: Arc<AdminConfig>,
}

impl<U, S> CheckAdminSessionUseCase<U, S>
where
    U: AdminUserRepository,
    S: AdminSessionRepository + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>, config: Arc<AdminConfig>) -> Self {
        Self {
            user_repo,
            session_repo,
            config,
        }
    }

    /// Validate the token and return the signed-in admin
    pub async fn execute(
        &self,
        session_token: &str,
        fingerprint: &ClientFingerprint,
    ) -> AdminResult<(AdminPrincipal, AdminSession)> {
        let session = self.get_session(session_token, fingerprint).await?;

        let admin = self
            .user_repo
            .find_admin_by_id(session.admin_id)
            .await?
            .ok_or(AdminError::SessionInvalid)?;

        Ok((admin.to_principal(), session))
    }

    /// Get session and update last activity
    async fn get_session(
        &self,
        session_token: &str,
        fingerprint: &ClientFingerprint,
    ) -> AdminResult<AdminSession> {
        let session_id = session_token::parse(
            &self.config.token_secret,
            session_token,
            Utc::now().timestamp_millis(),
        )?;

        let mut session = self
            .session_repo
            .find_admin_session(session_id)
            .await?
            .ok_or(AdminError::SessionInvalid)?;

        if session.is_expired() {
            self.session_repo.delete_admin_session(session_id).await?;
            return Err(AdminError::SessionInvalid);
        }

        if !fingerprint.matches(&session.client_fingerprint_hash) {
            tracing::warn!(session_id = %session_id, "Admin session fingerprint mismatch");
            return Err(AdminError::SessionFingerprintMismatch);
        }

        session.touch();
        let ttl_long = chrono::Duration::from_std(self.config.session_ttl_long)
            .map_err(|e| AdminError::Internal(format!("Invalid session TTL: {e}")))?;
        session.extend_if_needed(ttl_long);

        // Update in background
        let session_clone = session.clone();
        let repo = self.session_repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.update_admin_session(&session_clone).await {
                tracing::warn!(error = %e, "Failed to update admin session activity");
            }
        });

        Ok(session)
    }
}
