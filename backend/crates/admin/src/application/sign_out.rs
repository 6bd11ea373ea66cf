//! Sign Out Use Case
//!
//! Deletes the admin session behind a token.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::AdminConfig;
use crate::application::session_token;
use crate::domain::repository::AdminSessionRepository;
use crate::error::AdminResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: AdminSessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AdminConfig>,
}

impl<S> SignOutUseCase<S>
where
    S: AdminSessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AdminConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Sign out from current session
    pub async fn execute(&self, session_token: &str) -> AdminResult<()> {
        let session_id = session_token::parse(
            &self.config.token_secret,
            session_token,
            Utc::now().timestamp_millis(),
        )?;
        self.session_repo.delete_admin_session(session_id).await?;

        tracing::info!(session_id = %session_id, "Admin signed out");
        Ok(())
    }
}
