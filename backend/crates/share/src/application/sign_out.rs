//! Sign Out Use Case
//!
//! Revokes the share session behind a token.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::ShareConfig;
use crate::application::session_token;
use crate::domain::repository::ShareSessionRepository;
use crate::error::ShareResult;

/// Sign out use case
pub struct ShareSignOutUseCase<S>
where
    S: ShareSessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<ShareConfig>,
}

impl<S> ShareSignOutUseCase<S>
where
    S: ShareSessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<ShareConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, token: &str) -> ShareResult<()> {
        let claims = session_token::parse(
            &self.config.token_secret,
            token,
            Utc::now().timestamp_millis(),
        )?;
        self.session_repo.revoke_share_session(claims.sid).await?;

        tracing::info!(session_id = %claims.sid, "Share session signed out");
        Ok(())
    }
}
