//! Verify Password Use Case
//!
//! Exchanges the project's share password for a session.

use std::sync::Arc;

use platform::client::ClientFingerprint;
use platform::rate_limit::RateLimitStore;

use crate::application::config::ShareConfig;
use crate::application::issue_session::{IssuedSession, mint_session};
use crate::application::rate_limit::enforce;
use crate::application::share_info::load_shared_project;
use crate::domain::entity::share_session::SessionSubject;
use crate::domain::repository::{ProjectRepository, ShareSessionRepository};
use crate::domain::value_object::access_method::AccessMethod;
use crate::error::{ShareError, ShareResult};

/// Verify password use case
pub struct VerifyPasswordUseCase<P, S, L>
where
    P: ProjectRepository,
    S: ShareSessionRepository,
    L: RateLimitStore,
{
    project_repo: Arc<P>,
    session_repo: Arc<S>,
    limiter: Arc<L>,
    config: Arc<ShareConfig>,
}

impl<P, S, L> VerifyPasswordUseCase<P, S, L>
where
    P: ProjectRepository,
    S: ShareSessionRepository,
    L: RateLimitStore,
{
    pub fn new(
        project_repo: Arc<P>,
        session_repo: Arc<S>,
        limiter: Arc<L>,
        config: Arc<ShareConfig>,
    ) -> Self {
        Self {
            project_repo,
            session_repo,
            limiter,
            config,
        }
    }

    pub async fn execute(
        &self,
        slug: &str,
        password: &str,
        fingerprint: &ClientFingerprint,
    ) -> ShareResult<IssuedSession> {
        let project = load_shared_project(self.project_repo.as_ref(), slug).await?;
        if !project.auth_mode.allows_password() {
            return Err(ShareError::MethodNotAllowed);
        }

        let subject = format!("{}:{}", project.project_id, fingerprint.ip_key());
        enforce(
            self.limiter.as_ref(),
            "share-password",
            &subject,
            &self.config.password_rate_limit,
        )
        .await?;
        // Caps guessing spread over many addresses
        enforce(
            self.limiter.as_ref(),
            "share-password-project",
            &project.project_id.to_string(),
            &self.config.password_project_rate_limit,
        )
        .await?;

        let Some(stored) = project.share_password.as_ref() else {
            tracing::error!(project_id = %project.project_id, "Password mode without a stored password");
            return Err(ShareError::InvalidPassword);
        };

        if !stored.verify(password, self.config.pepper()) {
            tracing::warn!(
                project_id = %project.project_id,
                ip = %fingerprint.ip_key(),
                "Share password mismatch"
            );
            return Err(ShareError::InvalidPassword);
        }

        mint_session(
            self.session_repo.as_ref(),
            &self.config,
            &project,
            SessionSubject::anonymous(AccessMethod::Password),
            fingerprint,
        )
        .await
    }
}
