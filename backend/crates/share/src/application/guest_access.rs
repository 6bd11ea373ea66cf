//! Guest Access Use Case
//!
//! View-only sessions for projects with guest links enabled.

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

/// Guest access use case
pub struct GuestAccessUseCase<P, S, L>
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

impl<P, S, L> GuestAccessUseCase<P, S, L>
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
        fingerprint: &ClientFingerprint,
    ) -> ShareResult<IssuedSession> {
        let project = load_shared_project(self.project_repo.as_ref(), slug).await?;
        if !project.guest_mode {
            return Err(ShareError::MethodNotAllowed);
        }

        enforce(
            self.limiter.as_ref(),
            "share-guest",
            &fingerprint.ip_key(),
            &self.config.guest_rate_limit,
        )
        .await?;

        mint_session(
            self.session_repo.as_ref(),
            &self.config,
            &project,
            SessionSubject::anonymous(AccessMethod::Guest),
            fingerprint,
        )
        .await
    }
}
