//! Open Access Use Case
//!
//! Mints a session for a project that needs no authentication.

use std::sync::Arc;

use platform::client::ClientFingerprint;

use crate::application::config::ShareConfig;
use crate::application::issue_session::{IssuedSession, mint_session};
use crate::application::share_info::load_shared_project;
use crate::domain::entity::share_session::SessionSubject;
use crate::domain::repository::{ProjectRepository, ShareSessionRepository};
use crate::domain::value_object::access_method::AccessMethod;
use crate::error::{ShareError, ShareResult};

/// Open access use case
pub struct OpenAccessUseCase<P, S>
where
    P: ProjectRepository,
    S: ShareSessionRepository,
{
    project_repo: Arc<P>,
    session_repo: Arc<S>,
    config: Arc<ShareConfig>,
}

impl<P, S> OpenAccessUseCase<P, S>
where
    P: ProjectRepository,
    S: ShareSessionRepository,
{
    pub fn new(project_repo: Arc<P>, session_repo: Arc<S>, config: Arc<ShareConfig>) -> Self {
        Self {
            project_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(
        &self,
        slug: &str,
        fingerprint: &ClientFingerprint,
    ) -> ShareResult<IssuedSession> {
        let project = load_shared_project(self.project_repo.as_ref(), slug).await?;
        if !project.auth_mode.is_open() {
            return Err(ShareError::MethodNotAllowed);
        }

        mint_session(
            self.session_repo.as_ref(),
            &self.config,
            &project,
            SessionSubject::anonymous(AccessMethod::Open),
            fingerprint,
        )
        .await
    }
}
