//! Session Administration Use Case
//!
//! Listing and revoking share sessions, and admin previews of the share page.

use std::sync::Arc;

use kernel::id::ProjectId;
use kernel::principal::AdminPrincipal;
use platform::client::ClientFingerprint;

use crate::application::config::ShareConfig;
use crate::application::issue_session::{IssuedSession, mint_session};
use crate::domain::entity::{project::Project, share_session::ShareSession};
use crate::domain::entity::share_session::SessionSubject;
use crate::domain::repository::{ProjectRepository, ShareSessionRepository};
use crate::error::{ShareError, ShareResult};

/// Session administration use case
pub struct SessionAdminUseCase<P, S>
where
    P: ProjectRepository,
    S: ShareSessionRepository,
{
    project_repo: Arc<P>,
    session_repo: Arc<S>,
    config: Arc<ShareConfig>,
}

impl<P, S> SessionAdminUseCase<P, S>
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

    /// Active sessions together with the project (for the current version)
    pub async fn list(&self, project_id: ProjectId) -> ShareResult<(Project, Vec<ShareSession>)> {
        let project = self.load(project_id).await?;
        let sessions = self.session_repo.list_active_sessions(project_id).await?;
        Ok((project, sessions))
    }

    /// Invalidate every session of the project
    pub async fn revoke_all(&self, project_id: ProjectId) -> ShareResult<u64> {
        let auth_version = self
            .project_repo
            .bump_auth_version(project_id)
            .await?
            .ok_or(ShareError::ProjectNotFound)?;

        let revoked = self.session_repo.revoke_project_sessions(project_id).await?;

        tracing::info!(
            project_id = %project_id,
            auth_version,
            sessions_revoked = revoked,
            "All share sessions revoked"
        );
        Ok(revoked)
    }

    /// Mint an `admin` session so the admin can see the share page as clients do
    pub async fn issue_admin_preview(
        &self,
        admin: &AdminPrincipal,
        project_id: ProjectId,
        fingerprint: &ClientFingerprint,
    ) -> ShareResult<IssuedSession> {
        let project = self.load(project_id).await?;
        if project.is_archived() {
            return Err(ShareError::ProjectArchived);
        }

        tracing::info!(project_id = %project_id, admin_id = %admin.admin_id, "Admin preview session");
        mint_session(
            self.session_repo.as_ref(),
            &self.config,
            &project,
            SessionSubject::admin(admin.admin_id),
            fingerprint,
        )
        .await
    }

    async fn load(&self, project_id: ProjectId) -> ShareResult<Project> {
        self.project_repo
            .find_project_by_id(project_id)
            .await?
            .ok_or(ShareError::ProjectNotFound)
    }
}
