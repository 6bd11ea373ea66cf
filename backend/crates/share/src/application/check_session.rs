//! Check Session Use Case
//!
//! Resolves a share token into a [`ShareViewer`]. Every request behind the
//! share middleware and every content access goes through here.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{ProjectId, ShareSessionId};
use platform::client::ClientFingerprint;

use crate::application::config::ShareConfig;
use crate::application::session_token;
use crate::domain::entity::{project::Project, share_session::ShareSession};
use crate::domain::repository::{ProjectRepository, ShareSessionRepository};
use crate::domain::viewer::ShareViewer;
use crate::error::{ShareError, ShareResult};

/// Check session use case
pub struct CheckShareSessionUseCase<P, S>
where
    P: ProjectRepository,
    S: ShareSessionRepository + Send + Sync + 'static,
{
    project_repo: Arc<P>,
    session_repo: Arc<S>,
    config: Arc<ShareConfig>,
}

impl<P, S> CheckShareSessionUseCase<P, S>
where
    P: ProjectRepository,
    S: ShareSessionRepository + Send + Sync + 'static,
{
    pub fn new(project_repo: Arc<P>, session_repo: Arc<S>, config: Arc<ShareConfig>) -> Self {
        Self {
            project_repo,
            session_repo,
            config,
        }
    }

    /// Validate the token against the session row and its project
    pub async fn execute(
        &self,
        token: &str,
        fingerprint: &ClientFingerprint,
    ) -> ShareResult<ShareViewer> {
        let claims = session_token::parse(
            &self.config.token_secret,
            token,
            Utc::now().timestamp_millis(),
        )?;

        let (mut session, project) = self.load_active(claims.sid, claims.pid).await?;

        if !fingerprint.matches(&session.client_fingerprint_hash) {
            tracing::warn!(session_id = %session.session_id, "Share session fingerprint mismatch");
            return Err(ShareError::SessionFingerprintMismatch);
        }

        session.touch();
        let viewer = ShareViewer::new(&session, &project);

        // Update in background
        let repo = self.session_repo.clone();
        tokio::spawn(async move {
            if let Err(e) = repo.touch_share_session(&session).await {
                tracing::warn!(error = %e, "Failed to update share session activity");
            }
        });

        Ok(viewer)
    }

    /// Re-check a session known by id, as content tokens carry it
    ///
    /// Revocation, expiry, archival and `auth_version` bumps apply; the
    /// fingerprint is the caller's business.
    pub async fn revalidate(
        &self,
        session_id: ShareSessionId,
        project_id: ProjectId,
    ) -> ShareResult<ShareViewer> {
        let (session, project) = self.load_active(session_id, project_id).await?;
        Ok(ShareViewer::new(&session, &project))
    }

    async fn load_active(
        &self,
        session_id: ShareSessionId,
        project_id: ProjectId,
    ) -> ShareResult<(ShareSession, Project)> {
        let session = self
            .session_repo
            .find_share_session(session_id)
            .await?
            .ok_or(ShareError::SessionInvalid)?;

        if session.project_id != project_id || !session.is_active() {
            return Err(ShareError::SessionInvalid);
        }

        let project = self
            .project_repo
            .find_project_by_id(session.project_id)
            .await?
            .ok_or(ShareError::SessionInvalid)?;

        if project.is_archived() || project.auth_version != session.auth_version {
            tracing::debug!(
                session_id = %session.session_id,
                session_version = session.auth_version,
                project_version = project.auth_version,
                "Share session outdated"
            );
            return Err(ShareError::SessionInvalid);
        }

        Ok((session, project))
    }
}
