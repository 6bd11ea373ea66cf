//! Approval Use Cases
//!
//! Clients approve videos; once every latest version is approved the
//! project itself becomes `approved`. Admins can take an approval back.

use std::sync::Arc;

use kernel::id::VideoId;
use kernel::principal::AdminPrincipal;
use share::ShareViewer;
use share::domain::{ProjectRepository, ProjectStatus};

use crate::application::comments::ensure_can_interact;
use crate::domain::entity::video::{Video, all_latest_approved};
use crate::domain::repository::VideoRepository;
use crate::error::{ReviewError, ReviewResult};

/// Result of an approval
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub video: Video,
    pub project_status: ProjectStatus,
}

/// Approval use case
pub struct ApprovalUseCase<P, V>
where
    P: ProjectRepository,
    V: VideoRepository,
{
    project_repo: Arc<P>,
    video_repo: Arc<V>,
}

impl<P, V> ApprovalUseCase<P, V>
where
    P: ProjectRepository,
    V: VideoRepository,
{
    pub fn new(project_repo: Arc<P>, video_repo: Arc<V>) -> Self {
        Self {
            project_repo,
            video_repo,
        }
    }

    /// Approve a video from the share page
    pub async fn approve(
        &self,
        viewer: &ShareViewer,
        video_id: VideoId,
    ) -> ReviewResult<ApprovalOutcome> {
        ensure_can_interact(viewer)?;

        let mut video = self
            .video_repo
            .find_video(video_id)
            .await?
            .filter(|v| v.project_id == viewer.project_id)
            .ok_or(ReviewError::VideoNotFound)?;

        let approved_by = viewer
            .recipient_email
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| viewer.method.code().to_string());

        if video.approve(Some(approved_by)) {
            self.video_repo.update_video_approval(&video).await?;
            tracing::info!(
                project_id = %video.project_id,
                video_id = %video.video_id,
                session_id = %viewer.session_id,
                "Video approved"
            );
        }

        let videos = self.video_repo.list_project_videos(video.project_id).await?;
        let project_status = if all_latest_approved(&videos) {
            self.project_repo
                .set_project_status(video.project_id, ProjectStatus::Approved)
                .await?;
            tracing::info!(project_id = %video.project_id, "All latest versions approved");
            ProjectStatus::Approved
        } else {
            self.current_status(&video).await?
        };

        Ok(ApprovalOutcome {
            video,
            project_status,
        })
    }

    /// Revoke an approval; the project goes back to review
    pub async fn unapprove(
        &self,
        admin: &AdminPrincipal,
        video_id: VideoId,
    ) -> ReviewResult<ApprovalOutcome> {
        let mut video = self
            .video_repo
            .find_video(video_id)
            .await?
            .ok_or(ReviewError::VideoNotFound)?;

        if video.unapprove() {
            self.video_repo.update_video_approval(&video).await?;
        }
        self.project_repo
            .set_project_status(video.project_id, ProjectStatus::InReview)
            .await?;

        tracing::info!(
            project_id = %video.project_id,
            video_id = %video.video_id,
            admin_id = %admin.admin_id,
            "Video approval revoked"
        );

        let project_status = self.current_status(&video).await?;
        Ok(ApprovalOutcome {
            video,
            project_status,
        })
    }

    async fn current_status(&self, video: &Video) -> ReviewResult<ProjectStatus> {
        let project = self
            .project_repo
            .find_project_by_id(video.project_id)
            .await?
            .ok_or(ReviewError::ProjectNotFound)?;
        Ok(project.status)
    }
}
