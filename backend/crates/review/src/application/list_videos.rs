//! List Videos Use Case
//!
//! Video listings for share viewers and admins.

use std::sync::Arc;

use kernel::id::ProjectId;
use share::ShareViewer;
use share::domain::ProjectRepository;

use crate::domain::entity::video::{Video, latest_versions, sort_for_listing};
use crate::domain::repository::VideoRepository;
use crate::error::{ReviewError, ReviewResult};

/// A video with whether it is the newest version of its name
#[derive(Debug, Clone)]
pub struct ListedVideo {
    pub video: Video,
    pub is_latest: bool,
}

/// List videos use case
pub struct ListVideosUseCase<P, V>
where
    P: ProjectRepository,
    V: VideoRepository,
{
    project_repo: Arc<P>,
    video_repo: Arc<V>,
}

impl<P, V> ListVideosUseCase<P, V>
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

    /// Videos of the viewer's project, newest version first per name
    pub async fn for_viewer(&self, viewer: &ShareViewer) -> ReviewResult<Vec<ListedVideo>> {
        let listed = self.load(viewer.project_id).await?;
        if viewer.latest_versions_only() {
            return Ok(listed.into_iter().filter(|v| v.is_latest).collect());
        }
        Ok(listed)
    }

    /// Every version of a project, for admins
    pub async fn for_admin(&self, project_id: ProjectId) -> ReviewResult<Vec<ListedVideo>> {
        self.project_repo
            .find_project_by_id(project_id)
            .await?
            .ok_or(ReviewError::ProjectNotFound)?;
        self.load(project_id).await
    }

    async fn load(&self, project_id: ProjectId) -> ReviewResult<Vec<ListedVideo>> {
        let mut videos = self.video_repo.list_project_videos(project_id).await?;
        sort_for_listing(&mut videos);

        let latest = latest_versions(&videos);
        Ok(videos
            .into_iter()
            .map(|video| ListedVideo {
                is_latest: latest.get(&video.name) == Some(&video.version),
                video,
            })
            .collect())
    }
}
