//! Upload Use Cases
//!
//! Originals are streamed straight to storage; the row is inserted only
//! after the file is complete. A failed insert removes the file again.

use std::sync::Arc;

use axum::body::Bytes;
use futures_util::Stream;
use kernel::id::{ProjectId, VideoId};
use kernel::principal::AdminPrincipal;
use platform::storage::LocalStorage;
use share::domain::{ProjectRepository, ProjectStatus};

use crate::application::config::ReviewConfig;
use crate::domain::entity::video::{VERSION_LABEL_MAX_LENGTH, Video};
use crate::domain::repository::VideoRepository;
use crate::domain::value_object::{asset_slot::AssetSlot, video_name::VideoName};
use crate::error::{ReviewError, ReviewResult};

/// Metadata accompanying an upload
#[derive(Debug, Clone)]
pub struct UploadVersionInput {
    pub name: String,
    pub label: Option<String>,
    pub filename: String,
    pub content_type: String,
    /// Declared body size, checked before streaming
    pub content_length: Option<u64>,
}

/// Upload use case
pub struct UploadUseCase<P, V>
where
    P: ProjectRepository,
    V: VideoRepository,
{
    project_repo: Arc<P>,
    video_repo: Arc<V>,
    storage: Arc<LocalStorage>,
    config: Arc<ReviewConfig>,
}

impl<P, V> UploadUseCase<P, V>
where
    P: ProjectRepository,
    V: VideoRepository,
{
    pub fn new(
        project_repo: Arc<P>,
        video_repo: Arc<V>,
        storage: Arc<LocalStorage>,
        config: Arc<ReviewConfig>,
    ) -> Self {
        Self {
            project_repo,
            video_repo,
            storage,
            config,
        }
    }

    /// Store a new version of `input.name`
    pub async fn upload_version<S, E>(
        &self,
        admin: &AdminPrincipal,
        project_id: ProjectId,
        input: UploadVersionInput,
        body: S,
    ) -> ReviewResult<Video>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
    {
        let mime = media_type(&input.content_type);
        if !mime.starts_with("video/") {
            return Err(ReviewError::UnsupportedMediaType(mime));
        }
        check_declared_size(input.content_length, self.config.max_upload_bytes)?;

        let name = VideoName::new(&input.name).map_err(|e| ReviewError::Validation(e.to_string()))?;
        let label_len = input.label.as_deref().map_or(0, |l| l.trim().chars().count());
        if label_len > VERSION_LABEL_MAX_LENGTH {
            return Err(ReviewError::Validation(format!(
                "Version label must be at most {VERSION_LABEL_MAX_LENGTH} characters"
            )));
        }
        let filename = input.filename.trim();
        if filename.is_empty() {
            return Err(ReviewError::Validation("File name is required".to_string()));
        }

        let project = self
            .project_repo
            .find_project_by_id(project_id)
            .await?
            .ok_or(ReviewError::ProjectNotFound)?;
        if project.is_archived() {
            return Err(ReviewError::ProjectArchived);
        }

        let version = self
            .video_repo
            .latest_version(project_id, &name)
            .await?
            .unwrap_or(0)
            + 1;
        let mut video = Video::new(
            project_id,
            name,
            version,
            input.label.as_deref(),
            filename,
            &mime,
            Some(admin.admin_id),
        );

        let written = self
            .storage
            .write_stream(&video.original_path, body, self.config.max_upload_bytes)
            .await?;
        video.size_bytes = i64::try_from(written)
            .map_err(|_| ReviewError::PayloadTooLarge {
                limit: self.config.max_upload_bytes,
            })?;

        if let Err(e) = self.video_repo.create_video(&video).await {
            self.discard(&video.original_path).await;
            return Err(e);
        }

        // A fresh version needs review again
        if project.status == ProjectStatus::Approved {
            self.project_repo
                .set_project_status(project_id, ProjectStatus::InReview)
                .await?;
        }

        tracing::info!(
            project_id = %project_id,
            video_id = %video.video_id,
            name = %video.name,
            version = video.version,
            bytes = written,
            admin_id = %admin.admin_id,
            "Video version uploaded"
        );
        Ok(video)
    }

    /// Store or replace the preview or thumbnail of a video
    pub async fn attach_asset<S, E>(
        &self,
        video_id: VideoId,
        slot: AssetSlot,
        filename: &str,
        content_type: &str,
        content_length: Option<u64>,
        body: S,
    ) -> ReviewResult<Video>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: std::fmt::Display,
    {
        let mime = media_type(content_type);
        if !slot.accepts(&mime) {
            return Err(ReviewError::UnsupportedMediaType(mime));
        }
        check_declared_size(content_length, self.config.max_asset_bytes)?;

        let mut video = self
            .video_repo
            .find_video(video_id)
            .await?
            .ok_or(ReviewError::VideoNotFound)?;

        let path = video.asset_path(slot, filename, &mime);
        self.storage
            .write_stream(&path, body, self.config.max_asset_bytes)
            .await?;

        let previous = video.set_slot_path(slot, path.clone());
        if let Err(e) = self.video_repo.update_video_assets(&video).await {
            if previous.as_deref() != Some(path.as_str()) {
                self.discard(&path).await;
            }
            return Err(e);
        }

        if let Some(old) = previous.filter(|old| *old != path) {
            self.discard(&old).await;
        }

        tracing::info!(video_id = %video_id, slot = slot.code(), "Video asset attached");
        Ok(video)
    }

    async fn discard(&self, path: &str) {
        if let Err(e) = self.storage.remove(path).await {
            tracing::warn!(path = %path, error = %e, "Failed to remove stored file");
        }
    }
}

/// `video/mp4; codecs=...` -> `video/mp4`
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn check_declared_size(content_length: Option<u64>, limit: u64) -> ReviewResult<()> {
    match content_length {
        Some(len) if len > limit => Err(ReviewError::PayloadTooLarge { limit }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_strips_parameters() {
        assert_eq!(media_type("Video/MP4; codecs=avc1"), "video/mp4");
        assert_eq!(media_type(""), "");
    }

    #[test]
    fn test_declared_size() {
        assert!(check_declared_size(None, 10).is_ok());
        assert!(check_declared_size(Some(10), 10).is_ok());
        assert!(matches!(
            check_declared_size(Some(11), 10),
            Err(ReviewError::PayloadTooLarge { limit: 10 })
        ));
    }
}
