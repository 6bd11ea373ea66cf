//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::{CommentId, ProjectId, VideoId};

use crate::domain::entity::{comment::Comment, video::Video};
use crate::domain::value_object::video_name::VideoName;
use crate::error::ReviewResult;

/// Video repository trait
#[trait_variant::make(VideoRepository: Send)]
pub trait LocalVideoRepository {
    /// Insert; a taken (project, name, version) yields `ReviewError::VersionConflict`
    async fn create_video(&self, video: &Video) -> ReviewResult<()>;

    async fn find_video(&self, video_id: VideoId) -> ReviewResult<Option<Video>>;

    async fn list_project_videos(&self, project_id: ProjectId) -> ReviewResult<Vec<Video>>;

    /// Highest version number of a name
    async fn latest_version(
        &self,
        project_id: ProjectId,
        name: &VideoName,
    ) -> ReviewResult<Option<i32>>;

    /// Persist preview and thumbnail paths
    async fn update_video_assets(&self, video: &Video) -> ReviewResult<()>;

    /// Persist approval state
    async fn update_video_approval(&self, video: &Video) -> ReviewResult<()>;
}

/// Comment repository trait
#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn create_comment(&self, comment: &Comment) -> ReviewResult<()>;

    async fn find_comment(&self, comment_id: CommentId) -> ReviewResult<Option<Comment>>;

    /// Oldest first
    async fn list_video_comments(&self, video_id: VideoId) -> ReviewResult<Vec<Comment>>;

    /// Delete a comment together with its replies
    async fn delete_comment(&self, comment_id: CommentId) -> ReviewResult<bool>;
}

/// Both review repositories behind one handle
pub trait ReviewStore: VideoRepository + CommentRepository + Clone + Send + Sync + 'static {}

impl<T> ReviewStore for T where T: VideoRepository + CommentRepository + Clone + Send + Sync + 'static
{}
