//! Admin Comment Use Cases

use std::sync::Arc;

use kernel::id::{CommentId, VideoId};
use kernel::principal::AdminPrincipal;

use crate::application::comments::{CommentContent, PostCommentInput, load_parent};
use crate::domain::entity::comment::{
    Comment, CommentAuthor, CommentThread, build_threads, normalize_author_name,
};
use crate::domain::entity::video::Video;
use crate::domain::repository::{CommentRepository, VideoRepository};
use crate::error::{ReviewError, ReviewResult};

/// Admin comment use case
pub struct AdminCommentsUseCase<V, C>
where
    V: VideoRepository,
    C: CommentRepository,
{
    video_repo: Arc<V>,
    comment_repo: Arc<C>,
}

impl<V, C> AdminCommentsUseCase<V, C>
where
    V: VideoRepository,
    C: CommentRepository,
{
    pub fn new(video_repo: Arc<V>, comment_repo: Arc<C>) -> Self {
        Self {
            video_repo,
            comment_repo,
        }
    }

    pub async fn list(&self, video_id: VideoId) -> ReviewResult<Vec<CommentThread>> {
        let video = self.load_video(video_id).await?;
        let comments = self.comment_repo.list_video_comments(video.video_id).await?;
        Ok(build_threads(comments))
    }

    /// Post as staff; `parent_id` makes it a reply
    pub async fn reply(
        &self,
        admin: &AdminPrincipal,
        video_id: VideoId,
        input: PostCommentInput,
    ) -> ReviewResult<Comment> {
        let video = self.load_video(video_id).await?;
        let content = CommentContent::parse(&input)?;
        let parent = load_parent(self.comment_repo.as_ref(), input.parent_id).await?;

        let name = input
            .author_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| admin.author_name());
        let name = normalize_author_name(name).map_err(|e| ReviewError::Validation(e.to_string()))?;

        let comment = Comment::new(
            &video,
            parent.as_ref(),
            CommentAuthor::admin(admin.admin_id, name, None),
            content.body,
            content.timecode,
            content.annotation,
        )
        .map_err(|e| ReviewError::Validation(e.to_string()))?;
        self.comment_repo.create_comment(&comment).await?;

        tracing::info!(
            video_id = %video.video_id,
            comment_id = %comment.comment_id,
            admin_id = %admin.admin_id,
            "Admin comment posted"
        );
        Ok(comment)
    }

    /// Moderation delete of any comment
    pub async fn delete(&self, admin: &AdminPrincipal, comment_id: CommentId) -> ReviewResult<()> {
        if !self.comment_repo.delete_comment(comment_id).await? {
            return Err(ReviewError::CommentNotFound);
        }
        tracing::info!(comment_id = %comment_id, admin_id = %admin.admin_id, "Comment removed by admin");
        Ok(())
    }

    async fn load_video(&self, video_id: VideoId) -> ReviewResult<Video> {
        self.video_repo
            .find_video(video_id)
            .await?
            .ok_or(ReviewError::VideoNotFound)
    }
}
