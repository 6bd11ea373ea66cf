//! Viewer Comment Use Cases
//!
//! Listing, posting and deleting comments from the share page.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::{CommentId, VideoId};
use platform::rate_limit::RateLimitStore;
use share::ShareViewer;

use crate::application::config::ReviewConfig;
use crate::domain::entity::comment::{
    Comment, CommentAuthor, CommentThread, build_threads, normalize_author_name,
};
use crate::domain::entity::video::Video;
use crate::domain::repository::{CommentRepository, VideoRepository};
use crate::domain::value_object::{
    annotation::Annotation, comment_body::CommentBody, timecode::Timecode,
};
use crate::error::{ReviewError, ReviewResult};

/// Comment input as received from a client
#[derive(Debug, Clone, Default)]
pub struct PostCommentInput {
    pub body: String,
    pub timecode_ms: Option<i64>,
    pub annotation: Option<serde_json::Value>,
    pub parent_id: Option<CommentId>,
    pub author_name: Option<String>,
}

/// Validated pieces of a comment
pub(crate) struct CommentContent {
    pub body: CommentBody,
    pub timecode: Option<Timecode>,
    pub annotation: Option<Annotation>,
}

impl CommentContent {
    pub(crate) fn parse(input: &PostCommentInput) -> ReviewResult<Self> {
        let body =
            CommentBody::new(&input.body).map_err(|e| ReviewError::Validation(e.to_string()))?;
        let timecode = input
            .timecode_ms
            .map(Timecode::from_millis)
            .transpose()
            .map_err(|e| ReviewError::Validation(e.to_string()))?;
        let annotation = input
            .annotation
            .clone()
            .map(Annotation::from_json)
            .transpose()
            .map_err(|e| ReviewError::Validation(e.to_string()))?;

        Ok(Self {
            body,
            timecode,
            annotation,
        })
    }
}

/// Load a parent comment for a reply
pub(crate) async fn load_parent<C: CommentRepository>(
    comment_repo: &C,
    parent_id: Option<CommentId>,
) -> ReviewResult<Option<Comment>> {
    match parent_id {
        Some(id) => comment_repo
            .find_comment(id)
            .await?
            .map(Some)
            .ok_or_else(|| ReviewError::Validation("Parent comment not found".to_string())),
        None => Ok(None),
    }
}

/// Viewer comment use case
pub struct ViewerCommentsUseCase<V, C, L>
where
    V: VideoRepository,
    C: CommentRepository,
    L: RateLimitStore,
{
    video_repo: Arc<V>,
    comment_repo: Arc<C>,
    limiter: Arc<L>,
    config: Arc<ReviewConfig>,
}

impl<V, C, L> ViewerCommentsUseCase<V, C, L>
where
    V: VideoRepository,
    C: CommentRepository,
    L: RateLimitStore,
{
    pub fn new(
        video_repo: Arc<V>,
        comment_repo: Arc<C>,
        limiter: Arc<L>,
        config: Arc<ReviewConfig>,
    ) -> Self {
        Self {
            video_repo,
            comment_repo,
            limiter,
            config,
        }
    }

    /// Threaded comments of a video; guests get none
    pub async fn list(
        &self,
        viewer: &ShareViewer,
        video_id: VideoId,
    ) -> ReviewResult<Vec<CommentThread>> {
        ensure_can_interact(viewer)?;
        let video = self.visible_video(viewer, video_id).await?;
        let comments = self.comment_repo.list_video_comments(video.video_id).await?;
        Ok(build_threads(comments))
    }

    pub async fn post(
        &self,
        viewer: &ShareViewer,
        video_id: VideoId,
        input: PostCommentInput,
    ) -> ReviewResult<Comment> {
        ensure_can_interact(viewer)?;
        self.check_rate_limit(viewer).await?;

        let video = self.visible_video(viewer, video_id).await?;
        let content = CommentContent::parse(&input)?;
        let author = author_for(viewer, input.author_name.as_deref())?;
        let parent = load_parent(self.comment_repo.as_ref(), input.parent_id).await?;

        let comment = Comment::new(
            &video,
            parent.as_ref(),
            author,
            content.body,
            content.timecode,
            content.annotation,
        )
        .map_err(|e| ReviewError::Validation(e.to_string()))?;
        self.comment_repo.create_comment(&comment).await?;

        tracing::info!(
            project_id = %comment.project_id,
            video_id = %comment.video_id,
            comment_id = %comment.comment_id,
            session_id = %viewer.session_id,
            reply = comment.is_reply(),
            "Comment posted"
        );
        Ok(comment)
    }

    /// Delete a comment written by this very session
    pub async fn delete(&self, viewer: &ShareViewer, comment_id: CommentId) -> ReviewResult<()> {
        ensure_can_interact(viewer)?;

        let comment = self
            .comment_repo
            .find_comment(comment_id)
            .await?
            .filter(|c| c.project_id == viewer.project_id)
            .ok_or(ReviewError::CommentNotFound)?;

        if !comment.written_by(viewer.session_id) {
            tracing::warn!(
                comment_id = %comment_id,
                session_id = %viewer.session_id,
                "Attempt to delete another author's comment"
            );
            return Err(ReviewError::NotCommentAuthor);
        }

        self.comment_repo.delete_comment(comment_id).await?;
        tracing::info!(comment_id = %comment_id, session_id = %viewer.session_id, "Comment deleted");
        Ok(())
    }

    async fn visible_video(&self, viewer: &ShareViewer, video_id: VideoId) -> ReviewResult<Video> {
        self.video_repo
            .find_video(video_id)
            .await?
            .filter(|v| v.project_id == viewer.project_id)
            .ok_or(ReviewError::VideoNotFound)
    }

    async fn check_rate_limit(&self, viewer: &ShareViewer) -> ReviewResult<()> {
        let key = format!("review-comment:{}", viewer.session_id);
        let result = self
            .limiter
            .check_and_increment(&key, &self.config.comment_rate_limit)
            .await
            .map_err(|e| ReviewError::Internal(format!("Rate limiter failed: {e}")))?;

        if !result.allowed {
            return Err(ReviewError::RateLimited {
                retry_after_secs: result.retry_after_secs(Utc::now().timestamp_millis()),
            });
        }
        Ok(())
    }
}

pub(crate) fn ensure_can_interact(viewer: &ShareViewer) -> ReviewResult<()> {
    if viewer.method.can_interact() {
        Ok(())
    } else {
        Err(ReviewError::GuestNotAllowed)
    }
}

/// Author identity for a viewer's comment
///
/// OTP viewers fall back to their recipient email; everyone else names
/// themselves.
fn author_for(viewer: &ShareViewer, name: Option<&str>) -> ReviewResult<CommentAuthor> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());

    if let Some(admin_id) = viewer.admin_id.filter(|_| viewer.is_admin()) {
        let name = normalize_author_name(name.unwrap_or("Studio"))
            .map_err(|e| ReviewError::Validation(e.to_string()))?;
        return Ok(CommentAuthor::admin(admin_id, name, Some(viewer.session_id)));
    }

    let name = match (name, &viewer.recipient_email) {
        (Some(name), _) => normalize_author_name(name),
        (None, Some(email)) => Ok(email.to_string()),
        (None, None) => normalize_author_name(""),
    }
    .map_err(|e| ReviewError::Validation(e.to_string()))?;

    Ok(CommentAuthor::client(
        name,
        viewer.recipient_email.clone(),
        viewer.session_id,
    ))
}
