//! HTTP Handlers (share viewer)
//!
//! Every route here sits behind the share session middleware, which
//! provides the `ShareViewer` extension.

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use platform::rate_limit::MemoryRateLimitStore;
use share::ShareViewer;
use share::domain::ShareStore;
use std::sync::Arc;
use uuid::Uuid;

use kernel::id::{CommentId, VideoId};

use crate::application::config::ReviewConfig;
use crate::application::{ApprovalUseCase, ListVideosUseCase, ViewerCommentsUseCase};
use crate::domain::repository::ReviewStore;
use crate::error::ReviewResult;
use crate::presentation::dto::{
    ApprovalResponse, CommentResponse, PostCommentRequest, ThreadResponse, VideoResponse,
};

/// Shared state for viewer handlers
#[derive(Clone)]
pub struct ReviewAppState<R, P>
where
    R: ReviewStore,
    P: ShareStore,
{
    pub repo: Arc<R>,
    pub projects: Arc<P>,
    pub limiter: Arc<MemoryRateLimitStore>,
    pub config: Arc<ReviewConfig>,
}

impl<R, P> ReviewAppState<R, P>
where
    R: ReviewStore,
    P: ShareStore,
{
    fn comments(&self) -> ViewerCommentsUseCase<R, R, MemoryRateLimitStore> {
        ViewerCommentsUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.limiter.clone(),
            self.config.clone(),
        )
    }
}

/// GET /api/share/videos
pub async fn list_videos<R, P>(
    State(state): State<ReviewAppState<R, P>>,
    Extension(viewer): Extension<ShareViewer>,
) -> ReviewResult<Json<Vec<VideoResponse>>>
where
    R: ReviewStore,
    P: ShareStore,
{
    let videos = ListVideosUseCase::new(state.projects.clone(), state.repo.clone())
        .for_viewer(&viewer)
        .await?;
    Ok(Json(videos.iter().map(VideoResponse::from).collect()))
}

/// GET /api/share/videos/{video_id}/comments
pub async fn list_comments<R, P>(
    State(state): State<ReviewAppState<R, P>>,
    Extension(viewer): Extension<ShareViewer>,
    Path(video_id): Path<Uuid>,
) -> ReviewResult<Json<Vec<ThreadResponse>>>
where
    R: ReviewStore,
    P: ShareStore,
{
    let threads = state
        .comments()
        .list(&viewer, VideoId::from_uuid(video_id))
        .await?;
    Ok(Json(
        threads
            .iter()
            .map(|t| ThreadResponse::for_viewer(t, &viewer))
            .collect(),
    ))
}

/// POST /api/share/videos/{video_id}/comments
pub async fn post_comment<R, P>(
    State(state): State<ReviewAppState<R, P>>,
    Extension(viewer): Extension<ShareViewer>,
    Path(video_id): Path<Uuid>,
    Json(req): Json<PostCommentRequest>,
) -> ReviewResult<impl IntoResponse>
where
    R: ReviewStore,
    P: ShareStore,
{
    let comment = state
        .comments()
        .post(&viewer, VideoId::from_uuid(video_id), req.into())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CommentResponse::for_viewer(&comment, &viewer)),
    ))
}

/// DELETE /api/share/comments/{comment_id}
pub async fn delete_comment<R, P>(
    State(state): State<ReviewAppState<R, P>>,
    Extension(viewer): Extension<ShareViewer>,
    Path(comment_id): Path<Uuid>,
) -> ReviewResult<StatusCode>
where
    R: ReviewStore,
    P: ShareStore,
{
    state
        .comments()
        .delete(&viewer, CommentId::from_uuid(comment_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/share/videos/{video_id}/approve
pub async fn approve_video<R, P>(
    State(state): State<ReviewAppState<R, P>>,
    Extension(viewer): Extension<ShareViewer>,
    Path(video_id): Path<Uuid>,
) -> ReviewResult<Json<ApprovalResponse>>
where
    R: ReviewStore,
    P: ShareStore,
{
    let outcome = ApprovalUseCase::new(state.projects.clone(), state.repo.clone())
        .approve(&viewer, VideoId::from_uuid(video_id))
        .await?;
    Ok(Json(outcome.into()))
}
