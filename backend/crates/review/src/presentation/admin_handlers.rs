//! HTTP Handlers (video administration)
//!
//! Every route here sits behind the admin session middleware.

use axum::Json;
use axum::body::Body;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use kernel::id::{CommentId, ProjectId, VideoId};
use kernel::principal::AdminPrincipal;
use platform::storage::LocalStorage;
use share::domain::ShareStore;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::ReviewConfig;
use crate::application::{
    AdminCommentsUseCase, ApprovalUseCase, ListVideosUseCase, UploadUseCase, UploadVersionInput,
};
use crate::domain::repository::ReviewStore;
use crate::error::ReviewResult;
use crate::presentation::dto::{
    ApprovalResponse, AssetPath, AssetQuery, CommentResponse, PostCommentRequest,
    ThreadResponse, UploadQuery, VideoResponse,
};

/// Shared state for admin video handlers
#[derive(Clone)]
pub struct ReviewAdminState<R, P>
where
    R: ReviewStore,
    P: ShareStore,
{
    pub repo: Arc<R>,
    pub projects: Arc<P>,
    pub storage: Arc<LocalStorage>,
    pub config: Arc<ReviewConfig>,
}

impl<R, P> ReviewAdminState<R, P>
where
    R: ReviewStore,
    P: ShareStore,
{
    fn uploads(&self) -> UploadUseCase<P, R> {
        UploadUseCase::new(
            self.projects.clone(),
            self.repo.clone(),
            self.storage.clone(),
            self.config.clone(),
        )
    }

    fn comments(&self) -> AdminCommentsUseCase<R, R> {
        AdminCommentsUseCase::new(self.repo.clone(), self.repo.clone())
    }
}

fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

/// GET /api/admin/projects/{project_id}/videos
pub async fn list_project_videos<R, P>(
    State(state): State<ReviewAdminState<R, P>>,
    Path(project_id): Path<Uuid>,
) -> ReviewResult<Json<Vec<VideoResponse>>>
where
    R: ReviewStore,
    P: ShareStore,
{
    let videos = ListVideosUseCase::new(state.projects.clone(), state.repo.clone())
        .for_admin(ProjectId::from_uuid(project_id))
        .await?;
    Ok(Json(videos.iter().map(VideoResponse::from).collect()))
}

/// POST /api/admin/projects/{project_id}/videos?name=...&filename=...
///
/// The request body is the raw file.
pub async fn upload_version<R, P>(
    State(state): State<ReviewAdminState<R, P>>,
    Extension(admin): Extension<AdminPrincipal>,
    Path(project_id): Path<Uuid>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Body,
) -> ReviewResult<impl IntoResponse>
where
    R: ReviewStore,
    P: ShareStore,
{
    let input = UploadVersionInput {
        name: query.name,
        label: query.label,
        filename: query.filename,
        content_type: content_type(&headers),
        content_length: content_length(&headers),
    };
    let video = state
        .uploads()
        .upload_version(
            &admin,
            ProjectId::from_uuid(project_id),
            input,
            body.into_data_stream(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(VideoResponse::new(&video, true))))
}

/// PUT /api/admin/videos/{video_id}/assets/{slot}?filename=...
pub async fn attach_asset<R, P>(
    State(state): State<ReviewAdminState<R, P>>,
    Path(path): Path<AssetPath>,
    Query(query): Query<AssetQuery>,
    headers: HeaderMap,
    body: Body,
) -> ReviewResult<Json<VideoResponse>>
where
    R: ReviewStore,
    P: ShareStore,
{
    let video = state
        .uploads()
        .attach_asset(
            VideoId::from_uuid(path.video_id),
            path.slot,
            &query.filename,
            &content_type(&headers),
            content_length(&headers),
            body.into_data_stream(),
        )
        .await?;

    let latest = state
        .repo
        .latest_version(video.project_id, &video.name)
        .await?;
    let is_latest = latest == Some(video.version);
    Ok(Json(VideoResponse::new(&video, is_latest)))
}

/// POST /api/admin/videos/{video_id}/unapprove
pub async fn unapprove_video<R, P>(
    State(state): State<ReviewAdminState<R, P>>,
    Extension(admin): Extension<AdminPrincipal>,
    Path(video_id): Path<Uuid>,
) -> ReviewResult<Json<ApprovalResponse>>
where
    R: ReviewStore,
    P: ShareStore,
{
    let outcome = ApprovalUseCase::new(state.projects.clone(), state.repo.clone())
        .unapprove(&admin, VideoId::from_uuid(video_id))
        .await?;
    Ok(Json(outcome.into()))
}

/// GET /api/admin/videos/{video_id}/comments
pub async fn list_comments<R, P>(
    State(state): State<ReviewAdminState<R, P>>,
    Path(video_id): Path<Uuid>,
) -> ReviewResult<Json<Vec<ThreadResponse>>>
where
    R: ReviewStore,
    P: ShareStore,
{
    let threads = state.comments().list(VideoId::from_uuid(video_id)).await?;
    Ok(Json(threads.iter().map(ThreadResponse::for_admin).collect()))
}

/// POST /api/admin/videos/{video_id}/comments
pub async fn reply<R, P>(
    State(state): State<ReviewAdminState<R, P>>,
    Extension(admin): Extension<AdminPrincipal>,
    Path(video_id): Path<Uuid>,
    Json(req): Json<PostCommentRequest>,
) -> ReviewResult<impl IntoResponse>
where
    R: ReviewStore,
    P: ShareStore,
{
    let comment = state
        .comments()
        .reply(&admin, VideoId::from_uuid(video_id), req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(CommentResponse::for_admin(&comment))))
}

/// DELETE /api/admin/comments/{comment_id}
pub async fn delete_comment<R, P>(
    State(state): State<ReviewAdminState<R, P>>,
    Extension(admin): Extension<AdminPrincipal>,
    Path(comment_id): Path<Uuid>,
) -> ReviewResult<StatusCode>
where
    R: ReviewStore,
    P: ShareStore,
{
    state
        .comments()
        .delete(&admin, CommentId::from_uuid(comment_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
