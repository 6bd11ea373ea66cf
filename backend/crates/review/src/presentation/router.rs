//! Review Routers
//!
//! Paths are relative to `/api`. The composition root puts the share
//! session middleware in front of the viewer router and the admin
//! middleware in front of the admin router.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use platform::rate_limit::MemoryRateLimitStore;
use platform::storage::LocalStorage;
use share::domain::ShareStore;
use std::sync::Arc;

use crate::application::config::ReviewConfig;
use crate::domain::repository::ReviewStore;
use crate::presentation::admin_handlers::{self, ReviewAdminState};
use crate::presentation::handlers::{self, ReviewAppState};

/// Videos, comments and approval for a share viewer
pub fn review_viewer_router<R, P>(
    repo: Arc<R>,
    projects: Arc<P>,
    limiter: Arc<MemoryRateLimitStore>,
    config: Arc<ReviewConfig>,
) -> Router
where
    R: ReviewStore,
    P: ShareStore,
{
    let state = ReviewAppState {
        repo,
        projects,
        limiter,
        config,
    };

    Router::new()
        .route("/share/videos", get(handlers::list_videos::<R, P>))
        .route(
            "/share/videos/{video_id}/comments",
            get(handlers::list_comments::<R, P>).post(handlers::post_comment::<R, P>),
        )
        .route(
            "/share/videos/{video_id}/approve",
            post(handlers::approve_video::<R, P>),
        )
        .route(
            "/share/comments/{comment_id}",
            delete(handlers::delete_comment::<R, P>),
        )
        .with_state(state)
}

/// Uploads, assets, approvals and moderation for admins
pub fn review_admin_router<R, P>(
    repo: Arc<R>,
    projects: Arc<P>,
    storage: Arc<LocalStorage>,
    config: Arc<ReviewConfig>,
) -> Router
where
    R: ReviewStore,
    P: ShareStore,
{
    let state = ReviewAdminState {
        repo,
        projects,
        storage,
        config,
    };

    // Upload limits are enforced while streaming
    let uploads = Router::new()
        .route(
            "/admin/projects/{project_id}/videos",
            get(admin_handlers::list_project_videos::<R, P>)
                .post(admin_handlers::upload_version::<R, P>),
        )
        .route(
            "/admin/videos/{video_id}/assets/{slot}",
            put(admin_handlers::attach_asset::<R, P>),
        )
        .layer(DefaultBodyLimit::disable());

    Router::new()
        .route(
            "/admin/videos/{video_id}/unapprove",
            post(admin_handlers::unapprove_video::<R, P>),
        )
        .route(
            "/admin/videos/{video_id}/comments",
            get(admin_handlers::list_comments::<R, P>).post(admin_handlers::reply::<R, P>),
        )
        .route(
            "/admin/comments/{comment_id}",
            delete(admin_handlers::delete_comment::<R, P>),
        )
        .merge(uploads)
        .with_state(state)
}
