//! Share Routers
//!
//! Paths are relative to `/api`. The viewer and admin routers carry no
//! guard of their own; the composition root layers the share and admin
//! middleware on top of them.

use axum::{
    Router,
    routing::{get, post, put},
};
use platform::rate_limit::MemoryRateLimitStore;
use std::sync::Arc;

use crate::application::config::ShareConfig;
use crate::domain::repository::ShareStore;
use crate::infra::otp_delivery::OtpDelivery;
use crate::presentation::admin_handlers::{self, ShareAdminState};
use crate::presentation::handlers::{self, ShareAppState};

/// Public share-page routes (no session required)
pub fn share_public_router<R>(
    repo: Arc<R>,
    limiter: Arc<MemoryRateLimitStore>,
    delivery: Arc<OtpDelivery>,
    config: Arc<ShareConfig>,
) -> Router
where
    R: ShareStore,
{
    let state = ShareAppState {
        repo,
        limiter,
        delivery,
        config,
    };

    Router::new()
        .route("/share/signout", post(handlers::sign_out::<R>))
        .route("/share/{slug}", get(handlers::share_info::<R>))
        .route("/share/{slug}/open", post(handlers::open_access::<R>))
        .route("/share/{slug}/password", post(handlers::verify_password::<R>))
        .route("/share/{slug}/otp/send", post(handlers::send_otp::<R>))
        .route("/share/{slug}/otp/verify", post(handlers::verify_otp::<R>))
        .route("/share/{slug}/guest", post(handlers::guest_access::<R>))
        .with_state(state)
}

/// Routes for an authenticated share viewer
pub fn share_viewer_router<R>(
    repo: Arc<R>,
    limiter: Arc<MemoryRateLimitStore>,
    delivery: Arc<OtpDelivery>,
    config: Arc<ShareConfig>,
) -> Router
where
    R: ShareStore,
{
    let state = ShareAppState {
        repo,
        limiter,
        delivery,
        config,
    };

    Router::new()
        .route("/share/session", get(handlers::session_status::<R>))
        .with_state(state)
}

/// Admin project, recipient and session management
pub fn share_admin_router<R>(repo: Arc<R>, config: Arc<ShareConfig>) -> Router
where
    R: ShareStore,
{
    let state = ShareAdminState { repo, config };

    Router::new()
        .route(
            "/admin/projects",
            get(admin_handlers::list_projects::<R>).post(admin_handlers::create_project::<R>),
        )
        .route(
            "/admin/projects/{project_id}",
            get(admin_handlers::get_project::<R>)
                .patch(admin_handlers::update_project::<R>)
                .put(admin_handlers::update_project::<R>),
        )
        .route(
            "/admin/projects/{project_id}/status",
            put(admin_handlers::set_project_status::<R>),
        )
        .route(
            "/admin/projects/{project_id}/recipients",
            get(admin_handlers::list_recipients::<R>).post(admin_handlers::add_recipient::<R>),
        )
        .route(
            "/admin/projects/{project_id}/recipients/{recipient_id}",
            axum::routing::delete(admin_handlers::remove_recipient::<R>),
        )
        .route(
            "/admin/projects/{project_id}/sessions",
            get(admin_handlers::list_sessions::<R>),
        )
        .route(
            "/admin/projects/{project_id}/sessions/revoke",
            post(admin_handlers::revoke_sessions::<R>),
        )
        .route(
            "/admin/projects/{project_id}/preview",
            post(admin_handlers::preview::<R>),
        )
        .with_state(state)
}
