//! Content Routers
//!
//! Paths are relative to `/api`. Token issuance sits behind the share
//! session middleware; `/content/{token}` is authorized by the token alone.

use axum::{
    Router,
    routing::{get, post},
};

use review::ReviewStore;
use share::domain::ShareStore;

use crate::presentation::handlers::{self, ContentAppState};

/// Token issuance for share viewers
pub fn content_viewer_router<R, P>(state: ContentAppState<R, P>) -> Router
where
    R: ReviewStore,
    P: ShareStore,
{
    Router::new()
        .route(
            "/share/videos/{video_id}/content-token",
            post(handlers::issue_token::<R, P>),
        )
        .with_state(state)
}

/// Token-scoped media delivery
pub fn content_public_router<R, P>(state: ContentAppState<R, P>) -> Router
where
    R: ReviewStore,
    P: ShareStore,
{
    Router::new()
        .route("/content/{token}", get(handlers::serve::<R, P>))
        .with_state(state)
}
