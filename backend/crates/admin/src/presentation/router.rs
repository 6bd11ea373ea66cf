//! Admin Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use platform::rate_limit::MemoryRateLimitStore;
use std::sync::Arc;

use crate::application::config::AdminConfig;
use crate::domain::repository::{AdminSessionRepository, AdminUserRepository};
use crate::infra::postgres::PgAdminRepository;
use crate::presentation::handlers::{self, AdminAppState};

/// Create the admin auth router with PostgreSQL repository
pub fn admin_auth_router(
    repo: Arc<PgAdminRepository>,
    limiter: Arc<MemoryRateLimitStore>,
    config: Arc<AdminConfig>,
) -> Router {
    admin_auth_router_generic(repo, limiter, config)
}

/// Create a generic admin auth router for any repository implementation
pub fn admin_auth_router_generic<R>(
    repo: Arc<R>,
    limiter: Arc<MemoryRateLimitStore>,
    config: Arc<AdminConfig>,
) -> Router
where
    R: AdminUserRepository + AdminSessionRepository + Clone + Send + Sync + 'static,
{
    let state = AdminAppState {
        repo,
        limiter,
        config,
    };

    Router::new()
        .route("/signin", post(handlers::sign_in::<R>))
        .route("/signout", post(handlers::sign_out::<R>))
        .route("/status", get(handlers::session_status::<R>))
        .with_state(state)
}
