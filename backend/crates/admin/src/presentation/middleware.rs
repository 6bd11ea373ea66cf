//! Admin Middleware
//!
//! Guards the admin API. On success the [`AdminPrincipal`] is stored in
//! request extensions for downstream handlers.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::{extract_client_ip, extract_fingerprint};
use std::sync::Arc;

use crate::application::CheckAdminSessionUseCase;
use crate::application::config::AdminConfig;
use crate::domain::repository::{AdminSessionRepository, AdminUserRepository};
use crate::error::AdminError;

/// Middleware state
#[derive(Clone)]
pub struct AdminMiddlewareState<R>
where
    R: AdminUserRepository + AdminSessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AdminConfig>,
}

/// Middleware that requires a valid admin session
pub async fn require_admin_session<R>(
    state: AdminMiddlewareState<R>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: AdminUserRepository + AdminSessionRepository + Clone + Send + Sync + 'static,
{
    let headers = req.headers();

    let client_ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip());

    let client_ip = extract_client_ip(headers, client_ip, &state.config.trusted_proxies);

    let fingerprint = match extract_fingerprint(headers, client_ip) {
        Ok(fp) => fp,
        Err(e) => return Err(AdminError::from(e).into_response()),
    };

    let Some(token) = platform::cookie::extract_cookie(headers, &state.config.session_cookie_name)
    else {
        return Err(unauthorized());
    };

    let use_case =
        CheckAdminSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    match use_case.execute(&token, &fingerprint).await {
        Ok((principal, _session)) => {
            req.extensions_mut().insert(principal);
            Ok(next.run(req).await)
        }
        Err(e @ (AdminError::Database(_) | AdminError::Internal(_))) => Err(e.into_response()),
        Err(e) => {
            tracing::debug!(error = %e, "Admin session rejected");
            Err(unauthorized())
        }
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, [("X-Auth-Required", "true")]).into_response()
}
