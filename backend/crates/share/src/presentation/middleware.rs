//! Share Middleware
//!
//! Guards the viewer API. On success the [`ShareViewer`] is stored in
//! request extensions; the review and content crates read it from there.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::{extract_client_ip, extract_fingerprint};
use std::sync::Arc;

use crate::application::CheckShareSessionUseCase;
use crate::application::config::ShareConfig;
use crate::domain::repository::{ProjectRepository, ShareSessionRepository};
use crate::error::ShareError;
use crate::presentation::handlers::session_token;

/// Middleware state
#[derive(Clone)]
pub struct ShareMiddlewareState<R>
where
    R: ProjectRepository + ShareSessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<ShareConfig>,
}

/// Middleware that requires a valid share session
///
/// The token is read from `Authorization: Bearer` first, then the cookie.
pub async fn require_share_session<R>(
    state: ShareMiddlewareState<R>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: ProjectRepository + ShareSessionRepository + Clone + Send + Sync + 'static,
{
    let headers = req.headers();

    let client_ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip());

    let client_ip = extract_client_ip(headers, client_ip, &state.config.trusted_proxies);

    let fingerprint = match extract_fingerprint(headers, client_ip) {
        Ok(fp) => fp,
        Err(e) => return Err(ShareError::from(e).into_response()),
    };

    let Some(token) = session_token(headers, &state.config) else {
        return Err(unauthorized());
    };

    let use_case =
        CheckShareSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    match use_case.execute(&token, &fingerprint).await {
        Ok(viewer) => {
            req.extensions_mut().insert(viewer);
            Ok(next.run(req).await)
        }
        Err(
            e @ (ShareError::Database(_) | ShareError::Internal(_) | ShareError::ProjectArchived),
        ) => Err(e.into_response()),
        Err(e) => {
            tracing::debug!(error = %e, "Share session rejected");
            Err(unauthorized())
        }
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, [("X-Auth-Required", "true")]).into_response()
}
