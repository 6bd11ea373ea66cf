//! HTTP Handlers

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use platform::client::{extract_client_ip, extract_fingerprint};
use platform::cookie::{delete_cookie_header, extract_cookie, set_cookie_header};
use platform::rate_limit::MemoryRateLimitStore;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::application::config::AdminConfig;
use crate::application::{CheckAdminSessionUseCase, SignInInput, SignInUseCase, SignOutUseCase};
use crate::domain::repository::{AdminSessionRepository, AdminUserRepository};
use crate::error::AdminResult;
use crate::presentation::dto::{SessionStatusResponse, SignInRequest, SignInResponse};

/// Shared state for admin handlers
#[derive(Clone)]
pub struct AdminAppState<R>
where
    R: AdminUserRepository + AdminSessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub limiter: Arc<MemoryRateLimitStore>,
    pub config: Arc<AdminConfig>,
}

/// POST /api/admin/auth/signin
pub async fn sign_in<R>(
    State(state): State<AdminAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<SignInRequest>,
) -> AdminResult<impl IntoResponse>
where
    R: AdminUserRepository + AdminSessionRepository + Clone + Send + Sync + 'static,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies);
    let fingerprint = extract_fingerprint(&headers, client_ip)?;

    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.limiter.clone(),
        state.config.clone(),
    );

    let input = SignInInput {
        email: req.email,
        password: req.password,
        remember_me: req.remember_me,
    };

    let output = use_case.execute(input, fingerprint).await?;

    // Max-Age must match remember_me
    let cookie = set_cookie_header(
        &state.config.session_cookie(output.remember_me),
        &output.session_token,
    );

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(SignInResponse {
            admin_id: *output.admin_id.as_uuid(),
            email: output.email.to_string(),
            display_name: output.display_name,
            expires_at_ms: output.expires_at_ms,
        }),
    ))
}

/// POST /api/admin/auth/signout
pub async fn sign_out<R>(
    State(state): State<AdminAppState<R>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    R: AdminUserRepository + AdminSessionRepository + Clone + Send + Sync + 'static,
{
    if let Some(token) = extract_cookie(&headers, &state.config.session_cookie_name) {
        let use_case = SignOutUseCase::new(state.repo.clone(), state.config.clone());
        // Ignore errors - just clear the cookie
        if let Err(e) = use_case.execute(&token).await {
            tracing::debug!(error = %e, "Admin sign-out with unusable token");
        }
    }

    let cookie = delete_cookie_header(&state.config.clear_cookie());

    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)])
}

/// GET /api/admin/auth/status
pub async fn session_status<R>(
    State(state): State<AdminAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> AdminResult<Json<SessionStatusResponse>>
where
    R: AdminUserRepository + AdminSessionRepository + Clone + Send + Sync + 'static,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()), &state.config.trusted_proxies);
    let fingerprint = extract_fingerprint(&headers, client_ip)?;

    let Some(token) = extract_cookie(&headers, &state.config.session_cookie_name) else {
        return Ok(Json(SessionStatusResponse::anonymous()));
    };

    let use_case =
        CheckAdminSessionUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    match use_case.execute(&token, &fingerprint).await {
        Ok((principal, session)) => Ok(Json(SessionStatusResponse {
            authenticated: true,
            admin_id: Some(*principal.admin_id.as_uuid()),
            email: Some(principal.email.to_string()),
            display_name: principal.display_name,
            expires_at_ms: Some(session.expires_at_ms),
        })),
        Err(e) => {
            tracing::debug!(error = %e, "Admin session status: not authenticated");
            Ok(Json(SessionStatusResponse::anonymous()))
        }
    }
}
