//! HTTP Handlers (share page)

use axum::Json;
use axum::extract::{ConnectInfo, Extension, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use platform::client::{
    ClientFingerprint, extract_bearer_token, extract_client_ip, extract_fingerprint,
};
use platform::cookie::{delete_cookie_header, extract_cookie, set_cookie_header};
use platform::rate_limit::MemoryRateLimitStore;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::application::config::ShareConfig;
use crate::application::{
    GuestAccessUseCase, IssuedSession, OpenAccessUseCase, SendOtpUseCase, ShareInfoUseCase,
    ShareSignOutUseCase, VerifyOtpUseCase, VerifyPasswordUseCase,
};
use crate::domain::repository::ShareStore;
use crate::domain::viewer::ShareViewer;
use crate::error::{ShareError, ShareResult};
use crate::infra::otp_delivery::OtpDelivery;
use crate::presentation::dto::{
    AccessResponse, PasswordRequest, SendOtpRequest, SendOtpResponse, SessionStatusResponse,
    ShareInfoResponse, VerifyOtpRequest, ViewerResponse,
};

/// Shared state for share handlers
#[derive(Clone)]
pub struct ShareAppState<R>
where
    R: ShareStore,
{
    pub repo: Arc<R>,
    pub limiter: Arc<MemoryRateLimitStore>,
    pub delivery: Arc<OtpDelivery>,
    pub config: Arc<ShareConfig>,
}

pub(crate) fn client_fingerprint(
    headers: &HeaderMap,
    addr: SocketAddr,
    config: &ShareConfig,
) -> ShareResult<ClientFingerprint> {
    let client_ip = extract_client_ip(headers, Some(addr.ip()), &config.trusted_proxies);
    Ok(extract_fingerprint(headers, client_ip)?)
}

/// Set the session cookie and return the token with the viewer
pub(crate) fn access_response(config: &ShareConfig, issued: IssuedSession) -> Response {
    let cookie = set_cookie_header(&config.session_cookie(), &issued.token);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AccessResponse::from(issued)),
    )
        .into_response()
}

/// Token from `Authorization: Bearer`, falling back to the cookie
pub(crate) fn session_token(headers: &HeaderMap, config: &ShareConfig) -> Option<String> {
    extract_bearer_token(headers).or_else(|| extract_cookie(headers, &config.session_cookie_name))
}

/// GET /api/share/{slug}
pub async fn share_info<R>(
    State(state): State<ShareAppState<R>>,
    Path(slug): Path<String>,
) -> ShareResult<Json<ShareInfoResponse>>
where
    R: ShareStore,
{
    let info = ShareInfoUseCase::new(state.repo.clone()).execute(&slug).await?;
    Ok(Json(info.into()))
}

/// POST /api/share/{slug}/open
pub async fn open_access<R>(
    State(state): State<ShareAppState<R>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> ShareResult<impl IntoResponse>
where
    R: ShareStore,
{
    let fingerprint = client_fingerprint(&headers, addr, &state.config)?;
    let use_case =
        OpenAccessUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());
    let issued = use_case.execute(&slug, &fingerprint).await?;
    Ok(access_response(&state.config, issued))
}

/// POST /api/share/{slug}/password
pub async fn verify_password<R>(
    State(state): State<ShareAppState<R>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<PasswordRequest>,
) -> ShareResult<impl IntoResponse>
where
    R: ShareStore,
{
    let fingerprint = client_fingerprint(&headers, addr, &state.config)?;
    let use_case = VerifyPasswordUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.limiter.clone(),
        state.config.clone(),
    );
    let issued = use_case.execute(&slug, &req.password, &fingerprint).await?;
    Ok(access_response(&state.config, issued))
}

/// POST /api/share/{slug}/otp/send
pub async fn send_otp<R>(
    State(state): State<ShareAppState<R>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<SendOtpRequest>,
) -> ShareResult<impl IntoResponse>
where
    R: ShareStore,
{
    let fingerprint = client_fingerprint(&headers, addr, &state.config)?;
    let use_case = SendOtpUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.limiter.clone(),
        state.delivery.clone(),
        state.config.clone(),
    );
    let expires_in_secs = use_case.execute(&slug, &req.email, &fingerprint).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SendOtpResponse {
            message: "If this address has access, a code has been sent",
            expires_in_secs,
        }),
    ))
}

/// POST /api/share/{slug}/otp/verify
pub async fn verify_otp<R>(
    State(state): State<ShareAppState<R>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<VerifyOtpRequest>,
) -> ShareResult<impl IntoResponse>
where
    R: ShareStore,
{
    let fingerprint = client_fingerprint(&headers, addr, &state.config)?;
    let use_case = VerifyOtpUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.limiter.clone(),
        state.config.clone(),
    );
    let issued = use_case
        .execute(&slug, &req.email, &req.code, &fingerprint)
        .await?;
    Ok(access_response(&state.config, issued))
}

/// POST /api/share/{slug}/guest
pub async fn guest_access<R>(
    State(state): State<ShareAppState<R>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> ShareResult<impl IntoResponse>
where
    R: ShareStore,
{
    let fingerprint = client_fingerprint(&headers, addr, &state.config)?;
    let use_case = GuestAccessUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.limiter.clone(),
        state.config.clone(),
    );
    let issued = use_case.execute(&slug, &fingerprint).await?;
    Ok(access_response(&state.config, issued))
}

/// POST /api/share/signout
pub async fn sign_out<R>(
    State(state): State<ShareAppState<R>>,
    headers: HeaderMap,
) -> impl IntoResponse
where
    R: ShareStore,
{
    if let Some(token) = session_token(&headers, &state.config) {
        let use_case = ShareSignOutUseCase::new(state.repo.clone(), state.config.clone());
        // Ignore errors - just clear the cookie
        if let Err(e) = use_case.execute(&token).await {
            tracing::debug!(error = %e, "Share sign-out with unusable token");
        }
    }

    let cookie = delete_cookie_header(&state.config.clear_cookie());

    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)])
}

/// GET /api/share/session
pub async fn session_status<R>(
    State(state): State<ShareAppState<R>>,
    Extension(viewer): Extension<ShareViewer>,
) -> ShareResult<Json<SessionStatusResponse>>
where
    R: ShareStore,
{
    let project = state
        .repo
        .find_project_by_id(viewer.project_id)
        .await?
        .ok_or(ShareError::SessionInvalid)?;

    Ok(Json(SessionStatusResponse {
        viewer: ViewerResponse::from(&viewer),
        slug: project.slug.to_string(),
        title: project.title,
        status: project.status,
    }))
}
