//! HTTP Handlers (content tokens and media)

use axum::Json;
use axum::body::Body;
use axum::extract::{ConnectInfo, Extension, Path, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, header};
use axum::response::Response;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use platform::client::{
    ClientFingerprint, TrustedProxies, extract_client_ip, extract_fingerprint,
};
use platform::rate_limit::MemoryRateLimitStore;
use platform::storage::LocalStorage;
use review::ReviewStore;
use share::application::CheckShareSessionUseCase;
use share::domain::ShareStore;
use share::{ShareConfig, ShareViewer};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use uuid::Uuid;

use kernel::id::VideoId;

use crate::application::config::ContentConfig;
use crate::application::{
    IssueContentInput, IssueContentTokenUseCase, RequestSource, ResolveContentUseCase,
};
use crate::error::ContentResult;
use crate::presentation::dto::{IssueTokenRequest, IssueTokenResponse};

/// Shared state for content handlers
#[derive(Clone)]
pub struct ContentAppState<R, P>
where
    R: ReviewStore,
    P: ShareStore,
{
    pub repo: Arc<R>,
    pub projects: Arc<P>,
    pub limiter: Arc<MemoryRateLimitStore>,
    pub storage: Arc<LocalStorage>,
    pub config: Arc<ContentConfig>,
    /// Needed to re-check share sessions
    pub share_config: Arc<ShareConfig>,
}

impl<R, P> ContentAppState<R, P>
where
    R: ReviewStore,
    P: ShareStore,
{
    fn issuer(&self) -> IssueContentTokenUseCase<R, MemoryRateLimitStore> {
        IssueContentTokenUseCase::new(self.repo.clone(), self.limiter.clone(), self.config.clone())
    }

    fn resolver(&self) -> ResolveContentUseCase<P, P, R, MemoryRateLimitStore> {
        ResolveContentUseCase::new(
            CheckShareSessionUseCase::new(
                self.projects.clone(),
                self.projects.clone(),
                self.share_config.clone(),
            ),
            self.repo.clone(),
            self.limiter.clone(),
            self.storage.clone(),
            self.config.clone(),
        )
    }
}

const CROSS_ORIGIN_RESOURCE_POLICY: HeaderName =
    HeaderName::from_static("cross-origin-resource-policy");

fn client_fingerprint(
    headers: &HeaderMap,
    addr: SocketAddr,
    trusted: &TrustedProxies,
) -> ContentResult<ClientFingerprint> {
    let client_ip = extract_client_ip(headers, Some(addr.ip()), trusted);
    Ok(extract_fingerprint(headers, client_ip)?)
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// POST /api/share/videos/{video_id}/content-token
pub async fn issue_token<R, P>(
    State(state): State<ContentAppState<R, P>>,
    Extension(viewer): Extension<ShareViewer>,
    Path(video_id): Path<Uuid>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<IssueTokenRequest>,
) -> ContentResult<Json<IssueTokenResponse>>
where
    R: ReviewStore,
    P: ShareStore,
{
    let fingerprint = client_fingerprint(&headers, addr, &state.config.trusted_proxies)?;
    let input = IssueContentInput {
        video_id: VideoId::from_uuid(video_id),
        asset: req.asset,
        download: req.download,
    };
    let issued = state.issuer().execute(&viewer, input, &fingerprint).await?;
    Ok(Json(issued.into()))
}

/// GET /api/content/{token}
///
/// Range requests are answered with `206`/`416` by the file service.
pub async fn serve<R, P>(
    State(state): State<ContentAppState<R, P>>,
    Path(token): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> ContentResult<Response>
where
    R: ReviewStore,
    P: ShareStore,
{
    let headers = request.headers();
    let fingerprint = client_fingerprint(headers, addr, &state.config.trusted_proxies)?;
    let origin = header_string(headers, header::ORIGIN);
    let referer = header_string(headers, header::REFERER);
    let host = header_string(headers, header::HOST);

    let resolved = state
        .resolver()
        .execute(
            &token,
            &fingerprint,
            RequestSource {
                origin: origin.as_deref(),
                referer: referer.as_deref(),
                host: host.as_deref(),
            },
        )
        .await?;

    let response = match ServeFile::new(&resolved.path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let mut response = response.map(Body::new);

    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("private, no-store"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        CROSS_ORIGIN_RESOURCE_POLICY,
        HeaderValue::from_static("same-site"),
    );
    if let Some(name) = &resolved.download_name {
        if let Some(value) = content_disposition(name) {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }

    Ok(response)
}

/// Bytes that must be escaped in an RFC 5987 `ext-value`
const RFC5987_ATTR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'.')
    .remove(b'-')
    .remove(b'_')
    .remove(b'~');

/// `attachment` with an ASCII fallback and the RFC 5987 UTF-8 name
fn content_disposition(file_name: &str) -> Option<HeaderValue> {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let encoded = utf8_percent_encode(file_name, RFC5987_ATTR);

    HeaderValue::from_str(&format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}"
    ))
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_encodes_names() {
        let value = content_disposition("Café cut \"final\".mp4").unwrap();
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"Caf_ cut _final_.mp4\"; \
             filename*=UTF-8''Caf%C3%A9%20cut%20%22final%22.mp4"
        );
    }
}
