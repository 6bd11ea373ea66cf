//! Resolve Content Use Case
//!
//! Turns a content token back into a file on disk, re-checking every
//! condition the grant depended on.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use platform::client::ClientFingerprint;
use platform::rate_limit::RateLimitStore;
use platform::storage::LocalStorage;
use platform::token::TokenSigner;
use review::domain::VideoRepository;
use share::application::CheckShareSessionUseCase;
use share::domain::{ProjectRepository, ShareSessionRepository};

use crate::application::config::ContentConfig;
use crate::application::issue_token::{check_download, check_latest};
use crate::domain::claims::ContentClaims;
use crate::domain::value_object::asset_kind::AssetKind;
use crate::domain::value_object::hotlink::HotlinkVerdict;
use crate::error::{ContentError, ContentResult};

/// Where a request came from
#[derive(Debug, Clone, Default)]
pub struct RequestSource<'a> {
    pub origin: Option<&'a str>,
    pub referer: Option<&'a str>,
    /// `Host` of the request itself
    pub host: Option<&'a str>,
}

/// A file ready to be served
#[derive(Debug, Clone)]
pub struct ResolvedContent {
    pub path: PathBuf,
    pub asset: AssetKind,
    /// Present for downloads
    pub download_name: Option<String>,
}

/// Resolve content use case
pub struct ResolveContentUseCase<P, S, V, L>
where
    P: ProjectRepository,
    S: ShareSessionRepository + Send + Sync + 'static,
    V: VideoRepository,
    L: RateLimitStore,
{
    sessions: CheckShareSessionUseCase<P, S>,
    video_repo: Arc<V>,
    limiter: Arc<L>,
    storage: Arc<LocalStorage>,
    config: Arc<ContentConfig>,
}

impl<P, S, V, L> ResolveContentUseCase<P, S, V, L>
where
    P: ProjectRepository,
    S: ShareSessionRepository + Send + Sync + 'static,
    V: VideoRepository,
    L: RateLimitStore,
{
    pub fn new(
        sessions: CheckShareSessionUseCase<P, S>,
        video_repo: Arc<V>,
        limiter: Arc<L>,
        storage: Arc<LocalStorage>,
        config: Arc<ContentConfig>,
    ) -> Self {
        Self {
            sessions,
            video_repo,
            limiter,
            storage,
            config,
        }
    }

    pub async fn execute(
        &self,
        token: &str,
        fingerprint: &ClientFingerprint,
        source: RequestSource<'_>,
    ) -> ContentResult<ResolvedContent> {
        let claims = TokenSigner::new(self.config.token_secret)
            .verify::<ContentClaims>(token, Utc::now().timestamp_millis())
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected content token");
                ContentError::InvalidToken
            })?;

        match self
            .config
            .hotlink
            .check(source.origin.or(source.referer), source.host)
        {
            HotlinkVerdict::Allowed => {}
            HotlinkVerdict::Logged(host) => {
                tracing::warn!(
                    source = %host,
                    session_id = %claims.sid,
                    video_id = %claims.vid,
                    "Foreign media source (log only)"
                );
            }
            HotlinkVerdict::Blocked(host) => return Err(ContentError::HotlinkBlocked(host)),
        }

        if !claims.fingerprint_matches(&self.config.token_secret, fingerprint) {
            tracing::warn!(session_id = %claims.sid, "Content token fingerprint mismatch");
            return Err(ContentError::FingerprintMismatch);
        }

        self.check_rate_limit(&claims).await?;

        // Revocation and auth_version bumps cut off running streams too
        let viewer = self.sessions.revalidate(claims.sid, claims.pid).await?;

        let video = self
            .video_repo
            .find_video(claims.vid)
            .await?
            .filter(|v| v.project_id == claims.pid)
            .ok_or(ContentError::NotFound)?;

        // Settings and approvals may have changed since the token was issued
        check_latest(self.video_repo.as_ref(), &viewer, &video).await?;
        if claims.dl {
            check_download(&viewer, &video)?;
        }

        let relative = claims.asset.path_in(&video).ok_or(ContentError::NotFound)?;
        let path = self.storage.resolve_existing(relative).await?;

        let download_name = claims.dl.then(|| download_name(&video.original_filename, &path));
        if claims.dl {
            tracing::info!(
                session_id = %claims.sid,
                video_id = %video.video_id,
                asset = %claims.asset,
                "Download started"
            );
        }

        Ok(ResolvedContent {
            path,
            asset: claims.asset,
            download_name,
        })
    }

    async fn check_rate_limit(&self, claims: &ContentClaims) -> ContentResult<()> {
        let key = format!("content-resolve:{}", claims.sid);
        let result = self
            .limiter
            .check_and_increment(&key, &self.config.resolve_rate_limit)
            .await
            .map_err(|e| ContentError::Internal(format!("Rate limiter failed: {e}")))?;

        if !result.allowed {
            return Err(ContentError::RateLimited {
                retry_after_secs: result.retry_after_secs(Utc::now().timestamp_millis()),
            });
        }
        Ok(())
    }
}

/// The client's file name, with the extension of the file actually served
fn download_name(original_filename: &str, served: &std::path::Path) -> String {
    let stem = original_filename
        .rsplit_once('.')
        .map_or(original_filename, |(stem, _)| stem);
    match served.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_download_name_follows_served_file() {
        assert_eq!(
            download_name("Hero v3.mov", Path::new("/s/p/videos/v/original.mov")),
            "Hero v3.mov"
        );
        assert_eq!(
            download_name("Hero v3.mov", Path::new("/s/p/videos/v/preview.mp4")),
            "Hero v3.mp4"
        );
        assert_eq!(download_name("raw", Path::new("/s/x")), "raw");
    }
}
