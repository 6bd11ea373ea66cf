//! Issue Content Token Use Case
//!
//! Grants a share viewer short-lived access to one asset of a video.

use std::sync::Arc;

use chrono::Utc;
use kernel::id::VideoId;
use platform::client::ClientFingerprint;
use platform::rate_limit::RateLimitStore;
use platform::token::TokenSigner;
use review::domain::{Video, VideoRepository};
use share::ShareViewer;

use crate::application::config::ContentConfig;
use crate::domain::claims::{ContentClaims, fingerprint_tag};
use crate::domain::value_object::asset_kind::AssetKind;
use crate::error::{ContentError, ContentResult};

/// Token request
#[derive(Debug, Clone, Copy)]
pub struct IssueContentInput {
    pub video_id: VideoId,
    pub asset: AssetKind,
    pub download: bool,
}

/// Issued token
#[derive(Debug, Clone)]
pub struct IssuedContentToken {
    pub token: String,
    /// Relative URL the client fetches
    pub url: String,
    pub expires_at_ms: i64,
}

/// Issue content token use case
pub struct IssueContentTokenUseCase<V, L>
where
    V: VideoRepository,
    L: RateLimitStore,
{
    video_repo: Arc<V>,
    limiter: Arc<L>,
    config: Arc<ContentConfig>,
}

impl<V, L> IssueContentTokenUseCase<V, L>
where
    V: VideoRepository,
    L: RateLimitStore,
{
    pub fn new(video_repo: Arc<V>, limiter: Arc<L>, config: Arc<ContentConfig>) -> Self {
        Self {
            video_repo,
            limiter,
            config,
        }
    }

    pub async fn execute(
        &self,
        viewer: &ShareViewer,
        input: IssueContentInput,
        fingerprint: &ClientFingerprint,
    ) -> ContentResult<IssuedContentToken> {
        self.check_rate_limit(viewer).await?;

        let video = self.visible_video(viewer, input.video_id).await?;
        if input.asset.path_in(&video).is_none() {
            return Err(ContentError::NotFound);
        }
        if input.download {
            check_download(viewer, &video)?;
        }

        let now_ms = Utc::now().timestamp_millis();
        let ttl_ms = self.config.token_ttl(input.download).as_millis() as i64;
        // Never outlive the session that asked
        let expires_at_ms = (now_ms + ttl_ms).min(viewer.expires_at_ms);

        let claims = ContentClaims {
            sid: viewer.session_id,
            pid: viewer.project_id,
            vid: video.video_id,
            asset: input.asset,
            dl: input.download,
            fp: fingerprint_tag(&self.config.token_secret, fingerprint),
            exp: expires_at_ms,
        };
        let token = TokenSigner::new(self.config.token_secret)
            .sign(&claims)
            .map_err(|e| ContentError::Internal(format!("Failed to sign content token: {e}")))?;

        tracing::debug!(
            session_id = %viewer.session_id,
            video_id = %video.video_id,
            asset = %input.asset,
            download = input.download,
            "Content token issued"
        );

        Ok(IssuedContentToken {
            url: format!("/api/content/{token}"),
            token,
            expires_at_ms,
        })
    }

    /// The video must be in the viewer's project and pass [`check_latest`]
    async fn visible_video(&self, viewer: &ShareViewer, video_id: VideoId) -> ContentResult<Video> {
        let video = self
            .video_repo
            .find_video(video_id)
            .await?
            .filter(|v| v.project_id == viewer.project_id)
            .ok_or(ContentError::NotFound)?;

        check_latest(self.video_repo.as_ref(), viewer, &video).await?;
        Ok(video)
    }

    async fn check_rate_limit(&self, viewer: &ShareViewer) -> ContentResult<()> {
        let key = format!("content-issue:{}", viewer.session_id);
        let result = self
            .limiter
            .check_and_increment(&key, &self.config.issue_rate_limit)
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

/// Latest-only guests see just the newest version of each name
pub(crate) async fn check_latest<V: VideoRepository>(
    video_repo: &V,
    viewer: &ShareViewer,
    video: &Video,
) -> ContentResult<()> {
    if viewer.latest_versions_only() {
        let latest = video_repo.latest_version(video.project_id, &video.name).await?;
        if latest != Some(video.version) {
            return Err(ContentError::NotFound);
        }
    }
    Ok(())
}

/// Downloads need a non-guest viewer, a project that allows them and an
/// approved video; admin previews skip the approval
pub(crate) fn check_download(viewer: &ShareViewer, video: &Video) -> ContentResult<()> {
    if viewer.is_guest() {
        return Err(ContentError::GuestNotAllowed);
    }
    if !viewer.allow_downloads {
        return Err(ContentError::DownloadsDisabled);
    }
    if !viewer.is_admin() && !video.is_approved() {
        return Err(ContentError::NotApproved);
    }
    Ok(())
}
