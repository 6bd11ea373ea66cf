//! Verify OTP Use Case
//!
//! Exchanges a one-time code for a session bound to the recipient.

use std::sync::Arc;

use kernel::email::Email;
use platform::client::ClientFingerprint;
use platform::rate_limit::RateLimitStore;

use crate::application::config::ShareConfig;
use crate::application::issue_session::{IssuedSession, mint_session};
use crate::application::rate_limit::enforce;
use crate::application::share_info::load_shared_project;
use crate::domain::entity::share_session::SessionSubject;
use crate::domain::repository::{
    OtpChallengeRepository, ProjectRepository, RecipientRepository, ShareSessionRepository,
};
use crate::domain::value_object::otp_code::OtpCode;
use crate::error::{ShareError, ShareResult};

/// Verify OTP use case
pub struct VerifyOtpUseCase<P, R, C, S, L>
where
    P: ProjectRepository,
    R: RecipientRepository,
    C: OtpChallengeRepository,
    S: ShareSessionRepository,
    L: RateLimitStore,
{
    project_repo: Arc<P>,
    recipient_repo: Arc<R>,
    challenge_repo: Arc<C>,
    session_repo: Arc<S>,
    limiter: Arc<L>,
    config: Arc<ShareConfig>,
}

impl<P, R, C, S, L> VerifyOtpUseCase<P, R, C, S, L>
where
    P: ProjectRepository,
    R: RecipientRepository,
    C: OtpChallengeRepository,
    S: ShareSessionRepository,
    L: RateLimitStore,
{
    pub fn new(
        project_repo: Arc<P>,
        recipient_repo: Arc<R>,
        challenge_repo: Arc<C>,
        session_repo: Arc<S>,
        limiter: Arc<L>,
        config: Arc<ShareConfig>,
    ) -> Self {
        Self {
            project_repo,
            recipient_repo,
            challenge_repo,
            session_repo,
            limiter,
            config,
        }
    }

    pub async fn execute(
        &self,
        slug: &str,
        email: &str,
        code: &str,
        fingerprint: &ClientFingerprint,
    ) -> ShareResult<IssuedSession> {
        enforce(
            self.limiter.as_ref(),
            "otp-verify",
            &fingerprint.ip_key(),
            &self.config.otp_verify_rate_limit,
        )
        .await?;

        let project = load_shared_project(self.project_repo.as_ref(), slug).await?;
        if !project.auth_mode.allows_otp() {
            return Err(ShareError::MethodNotAllowed);
        }

        let email = Email::new(email).map_err(|_| ShareError::InvalidOtp)?;
        let code = OtpCode::parse(code).map_err(|_| ShareError::InvalidOtp)?;

        let challenge = self
            .challenge_repo
            .find_latest_otp_challenge(project.project_id, &email)
            .await?
            .ok_or(ShareError::InvalidOtp)?;

        if challenge.is_expired() || challenge.is_exhausted(self.config.otp_max_attempts) {
            self.challenge_repo
                .consume_otp_challenge(challenge.challenge_id)
                .await?;
            return Err(ShareError::InvalidOtp);
        }

        if !challenge.matches(&self.config.token_secret, &code) {
            let attempts = self
                .challenge_repo
                .increment_otp_attempts(challenge.challenge_id)
                .await?
                .unwrap_or(self.config.otp_max_attempts);

            if attempts >= self.config.otp_max_attempts {
                self.challenge_repo
                    .consume_otp_challenge(challenge.challenge_id)
                    .await?;
            }
            tracing::warn!(
                project_id = %project.project_id,
                challenge_id = %challenge.challenge_id,
                attempts,
                "One-time code mismatch"
            );
            return Err(ShareError::InvalidOtp);
        }

        // Single use, even under concurrent submissions
        if !self
            .challenge_repo
            .consume_otp_challenge(challenge.challenge_id)
            .await?
        {
            return Err(ShareError::InvalidOtp);
        }

        // Removed recipients lose access even with a valid code
        if self
            .recipient_repo
            .find_recipient(project.project_id, &email)
            .await?
            .is_none()
        {
            tracing::warn!(project_id = %project.project_id, "Code verified for a removed recipient");
            return Err(ShareError::InvalidOtp);
        }

        mint_session(
            self.session_repo.as_ref(),
            &self.config,
            &project,
            SessionSubject::recipient(email),
            fingerprint,
        )
        .await
    }
}
