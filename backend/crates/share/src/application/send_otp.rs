//! Send OTP Use Case
//!
//! Issues a one-time code to a project recipient. The outcome is the same
//! for unknown addresses so the endpoint cannot be used to enumerate
//! recipients.

use std::sync::Arc;

use chrono::Duration;
use kernel::email::Email;
use platform::client::ClientFingerprint;
use platform::rate_limit::RateLimitStore;

use crate::application::config::ShareConfig;
use crate::application::otp_delivery::{OtpMessage, OtpSender};
use crate::application::rate_limit::enforce;
use crate::application::share_info::load_shared_project;
use crate::domain::entity::otp_challenge::OtpChallenge;
use crate::domain::repository::{OtpChallengeRepository, ProjectRepository, RecipientRepository};
use crate::domain::value_object::otp_code::OtpCode;
use crate::error::{ShareError, ShareResult};

/// Send OTP use case
pub struct SendOtpUseCase<P, R, C, L, D>
where
    P: ProjectRepository,
    R: RecipientRepository,
    C: OtpChallengeRepository,
    L: RateLimitStore,
    D: OtpSender + Send + Sync + 'static,
{
    project_repo: Arc<P>,
    recipient_repo: Arc<R>,
    challenge_repo: Arc<C>,
    limiter: Arc<L>,
    sender: Arc<D>,
    config: Arc<ShareConfig>,
}

impl<P, R, C, L, D> SendOtpUseCase<P, R, C, L, D>
where
    P: ProjectRepository,
    R: RecipientRepository,
    C: OtpChallengeRepository,
    L: RateLimitStore,
    D: OtpSender + Send + Sync + 'static,
{
    pub fn new(
        project_repo: Arc<P>,
        recipient_repo: Arc<R>,
        challenge_repo: Arc<C>,
        limiter: Arc<L>,
        sender: Arc<D>,
        config: Arc<ShareConfig>,
    ) -> Self {
        Self {
            project_repo,
            recipient_repo,
            challenge_repo,
            limiter,
            sender,
            config,
        }
    }

    /// Returns the code lifetime in seconds, whether or not a code was sent
    pub async fn execute(
        &self,
        slug: &str,
        email: &str,
        fingerprint: &ClientFingerprint,
    ) -> ShareResult<u64> {
        enforce(
            self.limiter.as_ref(),
            "otp-send-ip",
            &fingerprint.ip_key(),
            &self.config.otp_send_ip_rate_limit,
        )
        .await?;

        let project = load_shared_project(self.project_repo.as_ref(), slug).await?;
        if !project.auth_mode.allows_otp() {
            return Err(ShareError::MethodNotAllowed);
        }

        let email = Email::new(email)
            .map_err(|_| ShareError::Validation("Invalid email address".to_string()))?;

        let subject = format!("{}:{}", project.project_id, email.as_str());
        enforce(
            self.limiter.as_ref(),
            "otp-send-email",
            &subject,
            &self.config.otp_send_email_rate_limit,
        )
        .await?;

        let expires_in_secs = self.config.otp_ttl.as_secs();

        let recipient = self
            .recipient_repo
            .find_recipient(project.project_id, &email)
            .await?;
        if recipient.is_none() {
            tracing::info!(
                project_id = %project.project_id,
                email = %email.masked(),
                "Code requested for an address that is not a recipient"
            );
            return Ok(expires_in_secs);
        }

        let ttl = Duration::from_std(self.config.otp_ttl)
            .map_err(|e| ShareError::Internal(format!("Invalid OTP TTL: {e}")))?;
        let code = OtpCode::generate();
        let challenge = OtpChallenge::new(
            project.project_id,
            email.clone(),
            &code,
            &self.config.token_secret,
            ttl,
        );
        self.challenge_repo.replace_otp_challenge(&challenge).await?;

        let message = OtpMessage {
            to: email,
            code,
            project_title: project.title,
            expires_in_minutes: ttl.num_minutes(),
        };

        // Delivery latency must not reveal membership
        let sender = self.sender.clone();
        let project_id = project.project_id;
        tokio::spawn(async move {
            if let Err(e) = sender.send_otp(&message).await {
                tracing::error!(project_id = %project_id, error = %e, "Failed to deliver one-time code");
            }
        });

        tracing::info!(
            project_id = %project_id,
            challenge_id = %challenge.challenge_id,
            "One-time code issued"
        );
        Ok(expires_in_secs)
    }
}
