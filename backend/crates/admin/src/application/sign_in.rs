//! Sign In Use Case
//!
//! Authenticates an admin and creates a session.

use std::sync::Arc;

use chrono::Utc;
use kernel::email::Email;
use kernel::id::AdminId;
use platform::password::ClearTextPassword;
use platform::rate_limit::RateLimitStore;

use crate::application::config::AdminConfig;
use crate::application::session_token;
use crate::domain::entity::admin_session::AdminSession;
use crate::domain::repository::{AdminSessionRepository, AdminUserRepository};
use crate::error::{AdminError, AdminResult};

/// Re-export ClientFingerprint from platform
pub use platform::client::ClientFingerprint;

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
    /// Remember me flag
    pub remember_me: bool,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    /// Session token for cookie
    pub session_token: String,
    pub admin_id: AdminId,
    pub email: Email,
    pub display_name: Option<String>,
    pub expires_at_ms: i64,
    pub remember_me: bool,
}

/// Sign in use case
pub struct SignInUseCase<U, S, L>
where
    U: AdminUserRepository,
    S: AdminSessionRepository,
    L: RateLimitStore,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    limiter: Arc<L>,
    config: Arc<AdminConfig>,
}

impl<U, S, L> SignInUseCase<U, S, L>
where
    U: AdminUserRepository,
    S: AdminSessionRepository,
    L: RateLimitStore,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        limiter: Arc<L>,
        config: Arc<AdminConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            limiter,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: SignInInput,
        fingerprint: ClientFingerprint,
    ) -> AdminResult<SignInOutput> {
        self.check_rate_limit(&fingerprint).await?;

        let email = Email::new(&input.email).map_err(|_| AdminError::InvalidCredentials)?;
        let password = ClearTextPassword::candidate(input.password);
        if password.is_empty() {
            return Err(AdminError::InvalidCredentials);
        }

        let mut admin = self
            .user_repo
            .find_admin_by_email(&email)
            .await?
            .ok_or(AdminError::InvalidCredentials)?;

        // Check if account is locked
        if admin.is_locked() {
            return Err(AdminError::AccountLocked);
        }

        if !admin.password_hash.verify(&password, self.config.pepper()) {
            admin.record_failure();
            self.user_repo.update_admin(&admin).await?;
            tracing::warn!(
                admin_id = %admin.admin_id,
                failures = admin.login_failed_count,
                locked = admin.is_locked(),
                "Admin password mismatch"
            );
            return Err(AdminError::InvalidCredentials);
        }

        admin.record_login();
        self.user_repo.update_admin(&admin).await?;

        let ttl = chrono::Duration::from_std(self.config.session_ttl(input.remember_me))
            .map_err(|e| AdminError::Internal(format!("Invalid session TTL: {e}")))?;

        let session = AdminSession::new(
            admin.admin_id,
            input.remember_me,
            fingerprint.hash_vec(),
            fingerprint.ip_string(),
            fingerprint.user_agent.clone(),
            ttl,
        );
        self.session_repo.create_admin_session(&session).await?;

        // Remember-me rows slide; the token carries the hard cap instead
        let token_exp = if input.remember_me {
            session.created_at.timestamp_millis()
                + self.config.session_absolute_ttl.as_millis() as i64
        } else {
            session.expires_at_ms
        };
        let session_token =
            session_token::issue(&self.config.token_secret, session.session_id, token_exp)?;

        tracing::info!(
            admin_id = %admin.admin_id,
            session_id = %session.session_id,
            remember_me = input.remember_me,
            "Admin signed in"
        );

        Ok(SignInOutput {
            session_token,
            admin_id: admin.admin_id,
            email: admin.email,
            display_name: admin.display_name,
            expires_at_ms: session.expires_at_ms,
            remember_me: input.remember_me,
        })
    }

    async fn check_rate_limit(&self, fingerprint: &ClientFingerprint) -> AdminResult<()> {
        let key = format!("admin-signin:{}", fingerprint.ip_key());
        let result = self
            .limiter
            .check_and_increment(&key, &self.config.sign_in_rate_limit)
            .await
            .map_err(|e| AdminError::Internal(format!("Rate limiter failed: {e}")))?;

        if !result.allowed {
            return Err(AdminError::RateLimited {
                retry_after_secs: result.retry_after_secs(Utc::now().timestamp_millis()),
            });
        }
        Ok(())
    }
}
