//! Application Configuration
//!
//! Configuration for the share application layer.

use std::time::Duration;

use platform::client::TrustedProxies;
use platform::cookie::CookieConfig;
use platform::rate_limit::RateLimitConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Share application configuration
#[derive(Debug, Clone)]
pub struct ShareConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Token signing key (32 bytes), also keys OTP hashes
    pub token_secret: [u8; 32],
    /// Share session lifetime (12 hours)
    pub session_ttl: Duration,
    /// One-time code lifetime (10 minutes)
    pub otp_ttl: Duration,
    /// Failed attempts before a code is destroyed
    pub otp_max_attempts: i16,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Check new share passwords against HIBP (non-blocking)
    pub breach_check: bool,
    /// Password attempts per (project, IP)
    pub password_rate_limit: RateLimitConfig,
    /// Password attempts per project, from any address
    pub password_project_rate_limit: RateLimitConfig,
    /// Code requests per IP
    pub otp_send_ip_rate_limit: RateLimitConfig,
    /// Code requests per (project, email)
    pub otp_send_email_rate_limit: RateLimitConfig,
    /// Code verifications per IP
    pub otp_verify_rate_limit: RateLimitConfig,
    /// Guest sessions per IP
    pub guest_rate_limit: RateLimitConfig,
    /// Proxies allowed to set `X-Forwarded-For`
    pub trusted_proxies: TrustedProxies,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "share_session".to_string(),
            token_secret: [0u8; 32],
            session_ttl: Duration::from_secs(12 * 3600), // 12 hours
            otp_ttl: Duration::from_secs(10 * 60),       // 10 minutes
            otp_max_attempts: 5,
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            breach_check: true,
            password_rate_limit: RateLimitConfig::new(5, 15 * 60),
            password_project_rate_limit: RateLimitConfig::new(30, 15 * 60),
            otp_send_ip_rate_limit: RateLimitConfig::new(10, 3600),
            otp_send_email_rate_limit: RateLimitConfig::new(3, 15 * 60),
            otp_verify_rate_limit: RateLimitConfig::new(20, 15 * 60),
            guest_rate_limit: RateLimitConfig::new(30, 15 * 60),
            trusted_proxies: TrustedProxies::none(),
        }
    }
}

impl ShareConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_key(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie, no breach check)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            breach_check: false,
            ..Self::with_random_secret()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cookie carrying the session token
    pub fn session_cookie(&self) -> CookieConfig {
        CookieConfig::session(
            self.session_cookie_name.clone(),
            self.cookie_secure,
            self.cookie_same_site,
        )
        .with_max_age(self.session_ttl.as_secs() as i64)
    }

    /// Cookie attributes used when clearing the session
    pub fn clear_cookie(&self) -> CookieConfig {
        CookieConfig::session(
            self.session_cookie_name.clone(),
            self.cookie_secure,
            self.cookie_same_site,
        )
    }
}
