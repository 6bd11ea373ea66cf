//! Application Configuration
//!
//! Configuration for the admin application layer.

use std::time::Duration;

use platform::client::TrustedProxies;
use platform::cookie::CookieConfig;
use platform::rate_limit::RateLimitConfig;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Admin application configuration
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Token signing key (32 bytes)
    pub token_secret: [u8; 32],
    /// Session TTL without "Remember Me" (12 hours)
    pub session_ttl_short: Duration,
    /// Session TTL with "Remember Me" (1 week, sliding)
    pub session_ttl_long: Duration,
    /// Hard cap on a remember-me token, however often it slides
    pub session_absolute_ttl: Duration,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Sign-in attempts per client IP
    pub sign_in_rate_limit: RateLimitConfig,
    /// Proxies allowed to set `X-Forwarded-For`
    pub trusted_proxies: TrustedProxies,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "admin_session".to_string(),
            token_secret: [0u8; 32],
            session_ttl_short: Duration::from_secs(12 * 3600), // 12 hours
            session_ttl_long: Duration::from_secs(7 * 24 * 3600), // 1 week
            session_absolute_ttl: Duration::from_secs(30 * 24 * 3600), // 30 days
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            sign_in_rate_limit: RateLimitConfig::new(10, 15 * 60),
            trusted_proxies: TrustedProxies::none(),
        }
    }
}

impl AdminConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_key(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Session TTL for the given remember-me choice
    pub fn session_ttl(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.session_ttl_long
        } else {
            self.session_ttl_short
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    /// Cookie carrying the session token
    pub fn session_cookie(&self, remember_me: bool) -> CookieConfig {
        CookieConfig::session(
            self.session_cookie_name.clone(),
            self.cookie_secure,
            self.cookie_same_site,
        )
        .with_max_age(self.session_ttl(remember_me).as_secs() as i64)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AdminConfig::default();

        assert_eq!(config.session_cookie_name, "admin_session");
        assert_eq!(config.session_ttl(false), Duration::from_secs(43_200));
        assert_eq!(config.session_ttl(true), Duration::from_secs(604_800));
        assert_eq!(config.sign_in_rate_limit.max_requests, 10);
        assert!(config.cookie_secure);
    }

    #[test]
    fn test_development_config() {
        let config = AdminConfig::development();
        assert!(!config.cookie_secure);
        assert!(config.token_secret.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_session_cookie_max_age() {
        let config = AdminConfig::default();
        assert!(config.session_cookie(true).build_set_cookie("t").contains("Max-Age=604800"));
        assert!(config.session_cookie(false).build_set_cookie("t").contains("Max-Age=43200"));
    }
}
