//! Application Configuration
//!
//! Configuration for content tokens and media delivery.

use std::time::Duration;

use platform::client::TrustedProxies;
use platform::rate_limit::RateLimitConfig;

use crate::domain::value_object::hotlink::{HotlinkMode, HotlinkPolicy};

/// Content application configuration
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Token signing key (32 bytes)
    pub token_secret: [u8; 32],
    /// Lifetime of streaming tokens (15 minutes)
    pub stream_ttl: Duration,
    /// Lifetime of download tokens (2 minutes)
    pub download_ttl: Duration,
    /// Token issuance per share session
    pub issue_rate_limit: RateLimitConfig,
    /// Media fetches per share session (players issue many range requests)
    pub resolve_rate_limit: RateLimitConfig,
    pub hotlink: HotlinkPolicy,
    /// Proxies allowed to set `X-Forwarded-For`
    pub trusted_proxies: TrustedProxies,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            stream_ttl: Duration::from_secs(900),
            download_ttl: Duration::from_secs(120),
            issue_rate_limit: RateLimitConfig::new(120, 60),
            resolve_rate_limit: RateLimitConfig::new(600, 60),
            hotlink: HotlinkPolicy::new(HotlinkMode::Block, Vec::<String>::new()),
            trusted_proxies: TrustedProxies::none(),
        }
    }
}

impl ContentConfig {
    /// Create config with a random token secret
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_key(),
            ..Default::default()
        }
    }

    /// Local frontend allowed, foreign sources only logged
    pub fn development() -> Self {
        Self {
            hotlink: HotlinkPolicy::new(
                HotlinkMode::LogOnly,
                ["http://localhost:40922", "http://127.0.0.1:40922"],
            ),
            ..Self::with_random_secret()
        }
    }

    pub fn token_ttl(&self, download: bool) -> Duration {
        if download {
            self.download_ttl
        } else {
            self.stream_ttl
        }
    }
}
