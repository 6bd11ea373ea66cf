//! Application Configuration
//!
//! Configuration for the review application layer.

use platform::rate_limit::RateLimitConfig;

/// Review application configuration
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    /// Upload size limit for originals (20 GiB)
    pub max_upload_bytes: u64,
    /// Size limit for previews and thumbnails
    pub max_asset_bytes: u64,
    /// Comments per share session
    pub comment_rate_limit: RateLimitConfig,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 20 * 1024 * 1024 * 1024,
            max_asset_bytes: 20 * 1024 * 1024 * 1024,
            comment_rate_limit: RateLimitConfig::new(30, 60),
        }
    }
}

impl ReviewConfig {
    /// Small limits for local work and tests
    pub fn development() -> Self {
        Self {
            max_upload_bytes: 64 * 1024 * 1024,
            max_asset_bytes: 64 * 1024 * 1024,
            ..Default::default()
        }
    }
}
