//! Rate Limiting Infrastructure
//!
//! Common rate limiting abstractions and implementations.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Rate limit check result
#[derive(Debug, Clone)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Seconds until the window resets (rounded up, at least 1)
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let remaining_ms = (self.reset_at_ms - now_ms).max(0) as u64;
        remaining_ms.div_ceil(1000).max(1)
    }
}

/// Boxed store error
pub type RateLimitError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Check and increment rate limit counter
    /// Returns (allowed, remaining_requests)
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start_ms: i64,
    len_ms: i64,
    count: u32,
}

/// In-process fixed-window rate limiter
///
/// Windows are aligned to multiples of the configured window length.
/// Counters live only in this process; a multi-instance deployment
/// needs a shared backend behind [`RateLimitStore`].
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check and increment at an explicit time
    pub fn check_at(&self, key: &str, config: &RateLimitConfig, now_ms: i64) -> RateLimitResult {
        let len_ms = config.window_ms().max(1);
        let start_ms = now_ms - now_ms.rem_euclid(len_ms);

        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let window = windows.entry(key.to_string()).or_insert(Window {
            start_ms,
            len_ms,
            count: 0,
        });

        if window.start_ms != start_ms || window.len_ms != len_ms {
            *window = Window {
                start_ms,
                len_ms,
                count: 0,
            };
        }

        window.count = window.count.saturating_add(1);
        let allowed = window.count <= config.max_requests;

        RateLimitResult {
            allowed,
            remaining: config.max_requests.saturating_sub(window.count),
            reset_at_ms: start_ms + len_ms,
        }
    }

    /// Drop windows that ended before `now_ms`
    pub fn purge_expired_at(&self, now_ms: i64) -> usize {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = windows.len();
        windows.retain(|_, w| w.start_ms + w.len_ms > now_ms);
        before - windows.len()
    }

    /// Drop windows that already ended
    pub fn purge_expired(&self) -> usize {
        let purged = self.purge_expired_at(now_ms());
        tracing::debug!(purged = purged, "Purged expired rate-limit windows");
        purged
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.windows
            .lock()
            .map(|w| w.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitError> {
        Ok(self.check_at(key, config, now_ms()))
    }
}

/// Current Unix time in milliseconds
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
