//! Rate limit guard shared by the share-page use cases

use chrono::Utc;
use platform::rate_limit::{RateLimitConfig, RateLimitStore};

use crate::error::{ShareError, ShareResult};

/// Count one request against `{scope}:{subject}`
///
/// Only the scope is logged; subjects may contain email addresses.
pub(crate) async fn enforce<L: RateLimitStore>(
    limiter: &L,
    scope: &'static str,
    subject: &str,
    config: &RateLimitConfig,
) -> ShareResult<()> {
    let key = format!("{scope}:{subject}");
    let result = limiter
        .check_and_increment(&key, config)
        .await
        .map_err(|e| ShareError::Internal(format!("Rate limiter failed: {e}")))?;

    if !result.allowed {
        tracing::warn!(scope, "Share rate limit hit");
        return Err(ShareError::RateLimited {
            retry_after_secs: result.retry_after_secs(Utc::now().timestamp_millis()),
        });
    }
    Ok(())
}
