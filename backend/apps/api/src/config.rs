//! Application Configuration
//!
//! Reads the environment (after `.env`) into the per-context configs.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose;
use content::{ContentConfig, HotlinkMode, HotlinkPolicy};
use platform::client::TrustedProxies;

const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

/// Everything the server needs at startup
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub storage_root: PathBuf,
    pub otp_webhook_url: Option<String>,
    pub bootstrap_admin: Option<(String, String)>,
    pub admin: admin::AdminConfig,
    pub share: share::ShareConfig,
    pub review: review::ReviewConfig,
    pub content: ContentConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:31113".to_string())
            .parse()
            .context("BIND_ADDR is not a socket address")?;

        let frontend_origins: Vec<String> = optional("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let trusted_proxies = TrustedProxies::parse(&optional("TRUSTED_PROXIES").unwrap_or_default())
            .context("TRUSTED_PROXIES must list addresses or CIDR blocks")?;

        let secret = app_secret()?;
        let pepper = optional("PASSWORD_PEPPER").map(String::into_bytes);
        let debug = cfg!(debug_assertions);

        let mut admin = admin::AdminConfig {
            token_secret: derive_key(&secret, b"admin-session"),
            password_pepper: pepper.clone(),
            trusted_proxies: trusted_proxies.clone(),
            ..Default::default()
        };

        let mut share = share::ShareConfig {
            token_secret: derive_key(&secret, b"share-session"),
            session_ttl: secs("SHARE_SESSION_TTL_SECS", 12 * 3600)?,
            password_pepper: pepper,
            trusted_proxies: trusted_proxies.clone(),
            ..Default::default()
        };

        if debug {
            admin.cookie_secure = false;
            share.cookie_secure = false;
            share.breach_check = false;
        }

        let review = review::ReviewConfig {
            max_upload_bytes: number("MAX_UPLOAD_BYTES", 20 * 1024 * 1024 * 1024)?,
            ..Default::default()
        };

        let hotlink_mode = match optional("HOTLINK_MODE") {
            Some(raw) => HotlinkMode::from_str(&raw).map_err(anyhow::Error::msg)?,
            None => HotlinkMode::Block,
        };
        let content = ContentConfig {
            token_secret: derive_key(&secret, b"content"),
            stream_ttl: secs("CONTENT_TOKEN_TTL_SECS", 900)?,
            download_ttl: secs("DOWNLOAD_TOKEN_TTL_SECS", 120)?,
            hotlink: HotlinkPolicy::new(hotlink_mode, &frontend_origins),
            trusted_proxies,
            ..Default::default()
        };

        let bootstrap_admin = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some((email, password)),
            (None, None) => None,
            _ => bail!("ADMIN_EMAIL and ADMIN_PASSWORD must be set together"),
        };

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            storage_root: optional("STORAGE_ROOT")
                .unwrap_or_else(|| "./storage".to_string())
                .into(),
            otp_webhook_url: optional("OTP_WEBHOOK_URL"),
            bootstrap_admin,
            admin,
            share,
            review,
            content,
        })
    }
}

fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn number(name: &str, default: u64) -> anyhow::Result<u64> {
    match optional(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{name} must be a positive integer")),
        None => Ok(default),
    }
}

fn secs(name: &str, default: u64) -> anyhow::Result<Duration> {
    let value = number(name, default)?;
    if value == 0 {
        bail!("{name} must be greater than zero");
    }
    Ok(Duration::from_secs(value))
}

/// `APP_SECRET` is required in release builds; debug builds fall back to a
/// random key, invalidating every token on restart
fn app_secret() -> anyhow::Result<[u8; 32]> {
    let Some(encoded) = optional("APP_SECRET") else {
        if cfg!(debug_assertions) {
            tracing::warn!("APP_SECRET not set, using a random key");
            return Ok(platform::crypto::random_key());
        }
        bail!("APP_SECRET must be set in production");
    };

    let bytes = general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .context("APP_SECRET is not valid base64")?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("APP_SECRET must be 32 bytes, got {}", b.len()))
}

/// Separate key per token family
fn derive_key(secret: &[u8; 32], label: &[u8]) -> [u8; 32] {
    platform::crypto::hmac_sha256(secret, &[b"key-derivation".as_slice(), label])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_keys_differ_per_label() {
        let secret = [7u8; 32];
        assert_ne!(
            derive_key(&secret, b"admin-session"),
            derive_key(&secret, b"share-session")
        );
        assert_eq!(derive_key(&secret, b"content"), derive_key(&secret, b"content"));
    }
}
