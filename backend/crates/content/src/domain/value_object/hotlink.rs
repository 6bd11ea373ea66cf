//! Hotlink Policy
//!
//! Decides whether a media request coming from another site may be
//! served. The source is the `Origin` header, else the `Referer`.

use http::Uri;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Enforcement mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HotlinkMode {
    /// No check at all
    Disabled,
    /// Serve, but log foreign sources
    LogOnly,
    /// Reject foreign sources
    #[default]
    Block,
}

impl FromStr for HotlinkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" => Ok(Self::Disabled),
            "log_only" | "log" => Ok(Self::LogOnly),
            "block" => Ok(Self::Block),
            other => Err(format!("Unknown hotlink mode: {other}")),
        }
    }
}

/// Outcome of a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HotlinkVerdict {
    Allowed,
    /// Foreign source, served anyway (log-only)
    Logged(String),
    Blocked(String),
}

/// Mode plus the hosts media may be embedded from
#[derive(Debug, Clone, Default)]
pub struct HotlinkPolicy {
    pub mode: HotlinkMode,
    /// `host` or `host:port`, lower-case
    allowed_hosts: Vec<String>,
}

impl HotlinkPolicy {
    /// Build from origins or bare hosts (`https://app.example.com`, `localhost:3000`)
    pub fn new<I, S>(mode: HotlinkMode, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_hosts = allowed
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.as_ref().trim();
                source_host(entry).or_else(|| {
                    (!entry.is_empty() && !entry.contains('/')).then(|| entry.to_ascii_lowercase())
                })
            })
            .collect();
        Self {
            mode,
            allowed_hosts,
        }
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    /// Check a request source
    ///
    /// A missing source passes (privacy settings strip `Referer`). The
    /// API's own host always passes.
    pub fn check(&self, source: Option<&str>, own_host: Option<&str>) -> HotlinkVerdict {
        if self.mode == HotlinkMode::Disabled {
            return HotlinkVerdict::Allowed;
        }
        let Some(source) = source.map(str::trim).filter(|s| !s.is_empty()) else {
            return HotlinkVerdict::Allowed;
        };

        let host = source_host(source);
        let own = own_host.map(|h| h.trim().to_ascii_lowercase());
        let allowed = match &host {
            Some(host) => {
                self.allowed_hosts.iter().any(|h| h == host) || own.as_deref() == Some(host)
            }
            None => false,
        };
        if allowed {
            return HotlinkVerdict::Allowed;
        }

        let seen = host.unwrap_or_else(|| source.to_string());
        match self.mode {
            HotlinkMode::LogOnly => HotlinkVerdict::Logged(seen),
            _ => HotlinkVerdict::Blocked(seen),
        }
    }
}

/// `https://Example.com:8443/x?y` -> `example.com:8443`
fn source_host(value: &str) -> Option<String> {
    let uri = Uri::from_str(value).ok()?;
    uri.scheme()?;
    let host = uri.host()?.to_ascii_lowercase();
    Some(match uri.port_u16() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    })
}
