//! Client identification
//!
//! Share and admin sessions are bound to a hash of the User-Agent; rate
//! limits key on the client IP, read from forwarding headers only behind a
//! configured proxy. Media players reuse the browser's UA, so the
//! same hash also ties content tokens to the page that requested them.

use std::net::IpAddr;

use axum::http::{HeaderMap, header};

use crate::crypto::{constant_time_eq, sha256};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Who is calling, as far as headers tell
#[derive(Debug, Clone)]
pub struct ClientFingerprint {
    /// SHA-256 of the User-Agent
    pub hash: [u8; 32],
    pub ip: Option<IpAddr>,
    /// Kept for the session list in the admin UI
    pub user_agent: Option<String>,
}

impl ClientFingerprint {
    pub fn new(hash: [u8; 32], ip: Option<IpAddr>, user_agent: Option<String>) -> Self {
        Self {
            hash,
            ip,
            user_agent,
        }
    }

    /// Hash as stored in `client_fingerprint_hash`
    pub fn hash_vec(&self) -> Vec<u8> {
        self.hash.to_vec()
    }

    /// IP as bound to an `inet` column
    pub fn ip_string(&self) -> Option<String> {
        self.ip.as_ref().map(IpAddr::to_string)
    }

    /// IP component of rate-limit keys
    pub fn ip_key(&self) -> String {
        self.ip_string().unwrap_or_else(|| "unknown".to_string())
    }

    /// Whether a stored fingerprint hash belongs to this client
    pub fn matches(&self, stored_hash: &[u8]) -> bool {
        constant_time_eq(&self.hash, stored_hash)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum FingerprintError {
    #[error("Missing required header: {0}")]
    MissingHeader(String),
}

/// Fingerprint a request; a missing or non-ASCII User-Agent is rejected
pub fn extract_fingerprint(
    headers: &HeaderMap,
    client_ip: Option<IpAddr>,
) -> Result<ClientFingerprint, FingerprintError> {
    let Some(user_agent) = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
    else {
        return Err(FingerprintError::MissingHeader("User-Agent".to_string()));
    };

    Ok(ClientFingerprint {
        hash: sha256(user_agent.as_bytes()),
        ip: client_ip,
        user_agent: Some(user_agent.to_string()),
    })
}

/// Reverse proxies whose forwarding headers are believed
///
/// Entries are single addresses or CIDR blocks (`10.0.0.0/8`, `::1`).
/// Empty means no proxy: forwarding headers are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustedProxies {
    networks: Vec<(IpAddr, u8)>,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Invalid proxy address: {0}")]
pub struct TrustedProxyError(String);

impl TrustedProxies {
    pub fn none() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list
    pub fn parse(list: &str) -> Result<Self, TrustedProxyError> {
        let networks = list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_network)
            .collect::<Result<_, _>>()?;
        Ok(Self { networks })
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        self.networks
            .iter()
            .any(|(network, prefix)| in_network(ip, *network, *prefix))
    }
}

fn parse_network(entry: &str) -> Result<(IpAddr, u8), TrustedProxyError> {
    let invalid = || TrustedProxyError(entry.to_string());
    let (addr, prefix) = match entry.split_once('/') {
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (entry, None),
    };
    let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
    let max = if addr.is_ipv4() { 32 } else { 128 };
    let prefix = match prefix {
        Some(p) => p.parse::<u8>().map_err(|_| invalid())?,
        None => max,
    };
    if prefix > max {
        return Err(invalid());
    }
    Ok((addr, prefix))
}

fn in_network(ip: IpAddr, network: IpAddr, prefix: u8) -> bool {
    match (ip, network) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            let mask = u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0);
            u32::from(ip) & mask == u32::from(net) & mask
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            let mask = u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0);
            u128::from(ip) & mask == u128::from(net) & mask
        }
        // IPv4-mapped peers on a dual-stack listener
        (IpAddr::V6(ip), IpAddr::V4(_)) => ip
            .to_ipv4_mapped()
            .is_some_and(|v4| in_network(IpAddr::V4(v4), network, prefix)),
        _ => false,
    }
}

/// Client IP behind the reverse proxy
///
/// Forwarding headers count only when the socket peer is a trusted proxy.
/// `X-Forwarded-For` is walked right to left and the first hop that is not
/// itself a trusted proxy wins, stopping at the first unparsable hop.
/// `X-Real-IP` is used when that yields nothing. Anything else falls back to
/// the socket address.
pub fn extract_client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trusted: &TrustedProxies,
) -> Option<IpAddr> {
    let peer_ip = peer?;
    if !trusted.contains(peer_ip) {
        return Some(peer_ip);
    }

    let hops: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .collect();

    for hop in hops.iter().rev() {
        match hop.trim().parse::<IpAddr>() {
            Ok(ip) if trusted.contains(ip) => continue,
            Ok(ip) => return Some(ip),
            Err(_) => break,
        }
    }

    headers
        .get(X_REAL_IP)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .or(Some(peer_ip))
}

/// Token from `Authorization: Bearer …`
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with(name: &'static str, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_fingerprint_from_user_agent() {
        let headers = with("user-agent", "Player/1.0");
        let fp = extract_fingerprint(&headers, None).unwrap();

        assert_eq!(fp.user_agent.as_deref(), Some("Player/1.0"));
        assert!(fp.matches(&sha256(b"Player/1.0")));
        assert!(!fp.matches(&sha256(b"Player/2.0")));
        assert!(!fp.matches(&[]));
        assert_eq!(fp.ip_key(), "unknown");
    }

    #[test]
    fn test_fingerprint_requires_user_agent() {
        assert!(matches!(
            extract_fingerprint(&HeaderMap::new(), None),
            Err(FingerprintError::MissingHeader(_))
        ));
    }

    fn proxies() -> TrustedProxies {
        TrustedProxies::parse("10.0.0.0/8, ::1").unwrap()
    }

    #[test]
    fn test_trusted_proxy_parsing() {
        let trusted = proxies();
        assert!(trusted.contains("10.20.30.40".parse().unwrap()));
        assert!(trusted.contains("::1".parse().unwrap()));
        assert!(trusted.contains("::ffff:10.0.0.9".parse().unwrap()));
        assert!(!trusted.contains("11.0.0.1".parse().unwrap()));
        assert!(TrustedProxies::parse("").unwrap().is_empty());
        assert!(TrustedProxies::parse("10.0.0.0/33").is_err());
        assert!(TrustedProxies::parse("proxy.internal").is_err());
    }

    #[test]
    fn test_forwarded_headers_ignored_from_untrusted_peer() {
        let peer: IpAddr = "203.0.113.7".parse().unwrap();
        for i in 0..5 {
            let mut headers = HeaderMap::new();
            headers.insert(
                X_FORWARDED_FOR,
                HeaderValue::from_str(&format!("10.9.8.{i}")).unwrap(),
            );
            headers.insert(X_REAL_IP, HeaderValue::from_static("198.51.100.1"));
            assert_eq!(extract_client_ip(&headers, Some(peer), &proxies()), Some(peer));
            assert_eq!(
                extract_client_ip(&headers, Some(peer), &TrustedProxies::none()),
                Some(peer)
            );
        }
    }

    #[test]
    fn test_rightmost_untrusted_hop_wins() {
        let proxy: IpAddr = "10.0.0.2".parse().unwrap();

        // A client-supplied left-most entry cannot pick its own key
        let chain = with("x-forwarded-for", "1.1.1.1, 203.0.113.7, 10.0.0.1");
        assert_eq!(
            extract_client_ip(&chain, Some(proxy), &proxies()),
            Some("203.0.113.7".parse().unwrap())
        );

        let real = with("x-real-ip", "2001:db8::1");
        assert_eq!(
            extract_client_ip(&real, Some(proxy), &proxies()),
            Some("2001:db8::1".parse().unwrap())
        );

        let garbage = with("x-forwarded-for", "unknown");
        assert_eq!(extract_client_ip(&garbage, Some(proxy), &proxies()), Some(proxy));
        assert_eq!(extract_client_ip(&HeaderMap::new(), None, &proxies()), None);
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
        assert_eq!(
            extract_bearer_token(&with("authorization", "Bearer abc.def")),
            Some("abc.def".to_string())
        );
        assert_eq!(
            extract_bearer_token(&with("authorization", "bearer  xyz ")),
            Some("xyz".to_string())
        );
        assert_eq!(
            extract_bearer_token(&with("authorization", "Basic dXNlcg==")),
            None
        );
        assert_eq!(extract_bearer_token(&with("authorization", "Bearer ")), None);
    }
}
