//! Signed Tokens
//!
//! Compact stateless tokens: `base64url(json claims) "." base64url(tag)`.
//!
//! The HMAC-SHA256 tag covers `PURPOSE "." payload`, so a token minted for
//! one purpose (e.g. an admin session) never validates as another
//! (e.g. a content token), even though all purposes share one key.

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::{from_base64_url, hmac_sha256, hmac_sha256_verify, to_base64_url};

/// Upper bound on accepted token length (bytes)
pub const MAX_TOKEN_LENGTH: usize = 4096;

/// Token verification errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not two base64url segments, oversized, or claims do not parse
    #[error("Malformed token")]
    Malformed,

    /// Tag does not match (tampered, wrong key or wrong purpose)
    #[error("Invalid token signature")]
    BadSignature,

    /// Claims are well-formed but past their expiry
    #[error("Token expired")]
    Expired,

    /// Claims could not be serialized
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// Claims carried by a signed token
pub trait TokenClaims: Serialize + DeserializeOwned {
    /// Domain separator mixed into the MAC
    const PURPOSE: &'static str;

    /// Absolute expiry (Unix ms)
    fn expires_at_ms(&self) -> i64;
}

/// HMAC-SHA256 token signer
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TokenSigner {
    key: [u8; 32],
}

impl TokenSigner {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Sign claims into a compact token
    pub fn sign<C: TokenClaims>(&self, claims: &C) -> Result<String, TokenError> {
        let json = serde_json::to_vec(claims).map_err(|e| TokenError::Encoding(e.to_string()))?;
        let payload = to_base64_url(&json);
        let tag = hmac_sha256(
            &self.key,
            &[C::PURPOSE.as_bytes(), b".", payload.as_bytes()],
        );
        Ok(format!("{}.{}", payload, to_base64_url(&tag)))
    }

    /// Verify a token and return its claims
    ///
    /// The signature is checked before the claims are parsed, so
    /// attacker-controlled JSON never reaches the deserializer.
    pub fn verify<C: TokenClaims>(&self, token: &str, now_ms: i64) -> Result<C, TokenError> {
        if token.is_empty() || token.len() > MAX_TOKEN_LENGTH {
            return Err(TokenError::Malformed);
        }

        let (payload, tag_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;
        if payload.is_empty() || tag_b64.contains('.') {
            return Err(TokenError::Malformed);
        }

        let tag = from_base64_url(tag_b64).map_err(|_| TokenError::Malformed)?;
        if !hmac_sha256_verify(
            &self.key,
            &[C::PURPOSE.as_bytes(), b".", payload.as_bytes()],
            &tag,
        ) {
            return Err(TokenError::BadSignature);
        }

        let json = from_base64_url(payload).map_err(|_| TokenError::Malformed)?;
        let claims: C = serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;

        if now_ms >= claims.expires_at_ms() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct SessionClaims {
        sid: String,
        exp: i64,
    }

    impl TokenClaims for SessionClaims {
        const PURPOSE: &'static str = "test-session";
        fn expires_at_ms(&self) -> i64 {
            self.exp
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct OtherClaims {
        sid: String,
        exp: i64,
    }

    impl TokenClaims for OtherClaims {
        const PURPOSE: &'static str = "test-other";
        fn expires_at_ms(&self) -> i64 {
            self.exp
        }
    }

    fn claims(exp: i64) -> SessionClaims {
        SessionClaims {
            sid: "abc".to_string(),
            exp,
        }
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = TokenSigner::new([7u8; 32]);
        let token = signer.sign(&claims(2_000)).unwrap();

        assert_eq!(token.split('.').count(), 2);
        let verified: SessionClaims = signer.verify(&token, 1_000).unwrap();
        assert_eq!(verified, claims(2_000));
    }

    #[test]
    fn test_expired_token() {
        let signer = TokenSigner::new([7u8; 32]);
        let token = signer.sign(&claims(2_000)).unwrap();

        let result = signer.verify::<SessionClaims>(&token, 2_000);
        assert_eq!(result.unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_wrong_key() {
        let token = TokenSigner::new([7u8; 32]).sign(&claims(2_000)).unwrap();
        let result = TokenSigner::new([8u8; 32]).verify::<SessionClaims>(&token, 1_000);
        assert_eq!(result.unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn test_purpose_separation() {
        let signer = TokenSigner::new([7u8; 32]);
        let token = signer.sign(&claims(2_000)).unwrap();

        let result = signer.verify::<OtherClaims>(&token, 1_000);
        assert_eq!(result.unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn test_tampered_payload() {
        let signer = TokenSigner::new([7u8; 32]);
        let token = signer.sign(&claims(2_000)).unwrap();
        let (_, tag) = token.split_once('.').unwrap();

        let forged_payload = to_base64_url(br#"{"sid":"other","exp":2000}"#);
        let forged = format!("{}.{}", forged_payload, tag);
        let result = signer.verify::<SessionClaims>(&forged, 1_000);
        assert_eq!(result.unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn test_malformed_tokens() {
        let signer = TokenSigner::new([7u8; 32]);
        for token in ["", "abc", ".abc", "a.b.c", "abc.!!!"] {
            assert_eq!(
                signer.verify::<SessionClaims>(token, 0).unwrap_err(),
                TokenError::Malformed,
                "token {token:?}"
            );
        }

        let oversized = "a".repeat(MAX_TOKEN_LENGTH + 1);
        assert_eq!(
            signer.verify::<SessionClaims>(&oversized, 0).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let signer = TokenSigner::new([7u8; 32]);
        assert!(format!("{:?}", signer).contains("REDACTED"));
    }
}
