//! Admin Session Tokens
//!
//! The cookie value is a signed token naming the session row; the row
//! remains the source of truth for expiry and revocation.

use kernel::id::AdminSessionId;
use platform::token::{TokenClaims, TokenSigner};
use serde::{Deserialize, Serialize};

use crate::error::{AdminError, AdminResult};

/// Claims of an `admin-session` token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSessionClaims {
    pub sid: AdminSessionId,
    pub exp: i64,
}

impl TokenClaims for AdminSessionClaims {
    const PURPOSE: &'static str = "admin-session";

    fn expires_at_ms(&self) -> i64 {
        self.exp
    }
}

/// Sign a session token
pub fn issue(secret: &[u8; 32], sid: AdminSessionId, exp: i64) -> AdminResult<String> {
    TokenSigner::new(*secret)
        .sign(&AdminSessionClaims { sid, exp })
        .map_err(|e| AdminError::Internal(e.to_string()))
}

/// Verify a session token and return the session id
pub fn parse(secret: &[u8; 32], token: &str, now_ms: i64) -> AdminResult<AdminSessionId> {
    TokenSigner::new(*secret)
        .verify::<AdminSessionClaims>(token, now_ms)
        .map(|claims| claims.sid)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected admin session token");
            AdminError::SessionInvalid
        })
}
