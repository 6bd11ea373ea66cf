//! Share Session Token
//!
//! Signed `share` token carrying the session and project ids.

use kernel::id::{ProjectId, ShareSessionId};
use platform::token::{TokenClaims, TokenSigner};
use serde::{Deserialize, Serialize};

use crate::error::{ShareError, ShareResult};

/// Claims of a share session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareClaims {
    pub sid: ShareSessionId,
    pub pid: ProjectId,
    pub exp: i64,
}

impl TokenClaims for ShareClaims {
    const PURPOSE: &'static str = "share";

    fn expires_at_ms(&self) -> i64 {
        self.exp
    }
}

/// Sign a session token
pub fn issue(
    secret: &[u8; 32],
    session_id: ShareSessionId,
    project_id: ProjectId,
    expires_at_ms: i64,
) -> ShareResult<String> {
    TokenSigner::new(*secret)
        .sign(&ShareClaims {
            sid: session_id,
            pid: project_id,
            exp: expires_at_ms,
        })
        .map_err(|e| ShareError::Internal(format!("Failed to sign share token: {e}")))
}

/// Verify a session token
pub fn parse(secret: &[u8; 32], token: &str, now_ms: i64) -> ShareResult<ShareClaims> {
    TokenSigner::new(*secret)
        .verify::<ShareClaims>(token, now_ms)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected share token");
            ShareError::SessionInvalid
        })
}
