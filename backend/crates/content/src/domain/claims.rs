//! Content Token Claims
//!
//! A content token grants one asset of one video to one share session,
//! from one client. It is short-lived and carries everything needed to
//! re-check the grant when the file is fetched.

use kernel::id::{ProjectId, ShareSessionId, VideoId};
use platform::client::ClientFingerprint;
use platform::crypto::{constant_time_eq, hmac_sha256, to_base64_url};
use platform::token::TokenClaims;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::asset_kind::AssetKind;

/// Bytes of the keyed fingerprint kept in the token
const FINGERPRINT_TAG_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentClaims {
    pub sid: ShareSessionId,
    pub pid: ProjectId,
    pub vid: VideoId,
    pub asset: AssetKind,
    /// Served as an attachment
    pub dl: bool,
    /// Keyed tag of the client fingerprint
    pub fp: String,
    pub exp: i64,
}

impl TokenClaims for ContentClaims {
    const PURPOSE: &'static str = "content";

    fn expires_at_ms(&self) -> i64 {
        self.exp
    }
}

/// Keyed, truncated tag of a fingerprint
///
/// Keyed so the token does not expose the raw User-Agent hash.
pub fn fingerprint_tag(secret: &[u8; 32], fingerprint: &ClientFingerprint) -> String {
    let mac = hmac_sha256(secret, &[b"content-fp", fingerprint.hash.as_slice()]);
    to_base64_url(&mac[..FINGERPRINT_TAG_LEN])
}

impl ContentClaims {
    pub fn fingerprint_matches(&self, secret: &[u8; 32], fingerprint: &ClientFingerprint) -> bool {
        constant_time_eq(
            self.fp.as_bytes(),
            fingerprint_tag(secret, fingerprint).as_bytes(),
        )
    }
}
