//! OTP Challenge Entity
//!
//! One outstanding code per (project, email). The code itself is never
//! stored, only an HMAC keyed with the server secret.

use chrono::{DateTime, Duration, Utc};
use kernel::email::Email;
use kernel::id::{OtpChallengeId, ProjectId};
use platform::crypto::{hmac_sha256, hmac_sha256_verify};

use crate::domain::value_object::otp_code::OtpCode;

/// Outstanding one-time code
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub challenge_id: OtpChallengeId,
    pub project_id: ProjectId,
    pub email: Email,
    /// HMAC-SHA256(secret, "otp" | challenge id | code)
    pub code_hash: Vec<u8>,
    /// Failed verification attempts
    pub attempts: i16,
    pub expires_at_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    /// Create a challenge for a freshly generated code
    pub fn new(
        project_id: ProjectId,
        email: Email,
        code: &OtpCode,
        secret: &[u8],
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        let challenge_id = OtpChallengeId::new();
        let code_hash = Self::keyed_hash(secret, challenge_id, code).to_vec();
        Self {
            challenge_id,
            project_id,
            email,
            code_hash,
            attempts: 0,
            expires_at_ms: (now + ttl).timestamp_millis(),
            created_at: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() >= self.expires_at_ms
    }

    pub fn is_exhausted(&self, max_attempts: i16) -> bool {
        self.attempts >= max_attempts
    }

    /// Constant-time comparison of a submitted code
    pub fn matches(&self, secret: &[u8], code: &OtpCode) -> bool {
        hmac_sha256_verify(
            secret,
            &[
                b"otp".as_slice(),
                self.challenge_id.as_uuid().as_bytes().as_slice(),
                code.as_bytes(),
            ],
            &self.code_hash,
        )
    }

    fn keyed_hash(secret: &[u8], challenge_id: OtpChallengeId, code: &OtpCode) -> [u8; 32] {
        hmac_sha256(
            secret,
            &[
                b"otp".as_slice(),
                challenge_id.as_uuid().as_bytes().as_slice(),
                code.as_bytes(),
            ],
        )
    }
}
