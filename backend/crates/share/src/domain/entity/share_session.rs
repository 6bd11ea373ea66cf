//! Share Session Entity
//!
//! Server-side record behind a `share` token.

use chrono::{DateTime, Duration, Utc};
use kernel::email::Email;
use kernel::id::{AdminId, ProjectId, ShareSessionId};

use crate::domain::value_object::access_method::AccessMethod;

/// Share session entity
#[derive(Debug, Clone)]
pub struct ShareSession {
    pub session_id: ShareSessionId,
    pub project_id: ProjectId,
    pub access_method: AccessMethod,
    /// Set for OTP sessions
    pub recipient_email: Option<Email>,
    /// Set for admin previews
    pub admin_id: Option<AdminId>,
    /// Project `auth_version` when the session was minted
    pub auth_version: i32,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
    pub client_fingerprint_hash: Vec<u8>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Who the session is for
#[derive(Debug, Clone)]
pub struct SessionSubject {
    pub access_method: AccessMethod,
    pub recipient_email: Option<Email>,
    pub admin_id: Option<AdminId>,
}

impl SessionSubject {
    pub fn anonymous(access_method: AccessMethod) -> Self {
        Self {
            access_method,
            recipient_email: None,
            admin_id: None,
        }
    }

    pub fn recipient(email: Email) -> Self {
        Self {
            access_method: AccessMethod::Otp,
            recipient_email: Some(email),
            admin_id: None,
        }
    }

    pub fn admin(admin_id: AdminId) -> Self {
        Self {
            access_method: AccessMethod::Admin,
            recipient_email: None,
            admin_id: Some(admin_id),
        }
    }
}

impl ShareSession {
    pub fn new(
        project_id: ProjectId,
        auth_version: i32,
        subject: SessionSubject,
        fingerprint_hash: Vec<u8>,
        client_ip: Option<String>,
        user_agent: Option<String>,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            session_id: ShareSessionId::new(),
            project_id,
            access_method: subject.access_method,
            recipient_email: subject.recipient_email,
            admin_id: subject.admin_id,
            auth_version,
            expires_at_ms: (now + ttl).timestamp_millis(),
            client_fingerprint_hash: fingerprint_hash,
            client_ip,
            user_agent,
            created_at: now,
            last_activity_at: now,
            revoked_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() >= self.expires_at_ms
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Not revoked and not expired
    pub fn is_active(&self) -> bool {
        !self.is_revoked() && !self.is_expired()
    }

    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }
}
