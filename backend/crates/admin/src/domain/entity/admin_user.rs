//! Admin User Entity
//!
//! Studio staff who manage projects. Credentials and lockout state live
//! on the same row; there is no self sign-up.

use chrono::{DateTime, Utc};
use kernel::email::Email;
use kernel::id::AdminId;
use kernel::principal::AdminPrincipal;
use platform::password::HashedPassword;

/// Admin account
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub admin_id: AdminId,
    pub email: Email,
    pub display_name: Option<String>,
    /// Argon2id PHC string
    pub password_hash: HashedPassword,
    /// Consecutive login failure count
    pub login_failed_count: u16,
    /// Last login failure time
    pub last_failed_at: Option<DateTime<Utc>>,
    /// Account locked until (temporary lockout after failures)
    pub locked_until: Option<DateTime<Utc>>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AdminUser {
    /// Maximum login failures before temporary lockout
    pub const MAX_LOGIN_FAILURES: u16 = 5;
    /// Lockout duration in minutes
    pub const LOCKOUT_MINUTES: i64 = 15;

    pub fn new(email: Email, display_name: Option<String>, password_hash: HashedPassword) -> Self {
        let now = Utc::now();
        Self {
            admin_id: AdminId::new(),
            email,
            display_name,
            password_hash,
            login_failed_count: 0,
            last_failed_at: None,
            locked_until: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if account is currently locked
    pub fn is_locked(&self) -> bool {
        if let Some(locked_until) = self.locked_until {
            Utc::now() < locked_until
        } else {
            false
        }
    }

    /// Record a failed login attempt
    pub fn record_failure(&mut self) {
        let now = Utc::now();
        self.login_failed_count = self.login_failed_count.saturating_add(1);
        self.last_failed_at = Some(now);
        self.updated_at = now;

        // Lock account after too many failures
        if self.login_failed_count >= Self::MAX_LOGIN_FAILURES {
            self.locked_until = Some(now + chrono::Duration::minutes(Self::LOCKOUT_MINUTES));
            self.login_failed_count = 0;
        }
    }

    /// Reset failures and stamp the login time
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.login_failed_count = 0;
        self.last_failed_at = None;
        self.locked_until = None;
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    pub fn to_principal(&self) -> AdminPrincipal {
        AdminPrincipal {
            admin_id: self.admin_id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::ClearTextPassword;

    fn admin() -> AdminUser {
        let hash = ClearTextPassword::new("Colour-Grade-77".to_string())
            .unwrap()
            .hash(None)
            .unwrap();
        AdminUser::new(Email::new("editor@studio.com").unwrap(), None, hash)
    }

    #[test]
    fn test_lockout_after_max_failures() {
        let mut user = admin();
        for _ in 0..AdminUser::MAX_LOGIN_FAILURES - 1 {
            user.record_failure();
            assert!(!user.is_locked());
        }
        user.record_failure();
        assert!(user.is_locked());
    }

    #[test]
    fn test_login_clears_lockout() {
        let mut user = admin();
        for _ in 0..AdminUser::MAX_LOGIN_FAILURES {
            user.record_failure();
        }
        user.record_login();
        assert!(!user.is_locked());
        assert_eq!(user.login_failed_count, 0);
        assert!(user.last_login_at.is_some());
    }

    #[test]
    fn test_expired_lock_is_not_locked() {
        let mut user = admin();
        user.locked_until = Some(Utc::now() - chrono::Duration::seconds(1));
        assert!(!user.is_locked());
    }
}
