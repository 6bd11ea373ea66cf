//! Auth Mode Value Object
//!
//! How clients must authenticate before the share page opens.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Share-page authentication mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum AuthMode {
    /// No authentication, anyone with the link can view
    None = 0,

    /// Shared project password
    #[default]
    Password = 1,

    /// One-time code emailed to a recipient
    Otp = 2,

    /// Either of the above
    PasswordOrOtp = 3,
}

impl AuthMode {
    /// Get numeric ID for database storage
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    /// Get string code for serialization/API
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Password => "password",
            Self::Otp => "otp",
            Self::PasswordOrOtp => "password_or_otp",
        }
    }

    /// Whether the share password is accepted (and therefore required)
    #[inline]
    pub const fn allows_password(&self) -> bool {
        matches!(self, Self::Password | Self::PasswordOrOtp)
    }

    #[inline]
    pub const fn allows_otp(&self) -> bool {
        matches!(self, Self::Otp | Self::PasswordOrOtp)
    }

    #[inline]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Create from numeric ID
    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::None),
            1 => Some(Self::Password),
            2 => Some(Self::Otp),
            3 => Some(Self::PasswordOrOtp),
            _ => None,
        }
    }

    /// Create from string code
    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "none" => Some(Self::None),
            "password" => Some(Self::Password),
            "otp" => Some(Self::Otp),
            "password_or_otp" => Some(Self::PasswordOrOtp),
            _ => None,
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for mode in [
            AuthMode::None,
            AuthMode::Password,
            AuthMode::Otp,
            AuthMode::PasswordOrOtp,
        ] {
            assert_eq!(AuthMode::from_id(mode.id()), Some(mode));
            assert_eq!(AuthMode::from_code(mode.code()), Some(mode));
        }
        assert_eq!(AuthMode::from_id(9), None);
    }

    #[test]
    fn test_allowed_methods() {
        assert!(AuthMode::None.is_open());
        assert!(!AuthMode::None.allows_password());
        assert!(AuthMode::Password.allows_password());
        assert!(!AuthMode::Password.allows_otp());
        assert!(AuthMode::Otp.allows_otp());
        assert!(AuthMode::PasswordOrOtp.allows_password());
        assert!(AuthMode::PasswordOrOtp.allows_otp());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&AuthMode::PasswordOrOtp).unwrap(),
            "\"password_or_otp\""
        );
    }
}
