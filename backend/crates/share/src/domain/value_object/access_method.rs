//! Access Method Value Object
//!
//! How a particular share session was obtained. Permissions hang off it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Way a share session was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum AccessMethod {
    /// Project without authentication
    Open = 0,
    /// Shared project password
    Password = 1,
    /// One-time code, bound to a recipient email
    Otp = 2,
    /// Guest link, view only
    Guest = 3,
    /// Admin preview of the share page
    Admin = 4,
}

impl AccessMethod {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Password => "password",
            Self::Otp => "otp",
            Self::Guest => "guest",
            Self::Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_guest(&self) -> bool {
        matches!(self, Self::Guest)
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Guests only watch; everyone else may comment, approve and download
    #[inline]
    pub const fn can_interact(&self) -> bool {
        !self.is_guest()
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Open),
            1 => Some(Self::Password),
            2 => Some(Self::Otp),
            3 => Some(Self::Guest),
            4 => Some(Self::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for AccessMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
