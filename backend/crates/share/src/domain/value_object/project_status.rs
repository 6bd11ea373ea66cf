//! Project Status Value Object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Review lifecycle of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum ProjectStatus {
    /// Client is reviewing
    #[default]
    InReview = 0,

    /// Every latest version has been approved
    Approved = 1,

    /// Share link disabled, all sessions invalid
    Archived = 2,
}

impl ProjectStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InReview => "in_review",
            Self::Approved => "approved",
            Self::Archived => "archived",
        }
    }

    #[inline]
    pub const fn is_archived(&self) -> bool {
        matches!(self, Self::Archived)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::InReview),
            1 => Some(Self::Approved),
            2 => Some(Self::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ProjectStatus::default(), ProjectStatus::InReview);
        assert_eq!(ProjectStatus::Archived.code(), "archived");
        assert_eq!(ProjectStatus::from_id(1), Some(ProjectStatus::Approved));
        assert_eq!(ProjectStatus::from_id(3), None);
        assert!(ProjectStatus::Archived.is_archived());
    }
}
