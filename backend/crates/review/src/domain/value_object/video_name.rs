//! Video Name Value Object
//!
//! Versions of the same cut share one name; the name is what groups them.

use derive_more::Display;
use serde::Serialize;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Maximum name length in characters
pub const VIDEO_NAME_MAX_LENGTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VideoNameError {
    #[error("Video name is required")]
    Empty,

    #[error("Video name must be at most {VIDEO_NAME_MAX_LENGTH} characters")]
    TooLong,

    #[error("Video name must not contain control characters")]
    ControlCharacter,
}

/// Logical video name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct VideoName(String);

impl VideoName {
    /// NFC-normalize, trim and validate
    pub fn new(raw: &str) -> Result<Self, VideoNameError> {
        let name: String = raw.nfc().collect();
        let name = name.trim();

        if name.is_empty() {
            return Err(VideoNameError::Empty);
        }
        if name.chars().count() > VIDEO_NAME_MAX_LENGTH {
            return Err(VideoNameError::TooLong);
        }
        if name.chars().any(char::is_control) {
            return Err(VideoNameError::ControlCharacter);
        }

        Ok(Self(name.to_string()))
    }

    /// Restore from the database without validation
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
