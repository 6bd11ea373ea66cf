//! Comment Body Value Object

use serde::Serialize;
use thiserror::Error;

/// Maximum body length in characters
pub const COMMENT_BODY_MAX_LENGTH: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommentBodyError {
    #[error("Comment cannot be empty")]
    Empty,

    #[error("Comment must be at most {COMMENT_BODY_MAX_LENGTH} characters")]
    TooLong,
}

/// Trimmed comment text with `\n` line endings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommentBody(String);

impl CommentBody {
    pub fn new(raw: &str) -> Result<Self, CommentBodyError> {
        let body = raw.replace("\r\n", "\n");
        let body = body.trim();

        if body.is_empty() {
            return Err(CommentBodyError::Empty);
        }
        if body.chars().count() > COMMENT_BODY_MAX_LENGTH {
            return Err(CommentBodyError::TooLong);
        }
        Ok(Self(body.to_string()))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
