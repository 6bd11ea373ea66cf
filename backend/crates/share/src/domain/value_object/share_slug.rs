//! Share Slug Value Object
//!
//! 共有リンクの URL に現れるプロジェクト識別子。
//! `/s/{slug}` の形で顧客に渡される。
//!
//! ## 不変条件
//! - 長さ: 3〜64文字（正規化後）
//! - 使用可能文字: `a-z`, `0-9`, `-`
//! - 先頭・末尾のハイフン禁止、連続ハイフン禁止
//! - API ルートと衝突する予約語は使用不可

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Minimum slug length
pub const SHARE_SLUG_MIN_LENGTH: usize = 3;

/// Maximum slug length
pub const SHARE_SLUG_MAX_LENGTH: usize = 64;

/// Slugs that collide with static share routes
const RESERVED_SLUGS: &[&str] = &["session", "signout", "videos", "comments", "admin", "api"];

/// Error returned when slug validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareSlugError {
    TooShort { length: usize, min: usize },
    TooLong { length: usize, max: usize },
    InvalidCharacter { char: char, position: usize },
    HyphenAtEdge,
    ConsecutiveHyphens,
    Reserved { word: String },
}

impl fmt::Display for ShareSlugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort { length, min } => {
                write!(f, "Slug is too short ({length} chars, minimum {min})")
            }
            Self::TooLong { length, max } => {
                write!(f, "Slug is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => write!(
                f,
                "Invalid character '{char}' at position {position}. Only a-z, 0-9 and - are allowed"
            ),
            Self::HyphenAtEdge => write!(f, "Slug cannot start or end with a hyphen"),
            Self::ConsecutiveHyphens => write!(f, "Slug cannot contain consecutive hyphens"),
            Self::Reserved { word } => write!(f, "'{word}' is a reserved slug"),
        }
    }
}

impl std::error::Error for ShareSlugError {}

/// Validated, lower-cased share slug
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(try_from = "String", into = "String")]
#[display("{_0}")]
pub struct ShareSlug(String);

impl ShareSlug {
    /// Normalize (NFKC, trim, lowercase) and validate
    pub fn new(input: impl AsRef<str>) -> Result<Self, ShareSlugError> {
        let slug = input
            .as_ref()
            .nfkc()
            .collect::<String>()
            .trim()
            .to_lowercase();
        Self::validate(&slug)?;
        Ok(Self(slug))
    }

    /// Create from database value (assumes already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(slug: &str) -> Result<(), ShareSlugError> {
        let length = slug.chars().count();
        if length < SHARE_SLUG_MIN_LENGTH {
            return Err(ShareSlugError::TooShort {
                length,
                min: SHARE_SLUG_MIN_LENGTH,
            });
        }
        if length > SHARE_SLUG_MAX_LENGTH {
            return Err(ShareSlugError::TooLong {
                length,
                max: SHARE_SLUG_MAX_LENGTH,
            });
        }

        for (position, char) in slug.chars().enumerate() {
            if !(char.is_ascii_lowercase() || char.is_ascii_digit() || char == '-') {
                return Err(ShareSlugError::InvalidCharacter { char, position });
            }
        }

        if slug.starts_with('-') || slug.ends_with('-') {
            return Err(ShareSlugError::HyphenAtEdge);
        }
        if slug.contains("--") {
            return Err(ShareSlugError::ConsecutiveHyphens);
        }
        if RESERVED_SLUGS.contains(&slug) {
            return Err(ShareSlugError::Reserved {
                word: slug.to_string(),
            });
        }
        Ok(())
    }
}

impl TryFrom<String> for ShareSlug {
    type Error = ShareSlugError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShareSlug> for String {
    fn from(slug: ShareSlug) -> Self {
        slug.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_slugs() {
        assert_eq!(ShareSlug::new("spring-campaign").unwrap().as_str(), "spring-campaign");
        assert_eq!(ShareSlug::new("  Promo-2025 ").unwrap().as_str(), "promo-2025");
        assert_eq!(ShareSlug::new("ＡＢＣ").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_length_bounds() {
        assert!(matches!(
            ShareSlug::new("ab"),
            Err(ShareSlugError::TooShort { length: 2, .. })
        ));
        assert!(ShareSlug::new("a".repeat(64)).is_ok());
        assert!(matches!(
            ShareSlug::new("a".repeat(65)),
            Err(ShareSlugError::TooLong { .. })
        ));
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(matches!(
            ShareSlug::new("my_project"),
            Err(ShareSlugError::InvalidCharacter { char: '_', position: 2 })
        ));
        assert_eq!(ShareSlug::new("-cut"), Err(ShareSlugError::HyphenAtEdge));
        assert_eq!(ShareSlug::new("cut-"), Err(ShareSlugError::HyphenAtEdge));
        assert_eq!(ShareSlug::new("rough--cut"), Err(ShareSlugError::ConsecutiveHyphens));
        assert!(matches!(
            ShareSlug::new("Videos"),
            Err(ShareSlugError::Reserved { .. })
        ));
    }

    #[test]
    fn test_display_and_serde() {
        let slug = ShareSlug::new("final-cut").unwrap();
        assert_eq!(slug.to_string(), "final-cut");
        assert_eq!(serde_json::to_string(&slug).unwrap(), "\"final-cut\"");
        assert!(serde_json::from_str::<ShareSlug>("\"no spaces\"").is_err());
    }
}
