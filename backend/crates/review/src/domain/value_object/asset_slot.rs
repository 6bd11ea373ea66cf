//! Asset Slot Value Object
//!
//! Derived files an external worker produces for a video.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetSlot {
    /// Web-friendly transcode
    Preview,

    /// Poster image
    Thumbnail,
}

impl AssetSlot {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Thumbnail => "thumbnail",
        }
    }

    /// Whether an uploaded file of this MIME type fits the slot
    pub fn accepts(&self, mime_type: &str) -> bool {
        let mime = mime_type.trim().to_ascii_lowercase();
        match self {
            Self::Preview => mime.starts_with("video/"),
            Self::Thumbnail => mime.starts_with("image/"),
        }
    }
}

impl fmt::Display for AssetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_by_mime_family() {
        assert!(AssetSlot::Preview.accepts("video/mp4"));
        assert!(!AssetSlot::Preview.accepts("image/jpeg"));
        assert!(AssetSlot::Thumbnail.accepts("Image/JPEG"));
        assert!(!AssetSlot::Thumbnail.accepts("application/octet-stream"));
    }

    #[test]
    fn test_path_param_form() {
        let slot: AssetSlot = serde_json::from_str("\"thumbnail\"").unwrap();
        assert_eq!(slot, AssetSlot::Thumbnail);
        assert_eq!(slot.to_string(), "thumbnail");
    }
}
