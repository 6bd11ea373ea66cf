//! Asset Kind Value Object

use serde::{Deserialize, Serialize};
use std::fmt;

use review::domain::Video;

/// Which file of a video a token grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// The uploaded file
    Original,
    /// Streaming rendition; the original stands in until one exists
    #[default]
    Preview,
    Thumbnail,
}

impl AssetKind {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Preview => "preview",
            Self::Thumbnail => "thumbnail",
        }
    }

    /// Storage path of this asset, if the video has it
    pub fn path_in<'a>(&self, video: &'a Video) -> Option<&'a str> {
        match self {
            Self::Original => Some(video.original_path.as_str()),
            Self::Preview => video
                .preview_path
                .as_deref()
                .or(Some(video.original_path.as_str())),
            Self::Thumbnail => video.thumbnail_path.as_deref(),
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::ProjectId;
    use review::domain::VideoName;

    fn video() -> Video {
        Video::new(
            ProjectId::new(),
            VideoName::new("Hero").unwrap(),
            1,
            None,
            "hero.mp4",
            "video/mp4",
            None,
        )
    }

    #[test]
    fn test_preview_falls_back_to_original() {
        let mut v = video();
        assert_eq!(AssetKind::Preview.path_in(&v), Some(v.original_path.as_str()));

        v.preview_path = Some("p/preview.mp4".to_string());
        assert_eq!(AssetKind::Preview.path_in(&v), Some("p/preview.mp4"));
    }

    #[test]
    fn test_thumbnail_has_no_fallback() {
        assert_eq!(AssetKind::Thumbnail.path_in(&video()), None);
    }
}
