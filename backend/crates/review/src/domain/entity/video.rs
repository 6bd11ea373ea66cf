//! Video Entity
//!
//! One uploaded version of a named cut. Versions of a name are numbered
//! from 1 upward within the project.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kernel::id::{AdminId, ProjectId, VideoId};

use crate::domain::value_object::{asset_slot::AssetSlot, video_name::VideoName};

/// Maximum version label length
pub const VERSION_LABEL_MAX_LENGTH: usize = 100;

/// Video entity
#[derive(Debug, Clone)]
pub struct Video {
    pub video_id: VideoId,
    pub project_id: ProjectId,
    pub name: VideoName,
    pub version: i32,
    /// Free-form label such as "Colour pass"
    pub version_label: Option<String>,
    /// Storage-relative path of the uploaded file
    pub original_path: String,
    pub preview_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub original_filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub approved_at: Option<DateTime<Utc>>,
    /// Who approved (recipient email or access method)
    pub approved_by: Option<String>,
    pub uploaded_by: Option<AdminId>,
    pub created_at: DateTime<Utc>,
}

impl Video {
    /// New version, not yet persisted; the original lands at
    /// `projects/{project}/videos/{video}/original.{ext}`
    pub fn new(
        project_id: ProjectId,
        name: VideoName,
        version: i32,
        version_label: Option<&str>,
        original_filename: &str,
        mime_type: &str,
        uploaded_by: Option<AdminId>,
    ) -> Self {
        let video_id = VideoId::new();
        let ext = file_extension(original_filename, mime_type);

        Self {
            video_id,
            project_id,
            name,
            version,
            version_label: normalize_label(version_label),
            original_path: format!("{}/original.{ext}", storage_dir(project_id, video_id)),
            preview_path: None,
            thumbnail_path: None,
            original_filename: sanitize_filename(original_filename),
            mime_type: mime_type.trim().to_ascii_lowercase(),
            size_bytes: 0,
            approved_at: None,
            approved_by: None,
            uploaded_by,
            created_at: Utc::now(),
        }
    }

    /// Storage path for a derived asset
    pub fn asset_path(&self, slot: AssetSlot, file_name: &str, mime_type: &str) -> String {
        format!(
            "{}/{}.{}",
            storage_dir(self.project_id, self.video_id),
            slot.code(),
            file_extension(file_name, mime_type)
        )
    }

    pub fn slot_path(&self, slot: AssetSlot) -> Option<&str> {
        match slot {
            AssetSlot::Preview => self.preview_path.as_deref(),
            AssetSlot::Thumbnail => self.thumbnail_path.as_deref(),
        }
    }

    /// Point a slot at a new file, returning the previous path
    pub fn set_slot_path(&mut self, slot: AssetSlot, path: String) -> Option<String> {
        let target = match slot {
            AssetSlot::Preview => &mut self.preview_path,
            AssetSlot::Thumbnail => &mut self.thumbnail_path,
        };
        target.replace(path)
    }

    #[inline]
    pub fn is_approved(&self) -> bool {
        self.approved_at.is_some()
    }

    /// Returns whether the state changed
    pub fn approve(&mut self, approved_by: Option<String>) -> bool {
        if self.is_approved() {
            return false;
        }
        self.approved_at = Some(Utc::now());
        self.approved_by = approved_by;
        true
    }

    /// Returns whether the state changed
    pub fn unapprove(&mut self) -> bool {
        if !self.is_approved() {
            return false;
        }
        self.approved_at = None;
        self.approved_by = None;
        true
    }
}

fn storage_dir(project_id: ProjectId, video_id: VideoId) -> String {
    format!("projects/{project_id}/videos/{video_id}")
}

fn normalize_label(label: Option<&str>) -> Option<String> {
    let label = label.map(str::trim).filter(|l| !l.is_empty())?;
    Some(label.chars().take(VERSION_LABEL_MAX_LENGTH).collect())
}

/// Keep the base name only, without control characters
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .take(255)
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Extension for the stored file: from the file name when sane,
/// else from the MIME subtype
pub fn file_extension(file_name: &str, mime_type: &str) -> String {
    let is_sane = |ext: &str| {
        !ext.is_empty() && ext.len() <= 10 && ext.bytes().all(|b| b.is_ascii_alphanumeric())
    };

    if let Some((_, ext)) = file_name.rsplit_once('.') {
        if is_sane(ext) {
            return ext.to_ascii_lowercase();
        }
    }

    let subtype = mime_type
        .split(';')
        .next()
        .and_then(|m| m.trim().split_once('/'))
        .map(|(_, sub)| sub.trim().to_ascii_lowercase());
    match subtype.as_deref() {
        Some("quicktime") => "mov".to_string(),
        Some("jpeg") => "jpg".to_string(),
        Some(sub) if is_sane(sub) => sub.to_string(),
        _ => "bin".to_string(),
    }
}

/// Highest version number per name
pub fn latest_versions(videos: &[Video]) -> HashMap<VideoName, i32> {
    let mut latest: HashMap<VideoName, i32> = HashMap::new();
    for video in videos {
        let entry = latest.entry(video.name.clone()).or_insert(video.version);
        if video.version > *entry {
            *entry = video.version;
        }
    }
    latest
}

/// Names alphabetical, newest version first within a name
pub fn sort_for_listing(videos: &mut [Video]) {
    videos.sort_by(|a, b| a.name.cmp(&b.name).then(b.version.cmp(&a.version)));
}

/// Whether every name's latest version is approved (false for no videos)
pub fn all_latest_approved(videos: &[Video]) -> bool {
    let latest = latest_versions(videos);
    !latest.is_empty()
        && videos
            .iter()
            .filter(|v| latest.get(&v.name) == Some(&v.version))
            .all(Video::is_approved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(name: &str, version: i32) -> Video {
        Video::new(
            ProjectId::new(),
            VideoName::new(name).unwrap(),
            version,
            None,
            "hero.MP4",
            "video/mp4",
            None,
        )
    }

    #[test]
    fn test_original_path_layout() {
        let v = video("Hero", 1);
        assert_eq!(
            v.original_path,
            format!("projects/{}/videos/{}/original.mp4", v.project_id, v.video_id)
        );
        assert_eq!(
            v.asset_path(AssetSlot::Thumbnail, "poster", "image/jpeg"),
            format!("projects/{}/videos/{}/thumbnail.jpg", v.project_id, v.video_id)
        );
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("cut.MOV", "video/quicktime"), "mov");
        assert_eq!(file_extension("noext", "video/quicktime"), "mov");
        assert_eq!(file_extension("weird.ex/t", "video/webm"), "webm");
        assert_eq!(file_extension("x", "application/x-what+ever"), "bin");
    }

    #[test]
    fn test_filename_sanitized() {
        let v = Video::new(
            ProjectId::new(),
            VideoName::new("Hero").unwrap(),
            1,
            Some("  "),
            "C:\\Users\\ed\\final\u{0}.mp4",
            "video/mp4",
            None,
        );
        assert_eq!(v.original_filename, "final.mp4");
        assert_eq!(v.version_label, None);
    }

    #[test]
    fn test_approve_unapprove() {
        let mut v = video("Hero", 1);
        assert!(v.approve(Some("producer@client.com".into())));
        assert!(!v.approve(None));
        assert_eq!(v.approved_by.as_deref(), Some("producer@client.com"));
        assert!(v.unapprove());
        assert!(!v.unapprove());
        assert!(v.approved_by.is_none());
    }

    #[test]
    fn test_latest_and_sorting() {
        let mut videos = vec![video("Teaser", 1), video("Hero", 1), video("Hero", 2)];
        sort_for_listing(&mut videos);
        let order: Vec<_> = videos
            .iter()
            .map(|v| (v.name.as_str().to_string(), v.version))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Hero".to_string(), 2),
                ("Hero".to_string(), 1),
                ("Teaser".to_string(), 1)
            ]
        );

        let latest = latest_versions(&videos);
        assert_eq!(latest[&VideoName::new("Hero").unwrap()], 2);
    }

    #[test]
    fn test_all_latest_approved() {
        assert!(!all_latest_approved(&[]));

        let mut videos = vec![video("Hero", 1), video("Hero", 2), video("Teaser", 1)];
        videos[1].approve(None);
        assert!(!all_latest_approved(&videos));
        videos[2].approve(None);
        // v1 of Hero is superseded and does not count
        assert!(all_latest_approved(&videos));
    }
}
