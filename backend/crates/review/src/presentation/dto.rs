//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use share::ShareViewer;
use share::domain::ProjectStatus;
use uuid::Uuid;

use crate::application::{ApprovalOutcome, ListedVideo, PostCommentInput};
use crate::domain::entity::{
    comment::{Comment, CommentThread},
    video::Video,
};
use crate::domain::value_object::{
    annotation::Annotation, asset_slot::AssetSlot, author_kind::AuthorKind,
};
use kernel::id::CommentId;

// ============================================================================
// Videos
// ============================================================================

/// Video response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub video_id: Uuid,
    pub name: String,
    pub version: i32,
    pub version_label: Option<String>,
    pub is_latest: bool,
    pub original_filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub has_preview: bool,
    pub has_thumbnail: bool,
    pub approved: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn new(video: &Video, is_latest: bool) -> Self {
        Self {
            video_id: *video.video_id.as_uuid(),
            name: video.name.to_string(),
            version: video.version,
            version_label: video.version_label.clone(),
            is_latest,
            original_filename: video.original_filename.clone(),
            mime_type: video.mime_type.clone(),
            size_bytes: video.size_bytes,
            has_preview: video.preview_path.is_some(),
            has_thumbnail: video.thumbnail_path.is_some(),
            approved: video.is_approved(),
            approved_at: video.approved_at,
            approved_by: video.approved_by.clone(),
            created_at: video.created_at,
        }
    }
}

impl From<&ListedVideo> for VideoResponse {
    fn from(listed: &ListedVideo) -> Self {
        Self::new(&listed.video, listed.is_latest)
    }
}

/// Query string of an upload (`?name=...&label=...&filename=...`)
#[derive(Debug, Clone, Deserialize)]
pub struct UploadQuery {
    pub name: String,
    pub label: Option<String>,
    pub filename: String,
}

/// Query string of an asset upload
#[derive(Debug, Clone, Deserialize)]
pub struct AssetQuery {
    pub filename: String,
}

/// Path of an asset upload
#[derive(Debug, Clone, Deserialize)]
pub struct AssetPath {
    pub video_id: Uuid,
    pub slot: AssetSlot,
}

/// Approval response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    pub video: VideoResponse,
    pub project_status: ProjectStatus,
}

impl From<ApprovalOutcome> for ApprovalResponse {
    fn from(outcome: ApprovalOutcome) -> Self {
        Self {
            // Approvals always target the version the client was looking at
            video: VideoResponse::new(&outcome.video, true),
            project_status: outcome.project_status,
        }
    }
}

// ============================================================================
// Comments
// ============================================================================

/// Comment post request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentRequest {
    pub body: String,
    pub timecode_ms: Option<i64>,
    pub annotation: Option<serde_json::Value>,
    pub parent_id: Option<Uuid>,
    pub author_name: Option<String>,
}

impl From<PostCommentRequest> for PostCommentInput {
    fn from(req: PostCommentRequest) -> Self {
        Self {
            body: req.body,
            timecode_ms: req.timecode_ms,
            annotation: req.annotation,
            parent_id: req.parent_id.map(CommentId::from_uuid),
            author_name: req.author_name,
        }
    }
}

/// Comment response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub comment_id: Uuid,
    pub video_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_kind: AuthorKind,
    pub author_name: String,
    /// Only shown to admins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    pub body: String,
    pub timecode_ms: Option<u32>,
    /// `HH:MM:SS.mmm`
    pub timecode: Option<String>,
    pub annotation: Option<Annotation>,
    pub can_delete: bool,
    pub created_at: DateTime<Utc>,
}

impl CommentResponse {
    fn base(comment: &Comment) -> Self {
        Self {
            comment_id: *comment.comment_id.as_uuid(),
            video_id: *comment.video_id.as_uuid(),
            parent_id: comment.parent_id.map(|id| *id.as_uuid()),
            author_kind: comment.author_kind,
            author_name: comment.author_name.clone(),
            author_email: None,
            body: comment.body.as_str().to_string(),
            timecode_ms: comment.timecode.map(|t| t.as_millis()),
            timecode: comment.timecode.map(|t| t.to_string()),
            annotation: comment.annotation.clone(),
            can_delete: false,
            created_at: comment.created_at,
        }
    }

    /// Viewer rendering: no emails; own comments are deletable
    pub fn for_viewer(comment: &Comment, viewer: &ShareViewer) -> Self {
        Self {
            can_delete: comment.written_by(viewer.session_id),
            ..Self::base(comment)
        }
    }

    pub fn for_admin(comment: &Comment) -> Self {
        Self {
            author_email: comment.author_email.as_ref().map(|e| e.to_string()),
            can_delete: true,
            ..Self::base(comment)
        }
    }
}

/// A top-level comment with its replies
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub replies: Vec<CommentResponse>,
}

impl ThreadResponse {
    pub fn for_viewer(thread: &CommentThread, viewer: &ShareViewer) -> Self {
        Self {
            comment: CommentResponse::for_viewer(&thread.comment, viewer),
            replies: thread
                .replies
                .iter()
                .map(|r| CommentResponse::for_viewer(r, viewer))
                .collect(),
        }
    }

    pub fn for_admin(thread: &CommentThread) -> Self {
        Self {
            comment: CommentResponse::for_admin(&thread.comment),
            replies: thread.replies.iter().map(CommentResponse::for_admin).collect(),
        }
    }
}
