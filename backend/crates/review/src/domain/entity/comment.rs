//! Comment Entity
//!
//! Feedback on a video, optionally pinned to a timecode and carrying a
//! drawing. Threads are one level deep: replies point at a top-level
//! comment of the same video.

use chrono::{DateTime, Utc};
use kernel::email::Email;
use kernel::id::{AdminId, CommentId, ProjectId, ShareSessionId, VideoId};
use thiserror::Error;

use crate::domain::entity::video::Video;
use crate::domain::value_object::{
    annotation::Annotation, author_kind::AuthorKind, comment_body::CommentBody,
    timecode::Timecode,
};

/// Maximum author name length
pub const AUTHOR_NAME_MAX_LENGTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommentError {
    #[error("Replies must target a top-level comment on the same video")]
    InvalidParent,

    #[error("An annotation needs a timecode")]
    AnnotationWithoutTimecode,

    #[error("Name must be between 1 and {AUTHOR_NAME_MAX_LENGTH} characters")]
    InvalidAuthorName,
}

/// Identity recorded with a comment
#[derive(Debug, Clone)]
pub struct CommentAuthor {
    pub kind: AuthorKind,
    pub name: String,
    pub email: Option<Email>,
    pub share_session_id: Option<ShareSessionId>,
    pub admin_id: Option<AdminId>,
}

impl CommentAuthor {
    /// A share-page viewer
    pub fn client(name: String, email: Option<Email>, session_id: ShareSessionId) -> Self {
        Self {
            kind: AuthorKind::Client,
            name,
            email,
            share_session_id: Some(session_id),
            admin_id: None,
        }
    }

    /// Staff, optionally through a preview session
    pub fn admin(admin_id: AdminId, name: String, session_id: Option<ShareSessionId>) -> Self {
        Self {
            kind: AuthorKind::Admin,
            name,
            email: None,
            share_session_id: session_id,
            admin_id: Some(admin_id),
        }
    }
}

/// Comment entity
#[derive(Debug, Clone)]
pub struct Comment {
    pub comment_id: CommentId,
    pub project_id: ProjectId,
    pub video_id: VideoId,
    pub parent_id: Option<CommentId>,
    pub author_kind: AuthorKind,
    pub author_name: String,
    pub author_email: Option<Email>,
    /// Share session that wrote it; only that session may delete it
    pub share_session_id: Option<ShareSessionId>,
    pub admin_id: Option<AdminId>,
    pub body: CommentBody,
    pub timecode: Option<Timecode>,
    pub annotation: Option<Annotation>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        video: &Video,
        parent: Option<&Comment>,
        author: CommentAuthor,
        body: CommentBody,
        timecode: Option<Timecode>,
        annotation: Option<Annotation>,
    ) -> Result<Self, CommentError> {
        if let Some(parent) = parent {
            if parent.is_reply() || parent.video_id != video.video_id {
                return Err(CommentError::InvalidParent);
            }
        }
        if annotation.is_some() && timecode.is_none() {
            return Err(CommentError::AnnotationWithoutTimecode);
        }

        Ok(Self {
            comment_id: CommentId::new(),
            project_id: video.project_id,
            video_id: video.video_id,
            parent_id: parent.map(|p| p.comment_id),
            author_kind: author.kind,
            author_name: author.name,
            author_email: author.email,
            share_session_id: author.share_session_id,
            admin_id: author.admin_id,
            body,
            timecode,
            annotation,
            created_at: Utc::now(),
        })
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn written_by(&self, session_id: ShareSessionId) -> bool {
        self.share_session_id == Some(session_id)
    }
}

/// Trim and bound a display name
pub fn normalize_author_name(name: &str) -> Result<String, CommentError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > AUTHOR_NAME_MAX_LENGTH || name.chars().any(char::is_control) {
        return Err(CommentError::InvalidAuthorName);
    }
    Ok(name.to_string())
}

/// A top-level comment with its replies
#[derive(Debug, Clone)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Group comments into threads, oldest first at both levels
///
/// Replies whose parent is missing are dropped.
pub fn build_threads(mut comments: Vec<Comment>) -> Vec<CommentThread> {
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let (top_level, replies): (Vec<_>, Vec<_>) =
        comments.into_iter().partition(|c| !c.is_reply());

    let mut threads: Vec<CommentThread> = top_level
        .into_iter()
        .map(|comment| CommentThread {
            comment,
            replies: Vec::new(),
        })
        .collect();

    for reply in replies {
        if let Some(thread) = threads
            .iter_mut()
            .find(|t| Some(t.comment.comment_id) == reply.parent_id)
        {
            thread.replies.push(reply);
        }
    }
    threads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::video_name::VideoName;

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

    fn author() -> CommentAuthor {
        CommentAuthor::client("Dana".to_string(), None, ShareSessionId::new())
    }

    fn comment(video: &Video, parent: Option<&Comment>, text: &str) -> Comment {
        Comment::new(
            video,
            parent,
            author(),
            CommentBody::new(text).unwrap(),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_reply_rules() {
        let v = video();
        let top = comment(&v, None, "Too dark");
        let reply = comment(&v, Some(&top), "Agreed");
        assert_eq!(reply.parent_id, Some(top.comment_id));

        let nested = Comment::new(
            &v,
            Some(&reply),
            author(),
            CommentBody::new("Deeper").unwrap(),
            None,
            None,
        );
        assert_eq!(nested.unwrap_err(), CommentError::InvalidParent);

        let other = video();
        let cross = Comment::new(
            &other,
            Some(&top),
            author(),
            CommentBody::new("Wrong video").unwrap(),
            None,
            None,
        );
        assert_eq!(cross.unwrap_err(), CommentError::InvalidParent);
    }

    #[test]
    fn test_annotation_needs_timecode() {
        let v = video();
        let annotation = Annotation::from_json(serde_json::json!({
            "shapes": [{ "kind": "freehand", "color": "#ffffff", "points": [{"x": 0.5, "y": 0.5}] }]
        }))
        .unwrap();

        let result = Comment::new(
            &v,
            None,
            author(),
            CommentBody::new("Here").unwrap(),
            None,
            Some(annotation.clone()),
        );
        assert_eq!(result.unwrap_err(), CommentError::AnnotationWithoutTimecode);

        let ok = Comment::new(
            &v,
            None,
            author(),
            CommentBody::new("Here").unwrap(),
            Some(Timecode::from_millis(4_000).unwrap()),
            Some(annotation),
        );
        assert!(ok.is_ok());
    }

    #[test]
    fn test_author_name() {
        assert_eq!(normalize_author_name("  Dana ").unwrap(), "Dana");
        assert!(normalize_author_name("").is_err());
        assert!(normalize_author_name(&"n".repeat(AUTHOR_NAME_MAX_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_build_threads() {
        let v = video();
        let first = comment(&v, None, "First");
        let mut second = comment(&v, None, "Second");
        second.created_at = first.created_at + chrono::Duration::seconds(5);
        let mut reply = comment(&v, Some(&first), "Reply");
        reply.created_at = first.created_at + chrono::Duration::seconds(10);
        let mut orphan = comment(&v, Some(&first), "Orphan");
        orphan.parent_id = Some(CommentId::new());

        let threads = build_threads(vec![reply, second, orphan, first.clone()]);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.comment_id, first.comment_id);
        assert_eq!(threads[0].replies.len(), 1);
        assert!(threads[1].replies.is_empty());
    }
}
