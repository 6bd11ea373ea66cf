//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::email::Email;
use kernel::id::{AdminId, CommentId, ProjectId, ShareSessionId, VideoId};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entity::{comment::Comment, video::Video};
use crate::domain::repository::{CommentRepository, VideoRepository};
use crate::domain::value_object::{
    annotation::Annotation, author_kind::AuthorKind, comment_body::CommentBody,
    timecode::Timecode, video_name::VideoName,
};
use crate::error::{ReviewError, ReviewResult};

/// PostgreSQL-backed review repository
#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

const VIDEO_COLUMNS: &str = r#"
    video_id,
    project_id,
    name,
    version,
    version_label,
    original_path,
    preview_path,
    thumbnail_path,
    original_filename,
    mime_type,
    size_bytes,
    approved_at,
    approved_by,
    uploaded_by,
    created_at
"#;

const COMMENT_COLUMNS: &str = r#"
    comment_id,
    project_id,
    video_id,
    parent_id,
    author_kind,
    author_name,
    author_email,
    share_session_id,
    admin_id,
    body,
    timecode_ms,
    annotation,
    created_at
"#;

// ============================================================================
// Video Repository Implementation
// ============================================================================

impl VideoRepository for PgReviewRepository {
    async fn create_video(&self, video: &Video) -> ReviewResult<()> {
        sqlx::query(&format!(
            "INSERT INTO videos ({VIDEO_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)"
        ))
        .bind(video.video_id.as_uuid())
        .bind(video.project_id.as_uuid())
        .bind(video.name.as_str())
        .bind(video.version)
        .bind(&video.version_label)
        .bind(&video.original_path)
        .bind(&video.preview_path)
        .bind(&video.thumbnail_path)
        .bind(&video.original_filename)
        .bind(&video.mime_type)
        .bind(video.size_bytes)
        .bind(video.approved_at)
        .bind(&video.approved_by)
        .bind(video.uploaded_by.map(|id| *id.as_uuid()))
        .bind(video.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ReviewError::VersionConflict
            } else {
                ReviewError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find_video(&self, video_id: VideoId) -> ReviewResult<Option<Video>> {
        let row = sqlx::query_as::<_, VideoRow>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE video_id = $1"
        ))
        .bind(video_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(VideoRow::into_video))
    }

    async fn list_project_videos(&self, project_id: ProjectId) -> ReviewResult<Vec<Video>> {
        let rows = sqlx::query_as::<_, VideoRow>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE project_id = $1 \
             ORDER BY name ASC, version DESC"
        ))
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VideoRow::into_video).collect())
    }

    async fn latest_version(
        &self,
        project_id: ProjectId,
        name: &VideoName,
    ) -> ReviewResult<Option<i32>> {
        let version = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(version) FROM videos WHERE project_id = $1 AND name = $2",
        )
        .bind(project_id.as_uuid())
        .bind(name.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(version)
    }

    async fn update_video_assets(&self, video: &Video) -> ReviewResult<()> {
        sqlx::query(
            r#"
            UPDATE videos SET
                preview_path = $2,
                thumbnail_path = $3
            WHERE video_id = $1
            "#,
        )
        .bind(video.video_id.as_uuid())
        .bind(&video.preview_path)
        .bind(&video.thumbnail_path)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_video_approval(&self, video: &Video) -> ReviewResult<()> {
        sqlx::query(
            r#"
            UPDATE videos SET
                approved_at = $2,
                approved_by = $3
            WHERE video_id = $1
            "#,
        )
        .bind(video.video_id.as_uuid())
        .bind(video.approved_at)
        .bind(&video.approved_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Comment Repository Implementation
// ============================================================================

impl CommentRepository for PgReviewRepository {
    async fn create_comment(&self, comment: &Comment) -> ReviewResult<()> {
        sqlx::query(&format!(
            "INSERT INTO comments ({COMMENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(comment.comment_id.as_uuid())
        .bind(comment.project_id.as_uuid())
        .bind(comment.video_id.as_uuid())
        .bind(comment.parent_id.map(|id| *id.as_uuid()))
        .bind(comment.author_kind.id())
        .bind(&comment.author_name)
        .bind(comment.author_email.as_ref().map(|e| e.as_str()))
        .bind(comment.share_session_id.map(|id| *id.as_uuid()))
        .bind(comment.admin_id.map(|id| *id.as_uuid()))
        .bind(comment.body.as_str())
        .bind(comment.timecode.map(|t| t.as_db()))
        .bind(comment.annotation.clone().map(Json))
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_comment(&self, comment_id: CommentId) -> ReviewResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = $1"
        ))
        .bind(comment_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CommentRow::into_comment).transpose()
    }

    async fn list_video_comments(&self, video_id: VideoId) -> ReviewResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE video_id = $1 ORDER BY created_at ASC"
        ))
        .bind(video_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CommentRow::into_comment).collect()
    }

    async fn delete_comment(&self, comment_id: CommentId) -> ReviewResult<bool> {
        // Replies go with it (ON DELETE CASCADE)
        let deleted = sqlx::query("DELETE FROM comments WHERE comment_id = $1")
            .bind(comment_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct VideoRow {
    video_id: Uuid,
    project_id: Uuid,
    name: String,
    version: i32,
    version_label: Option<String>,
    original_path: String,
    preview_path: Option<String>,
    thumbnail_path: Option<String>,
    original_filename: String,
    mime_type: String,
    size_bytes: i64,
    approved_at: Option<DateTime<Utc>>,
    approved_by: Option<String>,
    uploaded_by: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl VideoRow {
    fn into_video(self) -> Video {
        Video {
            video_id: VideoId::from_uuid(self.video_id),
            project_id: ProjectId::from_uuid(self.project_id),
            name: VideoName::from_db(self.name),
            version: self.version,
            version_label: self.version_label,
            original_path: self.original_path,
            preview_path: self.preview_path,
            thumbnail_path: self.thumbnail_path,
            original_filename: self.original_filename,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
            approved_at: self.approved_at,
            approved_by: self.approved_by,
            uploaded_by: self.uploaded_by.map(AdminId::from_uuid),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    comment_id: Uuid,
    project_id: Uuid,
    video_id: Uuid,
    parent_id: Option<Uuid>,
    author_kind: i16,
    author_name: String,
    author_email: Option<String>,
    share_session_id: Option<Uuid>,
    admin_id: Option<Uuid>,
    body: String,
    timecode_ms: Option<i32>,
    annotation: Option<Json<Annotation>>,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> ReviewResult<Comment> {
        let author_kind = AuthorKind::from_id(self.author_kind).ok_or_else(|| {
            ReviewError::Internal(format!("Invalid author kind: {}", self.author_kind))
        })?;

        Ok(Comment {
            comment_id: CommentId::from_uuid(self.comment_id),
            project_id: ProjectId::from_uuid(self.project_id),
            video_id: VideoId::from_uuid(self.video_id),
            parent_id: self.parent_id.map(CommentId::from_uuid),
            author_kind,
            author_name: self.author_name,
            author_email: self.author_email.map(Email::from_db),
            share_session_id: self.share_session_id.map(ShareSessionId::from_uuid),
            admin_id: self.admin_id.map(AdminId::from_uuid),
            body: CommentBody::from_db(self.body),
            timecode: self.timecode_ms.map(Timecode::from_db),
            annotation: self.annotation.map(|Json(a)| a),
            created_at: self.created_at,
        })
    }
}
