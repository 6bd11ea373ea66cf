//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::email::Email;
use kernel::id::{AdminId, OtpChallengeId, ProjectId, RecipientId, ShareSessionId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    otp_challenge::OtpChallenge, project::Project, recipient::Recipient,
    share_session::ShareSession,
};
use crate::domain::repository::{
    OtpChallengeRepository, ProjectRepository, RecipientRepository, ShareSessionRepository,
};
use crate::domain::value_object::{
    access_method::AccessMethod, auth_mode::AuthMode, project_status::ProjectStatus,
    share_password::SharePassword, share_slug::ShareSlug,
};
use crate::error::{ShareError, ShareResult};

/// PostgreSQL-backed share repository
#[derive(Clone)]
pub struct PgShareRepository {
    pool: PgPool,
}

impl PgShareRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired sessions and OTP challenges
    pub async fn cleanup_expired(&self) -> ShareResult<(u64, u64)> {
        let sessions = self.cleanup_expired_share_sessions().await?;
        let challenges = self.cleanup_expired_otp_challenges().await?;
        Ok((sessions, challenges))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

const PROJECT_COLUMNS: &str = r#"
    project_id,
    slug,
    title,
    description,
    auth_mode,
    share_password_hash,
    guest_mode,
    guest_latest_only,
    allow_downloads,
    auth_version,
    status,
    created_by,
    created_at,
    updated_at
"#;

const SESSION_COLUMNS: &str = r#"
    share_session_id,
    project_id,
    access_method,
    recipient_email,
    admin_id,
    auth_version,
    expires_at_ms,
    client_fingerprint_hash,
    host(client_ip) AS client_ip,
    user_agent,
    created_at,
    last_activity_at,
    revoked_at
"#;

// ============================================================================
// Project Repository Implementation
// ============================================================================

impl ProjectRepository for PgShareRepository {
    async fn create_project(&self, project: &Project) -> ShareResult<()> {
        sqlx::query(
            r#"
            INSERT INTO projects (
                project_id,
                slug,
                title,
                description,
                auth_mode,
                share_password_hash,
                guest_mode,
                guest_latest_only,
                allow_downloads,
                auth_version,
                status,
                created_by,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(project.project_id.as_uuid())
        .bind(project.slug.as_str())
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.auth_mode.id())
        .bind(project.share_password.as_ref().map(|p| p.as_phc_string()))
        .bind(project.guest_mode)
        .bind(project.guest_latest_only)
        .bind(project.allow_downloads)
        .bind(project.auth_version)
        .bind(project.status.id())
        .bind(project.created_by.map(|id| *id.as_uuid()))
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ShareError::SlugTaken
            } else {
                ShareError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find_project_by_id(&self, project_id: ProjectId) -> ShareResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE project_id = $1"
        ))
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_project()).transpose()
    }

    async fn find_project_by_slug(&self, slug: &ShareSlug) -> ShareResult<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE slug = $1"
        ))
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_project()).transpose()
    }

    async fn list_projects(&self) -> ShareResult<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_project()).collect()
    }

    async fn update_project(&self, project: &Project) -> ShareResult<()> {
        sqlx::query(
            r#"
            UPDATE projects SET
                title = $2,
                description = $3,
                auth_mode = $4,
                share_password_hash = $5,
                guest_mode = $6,
                guest_latest_only = $7,
                allow_downloads = $8,
                updated_at = $9
            WHERE project_id = $1
            "#,
        )
        .bind(project.project_id.as_uuid())
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.auth_mode.id())
        .bind(project.share_password.as_ref().map(|p| p.as_phc_string()))
        .bind(project.guest_mode)
        .bind(project.guest_latest_only)
        .bind(project.allow_downloads)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn bump_auth_version(&self, project_id: ProjectId) -> ShareResult<Option<i32>> {
        let version = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE projects SET auth_version = auth_version + 1, updated_at = NOW()
            WHERE project_id = $1
            RETURNING auth_version
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(version)
    }

    async fn update_project_status(
        &self,
        project_id: ProjectId,
        status: ProjectStatus,
    ) -> ShareResult<Option<i32>> {
        let version = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE projects SET
                auth_version = auth_version
                    + CASE WHEN $2 = $3 AND status <> $3 THEN 1 ELSE 0 END,
                status = $2,
                updated_at = NOW()
            WHERE project_id = $1
            RETURNING auth_version
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(status.id())
        .bind(ProjectStatus::Archived.id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(version)
    }

    async fn set_project_status(
        &self,
        project_id: ProjectId,
        status: ProjectStatus,
    ) -> ShareResult<()> {
        // Archiving goes through update_project_status so auth_version moves with it
        sqlx::query(
            r#"
            UPDATE projects SET status = $2, updated_at = NOW()
            WHERE project_id = $1 AND status <> $3
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(status.id())
        .bind(ProjectStatus::Archived.id())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// ============================================================================
// Recipient Repository Implementation
// ============================================================================

impl RecipientRepository for PgShareRepository {
    async fn add_recipient(&self, recipient: &Recipient) -> ShareResult<()> {
        sqlx::query(
            r#"
            INSERT INTO project_recipients (
                recipient_id,
                project_id,
                email,
                display_name,
                created_at
            ) VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(recipient.recipient_id.as_uuid())
        .bind(recipient.project_id.as_uuid())
        .bind(recipient.email.as_str())
        .bind(&recipient.display_name)
        .bind(recipient.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ShareError::RecipientExists
            } else {
                ShareError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find_recipient(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> ShareResult<Option<Recipient>> {
        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT recipient_id, project_id, email, display_name, created_at
            FROM project_recipients
            WHERE project_id = $1 AND email = $2
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RecipientRow::into_recipient))
    }

    async fn list_recipients(&self, project_id: ProjectId) -> ShareResult<Vec<Recipient>> {
        let rows = sqlx::query_as::<_, RecipientRow>(
            r#"
            SELECT recipient_id, project_id, email, display_name, created_at
            FROM project_recipients
            WHERE project_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RecipientRow::into_recipient).collect())
    }

    async fn remove_recipient(
        &self,
        project_id: ProjectId,
        recipient_id: RecipientId,
    ) -> ShareResult<Option<Recipient>> {
        let row = sqlx::query_as::<_, RecipientRow>(
            r#"
            DELETE FROM project_recipients
            WHERE project_id = $1 AND recipient_id = $2
            RETURNING recipient_id, project_id, email, display_name, created_at
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(recipient_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RecipientRow::into_recipient))
    }
}

// ============================================================================
// Share Session Repository Implementation
// ============================================================================

impl ShareSessionRepository for PgShareRepository {
    async fn create_share_session(&self, session: &ShareSession) -> ShareResult<()> {
        sqlx::query(
            r#"
            INSERT INTO share_sessions (
                share_session_id,
                project_id,
                access_method,
                recipient_email,
                admin_id,
                auth_version,
                expires_at_ms,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at,
                revoked_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9::inet, $10, $11, $12, $13)
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.project_id.as_uuid())
        .bind(session.access_method.id())
        .bind(session.recipient_email.as_ref().map(|e| e.as_str()))
        .bind(session.admin_id.map(|id| *id.as_uuid()))
        .bind(session.auth_version)
        .bind(session.expires_at_ms)
        .bind(&session.client_fingerprint_hash)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .bind(session.revoked_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_share_session(
        &self,
        session_id: ShareSessionId,
    ) -> ShareResult<Option<ShareSession>> {
        let row = sqlx::query_as::<_, ShareSessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM share_sessions WHERE share_session_id = $1"
        ))
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_session()).transpose()
    }

    async fn touch_share_session(&self, session: &ShareSession) -> ShareResult<()> {
        sqlx::query(
            "UPDATE share_sessions SET last_activity_at = $2 WHERE share_session_id = $1",
        )
        .bind(session.session_id.as_uuid())
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke_share_session(&self, session_id: ShareSessionId) -> ShareResult<()> {
        sqlx::query(
            r#"
            UPDATE share_sessions SET revoked_at = NOW()
            WHERE share_session_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(session_id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke_project_sessions(&self, project_id: ProjectId) -> ShareResult<u64> {
        let revoked = sqlx::query(
            r#"
            UPDATE share_sessions SET revoked_at = NOW()
            WHERE project_id = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(project_id.as_uuid())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(revoked)
    }

    async fn revoke_recipient_sessions(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> ShareResult<u64> {
        let revoked = sqlx::query(
            r#"
            UPDATE share_sessions SET revoked_at = NOW()
            WHERE project_id = $1 AND recipient_email = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(email.as_str())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(revoked)
    }

    async fn list_active_sessions(&self, project_id: ProjectId) -> ShareResult<Vec<ShareSession>> {
        let rows = sqlx::query_as::<_, ShareSessionRow>(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM share_sessions
            WHERE project_id = $1 AND revoked_at IS NULL AND expires_at_ms > $2
            ORDER BY created_at DESC
            "#
        ))
        .bind(project_id.as_uuid())
        .bind(Utc::now().timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_session()).collect()
    }

    async fn cleanup_expired_share_sessions(&self) -> ShareResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query(
            "DELETE FROM share_sessions WHERE expires_at_ms < $1 OR revoked_at IS NOT NULL",
        )
        .bind(now_ms)
        .execute(&self.pool)
        .await?
        .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired share sessions");

        Ok(deleted)
    }
}

// ============================================================================
// OTP Challenge Repository Implementation
// ============================================================================

impl OtpChallengeRepository for PgShareRepository {
    async fn replace_otp_challenge(&self, challenge: &OtpChallenge) -> ShareResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM otp_challenges WHERE project_id = $1 AND email = $2")
            .bind(challenge.project_id.as_uuid())
            .bind(challenge.email.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO otp_challenges (
                otp_challenge_id,
                project_id,
                email,
                code_hash,
                attempts,
                expires_at_ms,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(challenge.challenge_id.as_uuid())
        .bind(challenge.project_id.as_uuid())
        .bind(challenge.email.as_str())
        .bind(&challenge.code_hash)
        .bind(challenge.attempts)
        .bind(challenge.expires_at_ms)
        .bind(challenge.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_latest_otp_challenge(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> ShareResult<Option<OtpChallenge>> {
        let row = sqlx::query_as::<_, OtpChallengeRow>(
            r#"
            SELECT
                otp_challenge_id,
                project_id,
                email,
                code_hash,
                attempts,
                expires_at_ms,
                created_at
            FROM otp_challenges
            WHERE project_id = $1 AND email = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OtpChallengeRow::into_challenge))
    }

    async fn increment_otp_attempts(
        &self,
        challenge_id: OtpChallengeId,
    ) -> ShareResult<Option<i16>> {
        let attempts = sqlx::query_scalar::<_, i16>(
            r#"
            UPDATE otp_challenges SET attempts = attempts + 1
            WHERE otp_challenge_id = $1
            RETURNING attempts
            "#,
        )
        .bind(challenge_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempts)
    }

    async fn consume_otp_challenge(&self, challenge_id: OtpChallengeId) -> ShareResult<bool> {
        let deleted = sqlx::query("DELETE FROM otp_challenges WHERE otp_challenge_id = $1")
            .bind(challenge_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted == 1)
    }

    async fn cleanup_expired_otp_challenges(&self) -> ShareResult<u64> {
        let deleted = sqlx::query("DELETE FROM otp_challenges WHERE expires_at_ms < $1")
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(challenges_deleted = deleted, "Cleaned up expired OTP challenges");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct ProjectRow {
    project_id: Uuid,
    slug: String,
    title: String,
    description: Option<String>,
    auth_mode: i16,
    share_password_hash: Option<String>,
    guest_mode: bool,
    guest_latest_only: bool,
    allow_downloads: bool,
    auth_version: i32,
    status: i16,
    created_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self) -> ShareResult<Project> {
        let auth_mode = AuthMode::from_id(self.auth_mode)
            .ok_or_else(|| ShareError::Internal(format!("Invalid auth mode: {}", self.auth_mode)))?;
        let status = ProjectStatus::from_id(self.status)
            .ok_or_else(|| ShareError::Internal(format!("Invalid project status: {}", self.status)))?;
        let share_password = self
            .share_password_hash
            .map(SharePassword::from_phc_string)
            .transpose()
            .map_err(|e| ShareError::Internal(format!("Invalid share password hash: {e}")))?;

        Ok(Project {
            project_id: ProjectId::from_uuid(self.project_id),
            slug: ShareSlug::from_db(self.slug),
            title: self.title,
            description: self.description,
            auth_mode,
            share_password,
            guest_mode: self.guest_mode,
            guest_latest_only: self.guest_latest_only,
            allow_downloads: self.allow_downloads,
            auth_version: self.auth_version,
            status,
            created_by: self.created_by.map(AdminId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RecipientRow {
    recipient_id: Uuid,
    project_id: Uuid,
    email: String,
    display_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl RecipientRow {
    fn into_recipient(self) -> Recipient {
        Recipient {
            recipient_id: RecipientId::from_uuid(self.recipient_id),
            project_id: ProjectId::from_uuid(self.project_id),
            email: Email::from_db(self.email),
            display_name: self.display_name,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ShareSessionRow {
    share_session_id: Uuid,
    project_id: Uuid,
    access_method: i16,
    recipient_email: Option<String>,
    admin_id: Option<Uuid>,
    auth_version: i32,
    expires_at_ms: i64,
    client_fingerprint_hash: Vec<u8>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl ShareSessionRow {
    fn into_session(self) -> ShareResult<ShareSession> {
        let access_method = AccessMethod::from_id(self.access_method).ok_or_else(|| {
            ShareError::Internal(format!("Invalid access method: {}", self.access_method))
        })?;

        Ok(ShareSession {
            session_id: ShareSessionId::from_uuid(self.share_session_id),
            project_id: ProjectId::from_uuid(self.project_id),
            access_method,
            recipient_email: self.recipient_email.map(Email::from_db),
            admin_id: self.admin_id.map(AdminId::from_uuid),
            auth_version: self.auth_version,
            expires_at_ms: self.expires_at_ms,
            client_fingerprint_hash: self.client_fingerprint_hash,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
            revoked_at: self.revoked_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OtpChallengeRow {
    otp_challenge_id: Uuid,
    project_id: Uuid,
    email: String,
    code_hash: Vec<u8>,
    attempts: i16,
    expires_at_ms: i64,
    created_at: DateTime<Utc>,
}

impl OtpChallengeRow {
    fn into_challenge(self) -> OtpChallenge {
        OtpChallenge {
            challenge_id: OtpChallengeId::from_uuid(self.otp_challenge_id),
            project_id: ProjectId::from_uuid(self.project_id),
            email: Email::from_db(self.email),
            code_hash: self.code_hash,
            attempts: self.attempts,
            expires_at_ms: self.expires_at_ms,
            created_at: self.created_at,
        }
    }
}
