//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::email::Email;
use kernel::id::{AdminId, AdminSessionId};
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{admin_session::AdminSession, admin_user::AdminUser};
use crate::domain::repository::{AdminSessionRepository, AdminUserRepository};
use crate::error::{AdminError, AdminResult};

/// PostgreSQL-backed admin repository
#[derive(Clone)]
pub struct PgAdminRepository {
    pool: PgPool,
}

impl PgAdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired(&self) -> AdminResult<u64> {
        self.cleanup_expired_admin_sessions().await
    }
}

// ============================================================================
// Admin User Repository Implementation
// ============================================================================

impl AdminUserRepository for PgAdminRepository {
    async fn create_admin(&self, admin: &AdminUser) -> AdminResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_users (
                admin_id,
                email,
                display_name,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(admin.admin_id.as_uuid())
        .bind(admin.email.as_str())
        .bind(&admin.display_name)
        .bind(admin.password_hash.as_phc_string())
        .bind(admin.login_failed_count as i16)
        .bind(admin.last_failed_at)
        .bind(admin.locked_until)
        .bind(admin.last_login_at)
        .bind(admin.created_at)
        .bind(admin.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!(admin_id = %admin.admin_id, "Admin created");
        Ok(())
    }

    async fn find_admin_by_id(&self, admin_id: AdminId) -> AdminResult<Option<AdminUser>> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r#"
            SELECT
                admin_id,
                email,
                display_name,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                last_login_at,
                created_at,
                updated_at
            FROM admin_users
            WHERE admin_id = $1
            "#,
        )
        .bind(admin_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_admin()).transpose()
    }

    async fn find_admin_by_email(&self, email: &Email) -> AdminResult<Option<AdminUser>> {
        let row = sqlx::query_as::<_, AdminUserRow>(
            r#"
            SELECT
                admin_id,
                email,
                display_name,
                password_hash,
                login_failed_count,
                last_failed_at,
                locked_until,
                last_login_at,
                created_at,
                updated_at
            FROM admin_users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_admin()).transpose()
    }

    async fn update_admin(&self, admin: &AdminUser) -> AdminResult<()> {
        sqlx::query(
            r#"
            UPDATE admin_users SET
                display_name = $2,
                password_hash = $3,
                login_failed_count = $4,
                last_failed_at = $5,
                locked_until = $6,
                last_login_at = $7,
                updated_at = $8
            WHERE admin_id = $1
            "#,
        )
        .bind(admin.admin_id.as_uuid())
        .bind(&admin.display_name)
        .bind(admin.password_hash.as_phc_string())
        .bind(admin.login_failed_count as i16)
        .bind(admin.last_failed_at)
        .bind(admin.locked_until)
        .bind(admin.last_login_at)
        .bind(admin.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_admins(&self) -> AdminResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM admin_users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// ============================================================================
// Admin Session Repository Implementation
// ============================================================================

impl AdminSessionRepository for PgAdminRepository {
    async fn create_admin_session(&self, session: &AdminSession) -> AdminResult<()> {
        sqlx::query(
            r#"
            INSERT INTO admin_sessions (
                admin_session_id,
                admin_id,
                expires_at_ms,
                remember_me,
                client_fingerprint_hash,
                client_ip,
                user_agent,
                created_at,
                last_activity_at
            ) VALUES ($1, $2, $3, $4, $5, $6::inet, $7, $8, $9)
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.admin_id.as_uuid())
        .bind(session.expires_at_ms)
        .bind(session.remember_me)
        .bind(&session.client_fingerprint_hash)
        .bind(&session.client_ip)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_admin_session(
        &self,
        session_id: AdminSessionId,
    ) -> AdminResult<Option<AdminSession>> {
        let row = sqlx::query_as::<_, AdminSessionRow>(
            r#"
            SELECT
                admin_session_id,
                admin_id,
                expires_at_ms,
                remember_me,
                client_fingerprint_hash,
                host(client_ip) AS client_ip,
                user_agent,
                created_at,
                last_activity_at
            FROM admin_sessions
            WHERE admin_session_id = $1
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_session()))
    }

    async fn update_admin_session(&self, session: &AdminSession) -> AdminResult<()> {
        sqlx::query(
            r#"
            UPDATE admin_sessions SET
                expires_at_ms = $2,
                last_activity_at = $3
            WHERE admin_session_id = $1
            "#,
        )
        .bind(session.session_id.as_uuid())
        .bind(session.expires_at_ms)
        .bind(session.last_activity_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_admin_session(&self, session_id: AdminSessionId) -> AdminResult<()> {
        sqlx::query("DELETE FROM admin_sessions WHERE admin_session_id = $1")
            .bind(session_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired_admin_sessions(&self) -> AdminResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM admin_sessions WHERE expires_at_ms < $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired admin sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AdminUserRow {
    admin_id: Uuid,
    email: String,
    display_name: Option<String>,
    password_hash: String,
    login_failed_count: i16,
    last_failed_at: Option<DateTime<Utc>>,
    locked_until: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AdminUserRow {
    fn into_admin(self) -> AdminResult<AdminUser> {
        let password_hash = HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AdminError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(AdminUser {
            admin_id: AdminId::from_uuid(self.admin_id),
            email: Email::from_db(self.email),
            display_name: self.display_name,
            password_hash,
            login_failed_count: self.login_failed_count.max(0) as u16,
            last_failed_at: self.last_failed_at,
            locked_until: self.locked_until,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AdminSessionRow {
    admin_session_id: Uuid,
    admin_id: Uuid,
    expires_at_ms: i64,
    remember_me: bool,
    client_fingerprint_hash: Vec<u8>,
    client_ip: Option<String>,
    user_agent: Option<String>,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl AdminSessionRow {
    fn into_session(self) -> AdminSession {
        AdminSession {
            session_id: AdminSessionId::from_uuid(self.admin_session_id),
            admin_id: AdminId::from_uuid(self.admin_id),
            expires_at_ms: self.expires_at_ms,
            remember_me: self.remember_me,
            client_fingerprint_hash: self.client_fingerprint_hash,
            client_ip: self.client_ip,
            user_agent: self.user_agent,
            created_at: self.created_at,
            last_activity_at: self.last_activity_at,
        }
    }
}
