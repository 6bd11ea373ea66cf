//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{
    CreateProjectInput, IssuedSession, ShareInfo, ShareSettingsInput, UpdateProjectInput,
};
use crate::domain::entity::{project::Project, recipient::Recipient, share_session::ShareSession};
use crate::domain::value_object::{
    access_method::AccessMethod, auth_mode::AuthMode, project_status::ProjectStatus,
};
use crate::domain::viewer::ShareViewer;

// ============================================================================
// Share Page (public)
// ============================================================================

/// Share info response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareInfoResponse {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub auth_mode: AuthMode,
    pub password_enabled: bool,
    pub otp_enabled: bool,
    pub guest_enabled: bool,
}

impl From<ShareInfo> for ShareInfoResponse {
    fn from(info: ShareInfo) -> Self {
        Self {
            slug: info.slug.to_string(),
            title: info.title,
            description: info.description,
            auth_mode: info.auth_mode,
            password_enabled: info.password_enabled,
            otp_enabled: info.otp_enabled,
            guest_enabled: info.guest_enabled,
        }
    }
}

/// Password request
#[derive(Clone, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

/// OTP request
#[derive(Debug, Clone, Deserialize)]
pub struct SendOtpRequest {
    pub email: String,
}

/// OTP request response (same for every address)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpResponse {
    pub message: &'static str,
    pub expires_in_secs: u64,
}

/// OTP verification request
#[derive(Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

/// Response for every successful access method
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    /// Also set as cookie; send as `Authorization: Bearer` when cookies are unavailable
    pub token: String,
    pub viewer: ViewerResponse,
}

impl From<IssuedSession> for AccessResponse {
    fn from(issued: IssuedSession) -> Self {
        Self {
            token: issued.token,
            viewer: ViewerResponse::from(&issued.viewer),
        }
    }
}

/// Current viewer
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerResponse {
    pub session_id: Uuid,
    pub project_id: Uuid,
    pub access_method: AccessMethod,
    pub recipient_email: Option<String>,
    pub can_comment: bool,
    pub can_approve: bool,
    pub can_download: bool,
    pub expires_at_ms: i64,
}

impl From<&ShareViewer> for ViewerResponse {
    fn from(viewer: &ShareViewer) -> Self {
        Self {
            session_id: *viewer.session_id.as_uuid(),
            project_id: *viewer.project_id.as_uuid(),
            access_method: viewer.method,
            recipient_email: viewer.recipient_email.as_ref().map(|e| e.to_string()),
            can_comment: viewer.method.can_interact(),
            can_approve: viewer.method.can_interact(),
            can_download: viewer.method.can_interact() && viewer.allow_downloads,
            expires_at_ms: viewer.expires_at_ms,
        }
    }
}

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub viewer: ViewerResponse,
    pub slug: String,
    pub title: String,
    pub status: ProjectStatus,
}

// ============================================================================
// Admin
// ============================================================================

/// Share settings as sent by the admin UI
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareSettingsRequest {
    pub auth_mode: Option<AuthMode>,
    pub password: Option<String>,
    pub guest_mode: Option<bool>,
    pub guest_latest_only: Option<bool>,
    pub allow_downloads: Option<bool>,
}

/// Create project request
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub settings: ShareSettingsRequest,
}

/// Update project request
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub settings: ShareSettingsRequest,
}

impl From<ShareSettingsRequest> for ShareSettingsInput {
    fn from(req: ShareSettingsRequest) -> Self {
        Self {
            auth_mode: req.auth_mode,
            password: req.password,
            guest_mode: req.guest_mode,
            guest_latest_only: req.guest_latest_only,
            allow_downloads: req.allow_downloads,
        }
    }
}

impl From<CreateProjectRequest> for CreateProjectInput {
    fn from(req: CreateProjectRequest) -> Self {
        Self {
            slug: req.slug,
            title: req.title,
            description: req.description,
            settings: req.settings.into(),
        }
    }
}

impl From<UpdateProjectRequest> for UpdateProjectInput {
    fn from(req: UpdateProjectRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            settings: req.settings.into(),
        }
    }
}

/// Status change request
#[derive(Debug, Clone, Deserialize)]
pub struct SetStatusRequest {
    pub status: ProjectStatus,
}

/// Project as seen by admins
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub project_id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub auth_mode: AuthMode,
    pub has_password: bool,
    pub guest_mode: bool,
    pub guest_latest_only: bool,
    pub allow_downloads: bool,
    pub auth_version: i32,
    pub status: ProjectStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Project> for ProjectResponse {
    fn from(p: &Project) -> Self {
        Self {
            project_id: *p.project_id.as_uuid(),
            slug: p.slug.to_string(),
            title: p.title.clone(),
            description: p.description.clone(),
            auth_mode: p.auth_mode,
            has_password: p.share_password.is_some(),
            guest_mode: p.guest_mode,
            guest_latest_only: p.guest_latest_only,
            allow_downloads: p.allow_downloads,
            auth_version: p.auth_version,
            status: p.status,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// Update project response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectResponse {
    pub project: ProjectResponse,
    pub sessions_invalidated: bool,
}

/// Add recipient request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRecipientRequest {
    pub email: String,
    pub display_name: Option<String>,
}

/// Recipient response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientResponse {
    pub recipient_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: String,
}

impl From<&Recipient> for RecipientResponse {
    fn from(r: &Recipient) -> Self {
        Self {
            recipient_id: *r.recipient_id.as_uuid(),
            email: r.email.to_string(),
            display_name: r.display_name.clone(),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Active session as listed for admins
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub access_method: AccessMethod,
    pub recipient_email: Option<String>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    /// False once share settings changed after the session was minted
    pub current: bool,
    pub expires_at_ms: i64,
    pub created_at: String,
    pub last_activity_at: String,
}

impl SessionResponse {
    pub fn new(session: &ShareSession, project: &Project) -> Self {
        Self {
            session_id: *session.session_id.as_uuid(),
            access_method: session.access_method,
            recipient_email: session.recipient_email.as_ref().map(|e| e.to_string()),
            client_ip: session.client_ip.clone(),
            user_agent: session.user_agent.clone(),
            current: session.auth_version == project.auth_version,
            expires_at_ms: session.expires_at_ms,
            created_at: session.created_at.to_rfc3339(),
            last_activity_at: session.last_activity_at.to_rfc3339(),
        }
    }
}

/// Revoke response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeSessionsResponse {
    pub revoked: u64,
}
