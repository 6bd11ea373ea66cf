//! HTTP Handlers (project administration)
//!
//! Every route here sits behind the admin session middleware.

use axum::Json;
use axum::extract::{ConnectInfo, Extension, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use kernel::id::{ProjectId, RecipientId};
use kernel::principal::AdminPrincipal;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::config::ShareConfig;
use crate::application::{ProjectAdminUseCase, RecipientAdminUseCase, SessionAdminUseCase};
use crate::domain::repository::ShareStore;
use crate::error::ShareResult;
use crate::presentation::dto::{
    AddRecipientRequest, CreateProjectRequest, ProjectResponse, RecipientResponse,
    RevokeSessionsResponse, SessionResponse, SetStatusRequest, UpdateProjectRequest,
    UpdateProjectResponse,
};
use crate::presentation::handlers::{access_response, client_fingerprint};

/// Shared state for admin project handlers
#[derive(Clone)]
pub struct ShareAdminState<R>
where
    R: ShareStore,
{
    pub repo: Arc<R>,
    pub config: Arc<ShareConfig>,
}

impl<R> ShareAdminState<R>
where
    R: ShareStore,
{
    fn projects(&self) -> ProjectAdminUseCase<R> {
        ProjectAdminUseCase::new(self.repo.clone(), self.config.clone())
    }

    fn recipients(&self) -> RecipientAdminUseCase<R, R, R> {
        RecipientAdminUseCase::new(self.repo.clone(), self.repo.clone(), self.repo.clone())
    }

    fn sessions(&self) -> SessionAdminUseCase<R, R> {
        SessionAdminUseCase::new(self.repo.clone(), self.repo.clone(), self.config.clone())
    }
}

/// GET /api/admin/projects
pub async fn list_projects<R>(
    State(state): State<ShareAdminState<R>>,
) -> ShareResult<Json<Vec<ProjectResponse>>>
where
    R: ShareStore,
{
    let projects = state.projects().list().await?;
    Ok(Json(projects.iter().map(ProjectResponse::from).collect()))
}

/// POST /api/admin/projects
pub async fn create_project<R>(
    State(state): State<ShareAdminState<R>>,
    Extension(admin): Extension<AdminPrincipal>,
    Json(req): Json<CreateProjectRequest>,
) -> ShareResult<impl IntoResponse>
where
    R: ShareStore,
{
    let project = state.projects().create(&admin, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(&project))))
}

/// GET /api/admin/projects/{project_id}
pub async fn get_project<R>(
    State(state): State<ShareAdminState<R>>,
    Path(project_id): Path<Uuid>,
) -> ShareResult<Json<ProjectResponse>>
where
    R: ShareStore,
{
    let project = state.projects().get(ProjectId::from_uuid(project_id)).await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// PATCH /api/admin/projects/{project_id}
pub async fn update_project<R>(
    State(state): State<ShareAdminState<R>>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ShareResult<Json<UpdateProjectResponse>>
where
    R: ShareStore,
{
    let (project, sessions_invalidated) = state
        .projects()
        .update(ProjectId::from_uuid(project_id), req.into())
        .await?;

    Ok(Json(UpdateProjectResponse {
        project: ProjectResponse::from(&project),
        sessions_invalidated,
    }))
}

/// PUT /api/admin/projects/{project_id}/status
pub async fn set_project_status<R>(
    State(state): State<ShareAdminState<R>>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> ShareResult<Json<ProjectResponse>>
where
    R: ShareStore,
{
    let project = state
        .projects()
        .set_status(ProjectId::from_uuid(project_id), req.status)
        .await?;
    Ok(Json(ProjectResponse::from(&project)))
}

/// GET /api/admin/projects/{project_id}/recipients
pub async fn list_recipients<R>(
    State(state): State<ShareAdminState<R>>,
    Path(project_id): Path<Uuid>,
) -> ShareResult<Json<Vec<RecipientResponse>>>
where
    R: ShareStore,
{
    let recipients = state
        .recipients()
        .list(ProjectId::from_uuid(project_id))
        .await?;
    Ok(Json(recipients.iter().map(RecipientResponse::from).collect()))
}

/// POST /api/admin/projects/{project_id}/recipients
pub async fn add_recipient<R>(
    State(state): State<ShareAdminState<R>>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AddRecipientRequest>,
) -> ShareResult<impl IntoResponse>
where
    R: ShareStore,
{
    let recipient = state
        .recipients()
        .add(ProjectId::from_uuid(project_id), &req.email, req.display_name)
        .await?;
    Ok((StatusCode::CREATED, Json(RecipientResponse::from(&recipient))))
}

/// DELETE /api/admin/projects/{project_id}/recipients/{recipient_id}
pub async fn remove_recipient<R>(
    State(state): State<ShareAdminState<R>>,
    Path((project_id, recipient_id)): Path<(Uuid, Uuid)>,
) -> ShareResult<StatusCode>
where
    R: ShareStore,
{
    state
        .recipients()
        .remove(
            ProjectId::from_uuid(project_id),
            RecipientId::from_uuid(recipient_id),
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/admin/projects/{project_id}/sessions
pub async fn list_sessions<R>(
    State(state): State<ShareAdminState<R>>,
    Path(project_id): Path<Uuid>,
) -> ShareResult<Json<Vec<SessionResponse>>>
where
    R: ShareStore,
{
    let (project, sessions) = state
        .sessions()
        .list(ProjectId::from_uuid(project_id))
        .await?;
    Ok(Json(
        sessions
            .iter()
            .map(|s| SessionResponse::new(s, &project))
            .collect(),
    ))
}

/// POST /api/admin/projects/{project_id}/sessions/revoke
pub async fn revoke_sessions<R>(
    State(state): State<ShareAdminState<R>>,
    Path(project_id): Path<Uuid>,
) -> ShareResult<Json<RevokeSessionsResponse>>
where
    R: ShareStore,
{
    let revoked = state
        .sessions()
        .revoke_all(ProjectId::from_uuid(project_id))
        .await?;
    Ok(Json(RevokeSessionsResponse { revoked }))
}

/// POST /api/admin/projects/{project_id}/preview
///
/// Sets the share cookie, so the admin browser can open the share page.
pub async fn preview<R>(
    State(state): State<ShareAdminState<R>>,
    Extension(admin): Extension<AdminPrincipal>,
    Path(project_id): Path<Uuid>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> ShareResult<impl IntoResponse>
where
    R: ShareStore,
{
    let fingerprint = client_fingerprint(&headers, addr, &state.config)?;
    let issued = state
        .sessions()
        .issue_admin_preview(&admin, ProjectId::from_uuid(project_id), &fingerprint)
        .await?;
    Ok(access_response(&state.config, issued))
}
