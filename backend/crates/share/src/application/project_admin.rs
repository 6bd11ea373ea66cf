//! Project Administration Use Case
//!
//! Admin-side project CRUD and share settings.

use std::sync::Arc;

use kernel::id::ProjectId;
use kernel::principal::AdminPrincipal;
use platform::password::ClearTextPassword;

use crate::application::config::ShareConfig;
use crate::domain::entity::project::{Project, ShareSettingsChange};
use crate::domain::repository::ProjectRepository;
use crate::domain::value_object::{
    auth_mode::AuthMode,
    project_status::ProjectStatus,
    share_password::{SharePassword, SharePasswordError},
    share_slug::ShareSlug,
};
use crate::error::{ShareError, ShareResult};

/// Requested share settings; `None` keeps the current value
///
/// No `Debug`: it carries the clear-text password.
#[derive(Default)]
pub struct ShareSettingsInput {
    pub auth_mode: Option<AuthMode>,
    pub password: Option<String>,
    pub guest_mode: Option<bool>,
    pub guest_latest_only: Option<bool>,
    pub allow_downloads: Option<bool>,
}

/// Create project input
pub struct CreateProjectInput {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub settings: ShareSettingsInput,
}

/// Update project input
#[derive(Default)]
pub struct UpdateProjectInput {
    pub title: Option<String>,
    /// Empty string clears the description
    pub description: Option<String>,
    pub settings: ShareSettingsInput,
}

/// Project administration use case
pub struct ProjectAdminUseCase<P>
where
    P: ProjectRepository,
{
    project_repo: Arc<P>,
    config: Arc<ShareConfig>,
}

impl<P> ProjectAdminUseCase<P>
where
    P: ProjectRepository,
{
    pub fn new(project_repo: Arc<P>, config: Arc<ShareConfig>) -> Self {
        Self {
            project_repo,
            config,
        }
    }

    pub async fn create(
        &self,
        admin: &AdminPrincipal,
        input: CreateProjectInput,
    ) -> ShareResult<Project> {
        let slug = ShareSlug::new(&input.slug).map_err(|e| ShareError::Validation(e.to_string()))?;
        let mut project = Project::new(
            slug,
            &input.title,
            input.description.as_deref(),
            Some(admin.admin_id),
        )
        .map_err(|e| ShareError::Validation(e.to_string()))?;

        let change = self.settings_change(input.settings)?;
        project
            .apply_share_settings(change)
            .map_err(|e| ShareError::Validation(e.to_string()))?;

        self.project_repo.create_project(&project).await?;

        tracing::info!(
            project_id = %project.project_id,
            slug = %project.slug,
            admin_id = %admin.admin_id,
            "Project created"
        );
        Ok(project)
    }

    pub async fn get(&self, project_id: ProjectId) -> ShareResult<Project> {
        self.project_repo
            .find_project_by_id(project_id)
            .await?
            .ok_or(ShareError::ProjectNotFound)
    }

    pub async fn list(&self) -> ShareResult<Vec<Project>> {
        self.project_repo.list_projects().await
    }

    /// Returns the project and whether existing sessions were invalidated
    pub async fn update(
        &self,
        project_id: ProjectId,
        input: UpdateProjectInput,
    ) -> ShareResult<(Project, bool)> {
        let mut project = self.get(project_id).await?;

        if input.title.is_some() || input.description.is_some() {
            let title = input.title.unwrap_or_else(|| project.title.clone());
            let description = match input.description {
                Some(d) => Some(d),
                None => project.description.clone(),
            };
            project
                .rename(&title, description.as_deref())
                .map_err(|e| ShareError::Validation(e.to_string()))?;
        }

        let change = self.settings_change(input.settings)?;
        let bumped = project
            .apply_share_settings(change)
            .map_err(|e| ShareError::Validation(e.to_string()))?;

        self.project_repo.update_project(&project).await?;

        if bumped {
            project.auth_version = self
                .project_repo
                .bump_auth_version(project_id)
                .await?
                .ok_or(ShareError::ProjectNotFound)?;
            tracing::info!(
                project_id = %project.project_id,
                auth_version = project.auth_version,
                "Share settings changed, existing sessions invalidated"
            );
        }
        Ok((project, bumped))
    }

    pub async fn set_status(
        &self,
        project_id: ProjectId,
        status: ProjectStatus,
    ) -> ShareResult<Project> {
        let mut project = self.get(project_id).await?;
        project.set_status(status);
        project.auth_version = self
            .project_repo
            .update_project_status(project_id, status)
            .await?
            .ok_or(ShareError::ProjectNotFound)?;

        tracing::info!(project_id = %project.project_id, status = %status, "Project status changed");
        Ok(project)
    }

    /// Hash a new password (policy enforced) and translate the input
    fn settings_change(&self, input: ShareSettingsInput) -> ShareResult<ShareSettingsChange> {
        let password = match input.password {
            Some(raw) => {
                let (password, clear) = SharePassword::create(raw, self.config.pepper())
                    .map_err(|e| match e {
                        SharePasswordError::Policy(p) => ShareError::PasswordValidation(p.to_string()),
                        SharePasswordError::Hash(h) => ShareError::Internal(h.to_string()),
                    })?;
                if self.config.breach_check {
                    spawn_breach_check(clear);
                }
                Some(password)
            }
            None => None,
        };

        Ok(ShareSettingsChange {
            auth_mode: input.auth_mode,
            password,
            guest_mode: input.guest_mode,
            guest_latest_only: input.guest_latest_only,
            allow_downloads: input.allow_downloads,
        })
    }
}

/// HIBP lookup off the request path; a hit is only logged
fn spawn_breach_check(password: ClearTextPassword) {
    tokio::spawn(async move {
        match password.check_breach().await {
            Ok(true) => tracing::warn!("New share password appears in a known data breach"),
            Ok(false) => {}
            Err(e) => tracing::debug!(error = %e, "Breach check unavailable"),
        }
    });
}
