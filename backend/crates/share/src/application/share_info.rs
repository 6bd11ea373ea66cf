//! Share Info Use Case
//!
//! Public description of a share page, shown before authentication.

use std::sync::Arc;

use crate::domain::entity::project::Project;
use crate::domain::repository::ProjectRepository;
use crate::domain::value_object::{auth_mode::AuthMode, share_slug::ShareSlug};
use crate::error::{ShareError, ShareResult};

/// What the share page may reveal before sign-in
#[derive(Debug, Clone)]
pub struct ShareInfo {
    pub slug: ShareSlug,
    pub title: String,
    pub description: Option<String>,
    pub auth_mode: AuthMode,
    pub password_enabled: bool,
    pub otp_enabled: bool,
    pub guest_enabled: bool,
}

/// Load the project behind a slug, rejecting archived ones
///
/// A malformed slug is reported as not found.
pub(crate) async fn load_shared_project<P: ProjectRepository>(
    project_repo: &P,
    slug: &str,
) -> ShareResult<Project> {
    let slug = ShareSlug::new(slug).map_err(|_| ShareError::ProjectNotFound)?;
    let project = project_repo
        .find_project_by_slug(&slug)
        .await?
        .ok_or(ShareError::ProjectNotFound)?;

    if project.is_archived() {
        return Err(ShareError::ProjectArchived);
    }
    Ok(project)
}

/// Share info use case
pub struct ShareInfoUseCase<P>
where
    P: ProjectRepository,
{
    project_repo: Arc<P>,
}

impl<P> ShareInfoUseCase<P>
where
    P: ProjectRepository,
{
    pub fn new(project_repo: Arc<P>) -> Self {
        Self { project_repo }
    }

    pub async fn execute(&self, slug: &str) -> ShareResult<ShareInfo> {
        let project = load_shared_project(self.project_repo.as_ref(), slug).await?;

        Ok(ShareInfo {
            password_enabled: project.auth_mode.allows_password(),
            otp_enabled: project.auth_mode.allows_otp(),
            guest_enabled: project.guest_mode,
            slug: project.slug,
            title: project.title,
            description: project.description,
            auth_mode: project.auth_mode,
        })
    }
}
