//! Project Entity
//!
//! A project is what a share link points at. It owns the share-page
//! authentication settings; the videos live in the review context.

use chrono::{DateTime, Utc};
use kernel::id::{AdminId, ProjectId};

use crate::domain::value_object::{
    auth_mode::AuthMode, project_status::ProjectStatus, share_password::SharePassword,
    share_slug::ShareSlug,
};

/// Maximum title length
pub const PROJECT_TITLE_MAX_LENGTH: usize = 200;

/// Maximum description length
pub const PROJECT_DESCRIPTION_MAX_LENGTH: usize = 5000;

/// Project error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    /// Title empty or too long
    InvalidTitle,
    /// Description too long
    InvalidDescription,
    /// Mode accepts a password but none is stored
    PasswordRequired,
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(
                f,
                "Title must be 1-{PROJECT_TITLE_MAX_LENGTH} characters"
            ),
            Self::InvalidDescription => write!(
                f,
                "Description must be at most {PROJECT_DESCRIPTION_MAX_LENGTH} characters"
            ),
            Self::PasswordRequired => {
                write!(f, "A share password is required for this auth mode")
            }
        }
    }
}

impl std::error::Error for ProjectError {}

/// Partial update of share settings
///
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ShareSettingsChange {
    pub auth_mode: Option<AuthMode>,
    pub password: Option<SharePassword>,
    pub guest_mode: Option<bool>,
    pub guest_latest_only: Option<bool>,
    pub allow_downloads: Option<bool>,
}

/// Project entity
#[derive(Debug, Clone)]
pub struct Project {
    pub project_id: ProjectId,
    pub slug: ShareSlug,
    pub title: String,
    pub description: Option<String>,
    pub auth_mode: AuthMode,
    pub share_password: Option<SharePassword>,
    /// Guest links enabled
    pub guest_mode: bool,
    /// Guests only see the newest version of each video
    pub guest_latest_only: bool,
    pub allow_downloads: bool,
    /// Bumped whenever existing sessions must stop working
    pub auth_version: i32,
    pub status: ProjectStatus,
    pub created_by: Option<AdminId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a project with no authentication configured yet
    ///
    /// Settings are applied separately so the password invariant is
    /// enforced in one place.
    pub fn new(
        slug: ShareSlug,
        title: &str,
        description: Option<&str>,
        created_by: Option<AdminId>,
    ) -> Result<Self, ProjectError> {
        let now = Utc::now();
        Ok(Self {
            project_id: ProjectId::new(),
            slug,
            title: normalize_title(title)?,
            description: normalize_description(description)?,
            auth_mode: AuthMode::None,
            share_password: None,
            guest_mode: false,
            guest_latest_only: true,
            allow_downloads: false,
            auth_version: 1,
            status: ProjectStatus::InReview,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_archived(&self) -> bool {
        self.status.is_archived()
    }

    /// Update title and description
    pub fn rename(&mut self, title: &str, description: Option<&str>) -> Result<(), ProjectError> {
        self.title = normalize_title(title)?;
        self.description = normalize_description(description)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply a settings change
    ///
    /// Returns whether `auth_version` was bumped. Nothing is modified when
    /// the change would leave a password mode without a password.
    pub fn apply_share_settings(
        &mut self,
        change: ShareSettingsChange,
    ) -> Result<bool, ProjectError> {
        let new_mode = change.auth_mode.unwrap_or(self.auth_mode);
        let has_password = change.password.is_some() || self.share_password.is_some();
        if new_mode.allows_password() && !has_password {
            return Err(ProjectError::PasswordRequired);
        }

        let mut auth_changed = false;
        if new_mode != self.auth_mode {
            self.auth_mode = new_mode;
            auth_changed = true;
        }
        if let Some(password) = change.password {
            self.share_password = Some(password);
            auth_changed = true;
        }
        if let Some(guest_mode) = change.guest_mode {
            if guest_mode != self.guest_mode {
                self.guest_mode = guest_mode;
                auth_changed = true;
            }
        }
        if let Some(latest_only) = change.guest_latest_only {
            self.guest_latest_only = latest_only;
        }
        if let Some(allow) = change.allow_downloads {
            self.allow_downloads = allow;
        }

        if auth_changed {
            self.auth_version += 1;
        }
        self.updated_at = Utc::now();
        Ok(auth_changed)
    }

    /// Change status; archiving invalidates every session
    pub fn set_status(&mut self, status: ProjectStatus) {
        if status == self.status {
            return;
        }
        if status.is_archived() {
            self.auth_version += 1;
        }
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Invalidate every existing session
    pub fn bump_auth_version(&mut self) {
        self.auth_version += 1;
        self.updated_at = Utc::now();
    }
}

fn normalize_title(title: &str) -> Result<String, ProjectError> {
    let title = title.trim();
    let len = title.chars().count();
    if len == 0 || len > PROJECT_TITLE_MAX_LENGTH {
        return Err(ProjectError::InvalidTitle);
    }
    Ok(title.to_string())
}

fn normalize_description(description: Option<&str>) -> Result<Option<String>, ProjectError> {
    let Some(description) = description.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    if description.chars().count() > PROJECT_DESCRIPTION_MAX_LENGTH {
        return Err(ProjectError::InvalidDescription);
    }
    Ok(Some(description.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project::new(ShareSlug::new("launch-film").unwrap(), "Launch film", None, None).unwrap()
    }

    fn password() -> SharePassword {
        SharePassword::create("Director-Cut-2024".into(), None).unwrap().0
    }

    #[test]
    fn test_new_project_is_open_and_in_review() {
        let p = project();
        assert_eq!(p.auth_mode, AuthMode::None);
        assert_eq!(p.status, ProjectStatus::InReview);
        assert_eq!(p.auth_version, 1);
    }

    #[test]
    fn test_title_validation() {
        let slug = ShareSlug::new("launch-film").unwrap();
        assert_eq!(
            Project::new(slug.clone(), "   ", None, None).unwrap_err(),
            ProjectError::InvalidTitle
        );
        let p = Project::new(slug, "  Launch  ", Some("  "), None).unwrap();
        assert_eq!(p.title, "Launch");
        assert_eq!(p.description, None);
    }

    #[test]
    fn test_password_mode_requires_password() {
        let mut p = project();
        let err = p
            .apply_share_settings(ShareSettingsChange {
                auth_mode: Some(AuthMode::Password),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err, ProjectError::PasswordRequired);
        assert_eq!(p.auth_mode, AuthMode::None);
        assert_eq!(p.auth_version, 1);
    }

    #[test]
    fn test_auth_changes_bump_version() {
        let mut p = project();
        let bumped = p
            .apply_share_settings(ShareSettingsChange {
                auth_mode: Some(AuthMode::PasswordOrOtp),
                password: Some(password()),
                ..Default::default()
            })
            .unwrap();
        assert!(bumped);
        assert_eq!(p.auth_version, 2);

        // Mode already stored, password kept
        let bumped = p
            .apply_share_settings(ShareSettingsChange {
                auth_mode: Some(AuthMode::Password),
                ..Default::default()
            })
            .unwrap();
        assert!(bumped);
        assert_eq!(p.auth_version, 3);

        let bumped = p
            .apply_share_settings(ShareSettingsChange {
                guest_mode: Some(true),
                ..Default::default()
            })
            .unwrap();
        assert!(bumped);
        assert_eq!(p.auth_version, 4);
    }

    #[test]
    fn test_non_auth_changes_keep_version() {
        let mut p = project();
        let bumped = p
            .apply_share_settings(ShareSettingsChange {
                allow_downloads: Some(true),
                guest_latest_only: Some(false),
                guest_mode: Some(false),
                ..Default::default()
            })
            .unwrap();
        assert!(!bumped);
        assert!(p.allow_downloads);
        assert!(!p.guest_latest_only);
        assert_eq!(p.auth_version, 1);
    }

    #[test]
    fn test_archive_bumps_version() {
        let mut p = project();
        p.set_status(ProjectStatus::Approved);
        assert_eq!(p.auth_version, 1);
        p.set_status(ProjectStatus::Archived);
        assert_eq!(p.auth_version, 2);
        p.set_status(ProjectStatus::Archived);
        assert_eq!(p.auth_version, 2);
    }
}
