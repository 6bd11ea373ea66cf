//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::email::Email;
use kernel::id::{OtpChallengeId, ProjectId, RecipientId, ShareSessionId};

use crate::domain::entity::{
    otp_challenge::OtpChallenge, project::Project, recipient::Recipient,
    share_session::ShareSession,
};
use crate::domain::value_object::{project_status::ProjectStatus, share_slug::ShareSlug};
use crate::error::ShareResult;

/// Project repository trait
#[trait_variant::make(ProjectRepository: Send)]
pub trait LocalProjectRepository {
    /// Insert a project; a taken slug yields `ShareError::SlugTaken`
    async fn create_project(&self, project: &Project) -> ShareResult<()>;

    async fn find_project_by_id(&self, project_id: ProjectId) -> ShareResult<Option<Project>>;

    async fn find_project_by_slug(&self, slug: &ShareSlug) -> ShareResult<Option<Project>>;

    /// Newest first
    async fn list_projects(&self) -> ShareResult<Vec<Project>>;

    /// Persist title, description and share settings
    ///
    /// Status and `auth_version` are left alone; they have their own writers.
    async fn update_project(&self, project: &Project) -> ShareResult<()>;

    /// Increment `auth_version` in the store, returns the new value
    async fn bump_auth_version(&self, project_id: ProjectId) -> ShareResult<Option<i32>>;

    /// Admin status change, archiving also bumps `auth_version`
    ///
    /// Returns the resulting `auth_version`.
    async fn update_project_status(
        &self,
        project_id: ProjectId,
        status: ProjectStatus,
    ) -> ShareResult<Option<i32>>;

    /// Status-only update used by the review context (approval)
    async fn set_project_status(
        &self,
        project_id: ProjectId,
        status: ProjectStatus,
    ) -> ShareResult<()>;
}

/// Recipient repository trait
#[trait_variant::make(RecipientRepository: Send)]
pub trait LocalRecipientRepository {
    /// Insert; an existing (project, email) yields `ShareError::RecipientExists`
    async fn add_recipient(&self, recipient: &Recipient) -> ShareResult<()>;

    async fn find_recipient(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> ShareResult<Option<Recipient>>;

    async fn list_recipients(&self, project_id: ProjectId) -> ShareResult<Vec<Recipient>>;

    /// Delete and return the removed recipient
    async fn remove_recipient(
        &self,
        project_id: ProjectId,
        recipient_id: RecipientId,
    ) -> ShareResult<Option<Recipient>>;
}

/// Share session repository trait
#[trait_variant::make(ShareSessionRepository: Send)]
pub trait LocalShareSessionRepository {
    async fn create_share_session(&self, session: &ShareSession) -> ShareResult<()>;

    async fn find_share_session(
        &self,
        session_id: ShareSessionId,
    ) -> ShareResult<Option<ShareSession>>;

    /// Update last activity
    async fn touch_share_session(&self, session: &ShareSession) -> ShareResult<()>;

    async fn revoke_share_session(&self, session_id: ShareSessionId) -> ShareResult<()>;

    /// Revoke every active session of a project, returns how many
    async fn revoke_project_sessions(&self, project_id: ProjectId) -> ShareResult<u64>;

    /// Revoke the OTP sessions of one recipient
    async fn revoke_recipient_sessions(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> ShareResult<u64>;

    /// Sessions neither revoked nor expired, newest first
    async fn list_active_sessions(&self, project_id: ProjectId) -> ShareResult<Vec<ShareSession>>;

    /// Delete expired and revoked sessions
    async fn cleanup_expired_share_sessions(&self) -> ShareResult<u64>;
}

/// OTP challenge repository trait
#[trait_variant::make(OtpChallengeRepository: Send)]
pub trait LocalOtpChallengeRepository {
    /// Store a challenge, deleting earlier ones for the same (project, email)
    async fn replace_otp_challenge(&self, challenge: &OtpChallenge) -> ShareResult<()>;

    async fn find_latest_otp_challenge(
        &self,
        project_id: ProjectId,
        email: &Email,
    ) -> ShareResult<Option<OtpChallenge>>;

    /// Atomically add a failed attempt, returns the new count
    async fn increment_otp_attempts(&self, challenge_id: OtpChallengeId)
    -> ShareResult<Option<i16>>;

    /// Delete the challenge, returns whether this call removed it
    async fn consume_otp_challenge(&self, challenge_id: OtpChallengeId) -> ShareResult<bool>;

    async fn cleanup_expired_otp_challenges(&self) -> ShareResult<u64>;
}

/// Every share repository behind one handle, as the HTTP state holds it
pub trait ShareStore:
    ProjectRepository
    + RecipientRepository
    + ShareSessionRepository
    + OtpChallengeRepository
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> ShareStore for T where
    T: ProjectRepository
        + RecipientRepository
        + ShareSessionRepository
        + OtpChallengeRepository
        + Clone
        + Send
        + Sync
        + 'static
{
}
