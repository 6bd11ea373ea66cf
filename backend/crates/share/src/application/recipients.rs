//! Recipient Administration Use Case

use std::sync::Arc;

use kernel::email::Email;
use kernel::id::{ProjectId, RecipientId};

use crate::domain::entity::recipient::Recipient;
use crate::domain::repository::{ProjectRepository, RecipientRepository, ShareSessionRepository};
use crate::error::{ShareError, ShareResult};

/// Recipient administration use case
pub struct RecipientAdminUseCase<P, R, S>
where
    P: ProjectRepository,
    R: RecipientRepository,
    S: ShareSessionRepository,
{
    project_repo: Arc<P>,
    recipient_repo: Arc<R>,
    session_repo: Arc<S>,
}

impl<P, R, S> RecipientAdminUseCase<P, R, S>
where
    P: ProjectRepository,
    R: RecipientRepository,
    S: ShareSessionRepository,
{
    pub fn new(project_repo: Arc<P>, recipient_repo: Arc<R>, session_repo: Arc<S>) -> Self {
        Self {
            project_repo,
            recipient_repo,
            session_repo,
        }
    }

    pub async fn list(&self, project_id: ProjectId) -> ShareResult<Vec<Recipient>> {
        self.ensure_project(project_id).await?;
        self.recipient_repo.list_recipients(project_id).await
    }

    pub async fn add(
        &self,
        project_id: ProjectId,
        email: &str,
        display_name: Option<String>,
    ) -> ShareResult<Recipient> {
        self.ensure_project(project_id).await?;
        let email = Email::new(email)
            .map_err(|_| ShareError::Validation("Invalid email address".to_string()))?;

        if self
            .recipient_repo
            .find_recipient(project_id, &email)
            .await?
            .is_some()
        {
            return Err(ShareError::RecipientExists);
        }

        let recipient = Recipient::new(project_id, email, display_name);
        self.recipient_repo.add_recipient(&recipient).await?;

        tracing::info!(
            project_id = %project_id,
            recipient_id = %recipient.recipient_id,
            email = %recipient.email.masked(),
            "Recipient added"
        );
        Ok(recipient)
    }

    /// Remove a recipient and revoke their OTP sessions
    pub async fn remove(&self, project_id: ProjectId, recipient_id: RecipientId) -> ShareResult<()> {
        let recipient = self
            .recipient_repo
            .remove_recipient(project_id, recipient_id)
            .await?
            .ok_or(ShareError::RecipientNotFound)?;

        let revoked = self
            .session_repo
            .revoke_recipient_sessions(project_id, &recipient.email)
            .await?;

        tracing::info!(
            project_id = %project_id,
            recipient_id = %recipient_id,
            sessions_revoked = revoked,
            "Recipient removed"
        );
        Ok(())
    }

    async fn ensure_project(&self, project_id: ProjectId) -> ShareResult<()> {
        self.project_repo
            .find_project_by_id(project_id)
            .await?
            .map(|_| ())
            .ok_or(ShareError::ProjectNotFound)
    }
}
