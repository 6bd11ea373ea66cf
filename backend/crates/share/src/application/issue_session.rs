//! Session minting shared by every access method

use chrono::Duration;
use platform::client::ClientFingerprint;

use crate::application::config::ShareConfig;
use crate::application::session_token;
use crate::domain::entity::project::Project;
use crate::domain::entity::share_session::{SessionSubject, ShareSession};
use crate::domain::repository::ShareSessionRepository;
use crate::domain::viewer::ShareViewer;
use crate::error::{ShareError, ShareResult};

/// A freshly minted session and its token
#[derive(Debug)]
pub struct IssuedSession {
    /// Signed `share` token for the cookie or `Authorization: Bearer`
    pub token: String,
    pub viewer: ShareViewer,
}

/// Create the session row and sign its token
pub(crate) async fn mint_session<S: ShareSessionRepository>(
    session_repo: &S,
    config: &ShareConfig,
    project: &Project,
    subject: SessionSubject,
    fingerprint: &ClientFingerprint,
) -> ShareResult<IssuedSession> {
    let ttl = Duration::from_std(config.session_ttl)
        .map_err(|e| ShareError::Internal(format!("Invalid session TTL: {e}")))?;

    let session = ShareSession::new(
        project.project_id,
        project.auth_version,
        subject,
        fingerprint.hash_vec(),
        fingerprint.ip_string(),
        fingerprint.user_agent.clone(),
        ttl,
    );
    session_repo.create_share_session(&session).await?;

    let token = session_token::issue(
        &config.token_secret,
        session.session_id,
        project.project_id,
        session.expires_at_ms,
    )?;

    tracing::info!(
        project_id = %project.project_id,
        session_id = %session.session_id,
        method = %session.access_method,
        "Share session created"
    );

    Ok(IssuedSession {
        token,
        viewer: ShareViewer::new(&session, project),
    })
}
