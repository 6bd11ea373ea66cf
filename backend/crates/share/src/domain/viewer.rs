//! Share Viewer
//!
//! The authenticated principal of a share session. The share middleware
//! inserts it into request extensions; review and content handlers read it.

use kernel::email::Email;
use kernel::id::{AdminId, ProjectId, ShareSessionId};

use crate::domain::entity::{project::Project, share_session::ShareSession};
use crate::domain::value_object::access_method::AccessMethod;

/// Authenticated share-page viewer
#[derive(Debug, Clone)]
pub struct ShareViewer {
    pub session_id: ShareSessionId,
    pub project_id: ProjectId,
    pub method: AccessMethod,
    pub recipient_email: Option<Email>,
    pub admin_id: Option<AdminId>,
    pub guest_latest_only: bool,
    pub allow_downloads: bool,
    pub expires_at_ms: i64,
}

impl ShareViewer {
    pub fn new(session: &ShareSession, project: &Project) -> Self {
        Self {
            session_id: session.session_id,
            project_id: session.project_id,
            method: session.access_method,
            recipient_email: session.recipient_email.clone(),
            admin_id: session.admin_id,
            guest_latest_only: project.guest_latest_only,
            allow_downloads: project.allow_downloads,
            expires_at_ms: session.expires_at_ms,
        }
    }

    #[inline]
    pub fn is_guest(&self) -> bool {
        self.method.is_guest()
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.method.is_admin()
    }

    /// Guests on a latest-only project see one version per video name
    #[inline]
    pub fn latest_versions_only(&self) -> bool {
        self.is_guest() && self.guest_latest_only
    }
}
