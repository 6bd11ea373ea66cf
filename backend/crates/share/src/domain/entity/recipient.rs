//! Recipient Entity
//!
//! An email address allowed to request one-time codes for a project.

use chrono::{DateTime, Utc};
use kernel::email::Email;
use kernel::id::{ProjectId, RecipientId};

/// Maximum display name length
pub const RECIPIENT_NAME_MAX_LENGTH: usize = 100;

/// Project recipient
#[derive(Debug, Clone)]
pub struct Recipient {
    pub recipient_id: RecipientId,
    pub project_id: ProjectId,
    pub email: Email,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Recipient {
    pub fn new(project_id: ProjectId, email: Email, display_name: Option<String>) -> Self {
        let display_name = display_name
            .map(|n| n.trim().chars().take(RECIPIENT_NAME_MAX_LENGTH).collect::<String>())
            .filter(|n| !n.is_empty());
        Self {
            recipient_id: RecipientId::new(),
            project_id,
            email,
            display_name,
            created_at: Utc::now(),
        }
    }
}
