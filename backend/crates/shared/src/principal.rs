//! Authenticated principals shared across bounded contexts
//!
//! The admin middleware inserts an [`AdminPrincipal`] into request
//! extensions; share/review handlers read it without depending on the
//! admin crate.

use crate::email::Email;
use crate::id::AdminId;

/// An authenticated administrator
#[derive(Debug, Clone)]
pub struct AdminPrincipal {
    pub admin_id: AdminId,
    pub email: Email,
    pub display_name: Option<String>,
}

impl AdminPrincipal {
    /// Name shown as the author of admin comments
    pub fn author_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(self.email.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_name_falls_back_to_email() {
        let principal = AdminPrincipal {
            admin_id: AdminId::new(),
            email: Email::new("admin@studio.com").unwrap(),
            display_name: None,
        };
        assert_eq!(principal.author_name(), "admin@studio.com");

        let named = AdminPrincipal {
            display_name: Some("Studio".to_string()),
            ..principal
        };
        assert_eq!(named.author_name(), "Studio");
    }
}
