//! Presentation Layer
//!
//! HTTP handlers, DTOs and routers.

pub mod admin_handlers;
pub mod dto;
pub mod handlers;
pub mod router;

pub use admin_handlers::ReviewAdminState;
pub use handlers::ReviewAppState;
pub use router::{review_admin_router, review_viewer_router};
