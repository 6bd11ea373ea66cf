//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod admin_handlers;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use admin_handlers::ShareAdminState;
pub use handlers::ShareAppState;
pub use middleware::{ShareMiddlewareState, require_share_session};
pub use router::{share_admin_router, share_public_router, share_viewer_router};
