//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AdminAppState;
pub use middleware::{AdminMiddlewareState, require_admin_session};
pub use router::{admin_auth_router, admin_auth_router_generic};
