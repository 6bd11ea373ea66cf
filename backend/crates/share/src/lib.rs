//! Share Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Projects, recipients, share sessions, OTP challenges
//! - `application/` - Use cases (share-page access, session checks, admin settings)
//! - `infra/` - Database implementations, OTP delivery
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Security Model
//! - A project is reached through its share slug and one of the access
//!   methods its auth mode allows (open, password, OTP, guest)
//! - Every access mints a signed `share` token bound to a server-side
//!   session row and to the client fingerprint
//! - Sessions carry the project's `auth_version` at mint time; bumping it
//!   invalidates every session at once

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ShareConfig;
pub use infra::otp_delivery::OtpDelivery;
pub use domain::viewer::ShareViewer;
pub use error::{ShareError, ShareResult};
pub use infra::postgres::PgShareRepository;
pub use presentation::middleware::{ShareMiddlewareState, require_share_session};
pub use presentation::router::{share_admin_router, share_public_router, share_viewer_router};

#[cfg(test)]
mod tests;
