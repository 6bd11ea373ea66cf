//! Admin Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Admin accounts, admin sessions, repository traits
//! - `application/` - Use cases (sign in/out, session check, bootstrap)
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, middleware, router
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (optional pepper)
//! - Temporary lockout after repeated failures, plus a per-IP rate limit
//! - Sessions are signed `admin-session` tokens in an HttpOnly cookie,
//!   backed by a server-side row bound to the client fingerprint

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AdminConfig;
pub use error::{AdminError, AdminResult};
pub use infra::postgres::PgAdminRepository;
pub use presentation::middleware::{AdminMiddlewareState, require_admin_session};
pub use presentation::router::admin_auth_router;
