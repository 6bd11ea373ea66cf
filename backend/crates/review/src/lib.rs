//! Review Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Videos and their versions, comments, annotations
//! - `application/` - Use cases (listing, uploads, comments, approvals)
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! Viewer routes rely on the `ShareViewer` extension set by the share
//! session middleware; admin routes rely on `AdminPrincipal`.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ReviewConfig;
pub use domain::repository::ReviewStore;
pub use error::{ReviewError, ReviewResult};
pub use infra::postgres::PgReviewRepository;
pub use presentation::router::{review_admin_router, review_viewer_router};
