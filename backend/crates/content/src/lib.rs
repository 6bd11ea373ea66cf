//! Content Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Content token claims, asset kinds, hotlink policy
//! - `application/` - Use cases (issue a token, resolve it to a file)
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! ## Security Model
//! - Media is never reachable by a stable URL; every fetch carries a
//!   signed `content` token naming the session, video and asset
//! - Tokens are bound to the client fingerprint and expire quickly
//!   (download tokens faster than stream tokens)
//! - Each fetch re-checks the share session, so revoking sessions or
//!   archiving the project stops playback at the next request

pub mod application;
pub mod domain;
pub mod error;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ContentConfig;
pub use domain::value_object::hotlink::{HotlinkMode, HotlinkPolicy};
pub use error::{ContentError, ContentResult};
pub use presentation::handlers::ContentAppState;
pub use presentation::router::{content_public_router, content_viewer_router};
