//! Application Layer
//!
//! Issuing content tokens and resolving them back to files.

pub mod config;
pub mod issue_token;
pub mod resolve;

pub use config::ContentConfig;
pub use issue_token::{IssueContentInput, IssueContentTokenUseCase, IssuedContentToken};
pub use resolve::{RequestSource, ResolveContentUseCase, ResolvedContent};
