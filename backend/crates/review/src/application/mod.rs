//! Application Layer
//!
//! Use cases for video listing, uploads, comments and approvals.

pub mod admin_comments;
pub mod approval;
pub mod comments;
pub mod config;
pub mod list_videos;
pub mod upload;

pub use admin_comments::AdminCommentsUseCase;
pub use approval::{ApprovalOutcome, ApprovalUseCase};
pub use comments::{PostCommentInput, ViewerCommentsUseCase};
pub use config::ReviewConfig;
pub use list_videos::{ListVideosUseCase, ListedVideo};
pub use upload::{UploadUseCase, UploadVersionInput};
