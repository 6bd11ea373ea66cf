//! Application Layer
//!
//! Use cases for the share page and its administration.

pub mod check_session;
pub mod config;
pub mod guest_access;
pub mod issue_session;
pub mod open_access;
pub mod otp_delivery;
pub mod project_admin;
pub(crate) mod rate_limit;
pub mod recipients;
pub mod send_otp;
pub mod session_admin;
pub mod session_token;
pub mod share_info;
pub mod sign_out;
pub mod verify_otp;
pub mod verify_password;

pub use check_session::CheckShareSessionUseCase;
pub use guest_access::GuestAccessUseCase;
pub use issue_session::IssuedSession;
pub use open_access::OpenAccessUseCase;
pub use otp_delivery::{OtpMessage, OtpSender};
pub use project_admin::{
    CreateProjectInput, ProjectAdminUseCase, ShareSettingsInput, UpdateProjectInput,
};
pub use recipients::RecipientAdminUseCase;
pub use send_otp::SendOtpUseCase;
pub use session_admin::SessionAdminUseCase;
pub use share_info::{ShareInfo, ShareInfoUseCase};
pub use sign_out::ShareSignOutUseCase;
pub use verify_otp::VerifyOtpUseCase;
pub use verify_password::VerifyPasswordUseCase;
