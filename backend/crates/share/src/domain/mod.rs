//! Domain Layer
//!
//! Projects' share settings, recipients, share sessions and OTP challenges.

pub mod entity;
pub mod repository;
pub mod value_object;
pub mod viewer;

pub use entity::{
    otp_challenge::OtpChallenge,
    project::{Project, ShareSettingsChange},
    recipient::Recipient,
    share_session::ShareSession,
};
pub use repository::{
    OtpChallengeRepository, ProjectRepository, RecipientRepository, ShareSessionRepository,
    ShareStore,
};
pub use value_object::{
    access_method::AccessMethod, auth_mode::AuthMode, otp_code::OtpCode,
    project_status::ProjectStatus, share_password::SharePassword, share_slug::ShareSlug,
};
pub use viewer::ShareViewer;
