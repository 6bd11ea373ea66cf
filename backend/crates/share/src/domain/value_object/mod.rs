//! Value Object Module

pub mod access_method;
pub mod auth_mode;
pub mod otp_code;
pub mod project_status;
pub mod share_password;
pub mod share_slug;
