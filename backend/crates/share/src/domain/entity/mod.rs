//! Entity Module

pub mod otp_challenge;
pub mod project;
pub mod recipient;
pub mod share_session;
