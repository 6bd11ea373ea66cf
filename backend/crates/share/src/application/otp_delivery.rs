//! OTP Delivery Port
//!
//! Sending the code is delegated to an adapter (`infra::otp_delivery`).

use kernel::email::Email;

use crate::domain::value_object::otp_code::OtpCode;
use crate::error::ShareResult;

/// A code to hand to a recipient
#[derive(Debug, Clone)]
pub struct OtpMessage {
    pub to: Email,
    pub code: OtpCode,
    pub project_title: String,
    pub expires_in_minutes: i64,
}

/// OTP sender trait
#[trait_variant::make(OtpSender: Send)]
pub trait LocalOtpSender {
    async fn send_otp(&self, message: &OtpMessage) -> ShareResult<()>;
}
