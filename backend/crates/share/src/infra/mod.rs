//! Infrastructure Layer

pub mod otp_delivery;
pub mod postgres;
