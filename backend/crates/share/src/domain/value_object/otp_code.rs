//! One-Time Code Value Object
//!
//! Six ASCII digits. Codes are secrets: `Debug` is redacted and there is
//! no `Display`.

use rand::Rng;
use std::fmt;

/// Number of digits in a one-time code
pub const OTP_CODE_LENGTH: usize = 6;

/// Error returned when a submitted code is malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpCodeFormatError;

impl fmt::Display for OtpCodeFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code must be {OTP_CODE_LENGTH} digits")
    }
}

impl std::error::Error for OtpCodeFormatError {}

/// One-time code
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Generate a uniformly random code
    pub fn generate() -> Self {
        let value: u32 = rand::rng().random_range(0..1_000_000);
        Self(format!("{value:06}"))
    }

    /// Parse user input; surrounding whitespace and inner spaces are ignored
    pub fn parse(input: &str) -> Result<Self, OtpCodeFormatError> {
        let code: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if code.len() != OTP_CODE_LENGTH || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpCodeFormatError);
        }
        Ok(Self(code))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OtpCode").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_six_digits() {
        for _ in 0..100 {
            let code = OtpCode::generate();
            assert_eq!(code.as_str().len(), OTP_CODE_LENGTH);
            assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(OtpCode::parse(" 012 345 ").unwrap().as_str(), "012345");
        assert!(OtpCode::parse("12345").is_err());
        assert!(OtpCode::parse("1234567").is_err());
        assert!(OtpCode::parse("12a456").is_err());
        assert!(OtpCode::parse("１２３４５６").is_err());
    }

    #[test]
    fn test_debug_redacted() {
        let code = OtpCode::parse("424242").unwrap();
        assert!(!format!("{code:?}").contains("424242"));
    }
}
