//! Admin Error Types
//!
//! This module provides admin-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Admin-specific result type alias
pub type AdminResult<T> = Result<T, AdminError>;

/// Admin-specific error variants
#[derive(Debug, Error)]
pub enum AdminError {
    /// Unknown email or wrong password (indistinguishable on purpose)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account is locked (too many failed attempts)
    #[error("Account is temporarily locked")]
    AccountLocked,

    /// Session not found or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Session fingerprint mismatch
    #[error("Session fingerprint mismatch")]
    SessionFingerprintMismatch,

    /// Too many sign-in attempts from this client
    #[error("Too many attempts, try again later")]
    RateLimited { retry_after_secs: u64 },

    /// Missing required header
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdminError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::InvalidCredentials
            | AdminError::SessionInvalid
            | AdminError::SessionFingerprintMismatch => StatusCode::UNAUTHORIZED,
            AdminError::AccountLocked => StatusCode::LOCKED,
            AdminError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AdminError::MissingHeader(_) | AdminError::PasswordValidation(_) => {
                StatusCode::BAD_REQUEST
            }
            AdminError::Database(_) | AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdminError::InvalidCredentials
            | AdminError::SessionInvalid
            | AdminError::SessionFingerprintMismatch => ErrorKind::Unauthorized,
            AdminError::AccountLocked => ErrorKind::Locked,
            AdminError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AdminError::MissingHeader(_) | AdminError::PasswordValidation(_) => {
                ErrorKind::BadRequest
            }
            AdminError::Database(_) | AdminError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = match self {
            // Never echo internals to the client
            AdminError::Database(_) | AdminError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        };
        match self {
            AdminError::RateLimited { retry_after_secs } => err.with_retry_after(*retry_after_secs),
            AdminError::AccountLocked => err.with_action("Wait 15 minutes before trying again"),
            _ => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AdminError::Database(e) => {
                tracing::error!(error = %e, "Admin database error");
            }
            AdminError::Internal(msg) => {
                tracing::error!(message = %msg, "Admin internal error");
            }
            AdminError::InvalidCredentials => {
                tracing::warn!("Invalid admin login attempt");
            }
            AdminError::AccountLocked => {
                tracing::warn!("Login attempt on locked admin account");
            }
            AdminError::SessionFingerprintMismatch => {
                tracing::warn!("Admin session fingerprint mismatch detected");
            }
            AdminError::RateLimited { .. } => {
                tracing::warn!("Admin sign-in rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Admin error");
            }
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::client::FingerprintError> for AdminError {
    fn from(err: platform::client::FingerprintError) -> Self {
        match err {
            platform::client::FingerprintError::MissingHeader(header) => {
                AdminError::MissingHeader(header)
            }
        }
    }
}
