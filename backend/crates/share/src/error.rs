//! Share Error Types
//!
//! Share-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Share-specific result type alias
pub type ShareResult<T> = Result<T, ShareError>;

/// Share-specific error variants
#[derive(Debug, Error)]
pub enum ShareError {
    /// No project behind the slug or id
    #[error("Project not found")]
    ProjectNotFound,

    /// Project is archived
    #[error("This share link is no longer available")]
    ProjectArchived,

    /// Slug already used by another project
    #[error("Share slug is already in use")]
    SlugTaken,

    /// The project's auth mode does not offer this access method
    #[error("This access method is not enabled for the project")]
    MethodNotAllowed,

    /// Wrong share password
    #[error("Invalid password")]
    InvalidPassword,

    /// Wrong, expired or exhausted one-time code
    #[error("Invalid or expired code")]
    InvalidOtp,

    /// Session missing, expired, revoked or outdated
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Session fingerprint mismatch
    #[error("Session fingerprint mismatch")]
    SessionFingerprintMismatch,

    /// Too many attempts
    #[error("Too many attempts, try again later")]
    RateLimited { retry_after_secs: u64 },

    /// Recipient not found
    #[error("Recipient not found")]
    RecipientNotFound,

    /// Recipient already on the project
    #[error("Recipient already exists")]
    RecipientExists,

    /// Field validation failed
    #[error("{0}")]
    Validation(String),

    /// Password validation error
    #[error("Password validation failed: {0}")]
    PasswordValidation(String),

    /// Missing required header
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShareError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShareError::ProjectNotFound | ShareError::RecipientNotFound => StatusCode::NOT_FOUND,
            ShareError::ProjectArchived => StatusCode::GONE,
            ShareError::SlugTaken | ShareError::RecipientExists => StatusCode::CONFLICT,
            ShareError::MethodNotAllowed => StatusCode::FORBIDDEN,
            ShareError::InvalidPassword
            | ShareError::InvalidOtp
            | ShareError::SessionInvalid
            | ShareError::SessionFingerprintMismatch => StatusCode::UNAUTHORIZED,
            ShareError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ShareError::Validation(_)
            | ShareError::PasswordValidation(_)
            | ShareError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            ShareError::Database(_) | ShareError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShareError::ProjectNotFound | ShareError::RecipientNotFound => ErrorKind::NotFound,
            ShareError::ProjectArchived => ErrorKind::Gone,
            ShareError::SlugTaken | ShareError::RecipientExists => ErrorKind::Conflict,
            ShareError::MethodNotAllowed => ErrorKind::Forbidden,
            ShareError::InvalidPassword
            | ShareError::InvalidOtp
            | ShareError::SessionInvalid
            | ShareError::SessionFingerprintMismatch => ErrorKind::Unauthorized,
            ShareError::RateLimited { .. } => ErrorKind::TooManyRequests,
            ShareError::Validation(_)
            | ShareError::PasswordValidation(_)
            | ShareError::MissingHeader(_) => ErrorKind::BadRequest,
            ShareError::Database(_) | ShareError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            ShareError::Database(_) | ShareError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            ShareError::RateLimited { retry_after_secs } => {
                AppError::new(self.kind(), self.to_string()).with_retry_after(*retry_after_secs)
            }
            ShareError::SessionInvalid | ShareError::SessionFingerprintMismatch => {
                AppError::new(self.kind(), self.to_string())
                    .with_action("Open the share link again to sign in")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ShareError::Database(e) => {
                tracing::error!(error = %e, "Share database error");
            }
            ShareError::Internal(msg) => {
                tracing::error!(message = %msg, "Share internal error");
            }
            ShareError::InvalidPassword => {
                tracing::warn!("Invalid share password attempt");
            }
            ShareError::InvalidOtp => {
                tracing::warn!("Invalid one-time code attempt");
            }
            ShareError::SessionFingerprintMismatch => {
                tracing::warn!("Share session fingerprint mismatch detected");
            }
            ShareError::RateLimited { .. } => {
                tracing::warn!("Share rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Share error");
            }
        }
    }
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<platform::client::FingerprintError> for ShareError {
    fn from(err: platform::client::FingerprintError) -> Self {
        match err {
            platform::client::FingerprintError::MissingHeader(header) => {
                ShareError::MissingHeader(header)
            }
        }
    }
}
