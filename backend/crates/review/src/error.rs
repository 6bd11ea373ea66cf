//! Review Error Types
//!
//! Review-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::storage::StorageError;
use share::ShareError;
use thiserror::Error;

/// Review-specific result type alias
pub type ReviewResult<T> = Result<T, ReviewError>;

/// Review-specific error variants
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Project not found")]
    ProjectNotFound,

    /// Project is archived; no uploads or feedback
    #[error("Project is archived")]
    ProjectArchived,

    /// Unknown video, or a video of another project
    #[error("Video not found")]
    VideoNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    /// Guests may only watch
    #[error("Guest access is view-only")]
    GuestNotAllowed,

    /// Only the session that wrote a comment may delete it
    #[error("You can only delete your own comments")]
    NotCommentAuthor,

    /// Two uploads raced for the same version number
    #[error("Another version was uploaded at the same time, try again")]
    VersionConflict,

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("File exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// Too many comments
    #[error("Too many requests, try again later")]
    RateLimited { retry_after_secs: u64 },

    /// Field validation failed
    #[error("{0}")]
    Validation(String),

    /// Error from the share context (session, project lookup)
    #[error(transparent)]
    Share(#[from] ShareError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReviewError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ReviewError::ProjectNotFound
            | ReviewError::VideoNotFound
            | ReviewError::CommentNotFound => StatusCode::NOT_FOUND,
            ReviewError::ProjectArchived => StatusCode::GONE,
            ReviewError::GuestNotAllowed | ReviewError::NotCommentAuthor => StatusCode::FORBIDDEN,
            ReviewError::VersionConflict => StatusCode::CONFLICT,
            ReviewError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ReviewError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ReviewError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ReviewError::Validation(_) => StatusCode::BAD_REQUEST,
            ReviewError::Share(e) => e.status_code(),
            ReviewError::Database(_) | ReviewError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReviewError::ProjectNotFound
            | ReviewError::VideoNotFound
            | ReviewError::CommentNotFound => ErrorKind::NotFound,
            ReviewError::ProjectArchived => ErrorKind::Gone,
            ReviewError::GuestNotAllowed | ReviewError::NotCommentAuthor => ErrorKind::Forbidden,
            ReviewError::VersionConflict => ErrorKind::Conflict,
            ReviewError::UnsupportedMediaType(_) => ErrorKind::UnsupportedMediaType,
            ReviewError::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            ReviewError::RateLimited { .. } => ErrorKind::TooManyRequests,
            ReviewError::Validation(_) => ErrorKind::BadRequest,
            ReviewError::Share(e) => e.kind(),
            ReviewError::Database(_) | ReviewError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            ReviewError::Database(_) | ReviewError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            ReviewError::RateLimited { retry_after_secs } => {
                AppError::new(self.kind(), self.to_string()).with_retry_after(*retry_after_secs)
            }
            ReviewError::Share(e) => e.to_app_error(),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ReviewError::Database(e) => {
                tracing::error!(error = %e, "Review database error");
            }
            ReviewError::Internal(msg) => {
                tracing::error!(message = %msg, "Review internal error");
            }
            ReviewError::Share(ShareError::Database(e)) => {
                tracing::error!(error = %e, "Share database error");
            }
            ReviewError::Share(ShareError::Internal(msg)) => {
                tracing::error!(message = %msg, "Share internal error");
            }
            ReviewError::RateLimited { .. } => {
                tracing::warn!("Review rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Review error");
            }
        }
    }
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<StorageError> for ReviewError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TooLarge { limit } => ReviewError::PayloadTooLarge { limit },
            StorageError::Body(msg) => ReviewError::Validation(format!("Upload interrupted: {msg}")),
            other => ReviewError::Internal(format!("Storage failed: {other}")),
        }
    }
}
