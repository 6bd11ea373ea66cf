//! Content Error Types
//!
//! Media endpoints answer with a bare status code. Players and `<img>`
//! tags cannot use a problem document, and details would only help
//! someone probing tokens.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::storage::StorageError;
use review::ReviewError;
use share::ShareError;
use thiserror::Error;

/// Content-specific result type alias
pub type ContentResult<T> = Result<T, ContentError>;

/// Content-specific error variants
#[derive(Debug, Error)]
pub enum ContentError {
    /// Malformed, forged or expired token
    #[error("Invalid content token")]
    InvalidToken,

    /// Share session behind the token is gone
    #[error("Share session is no longer valid")]
    SessionInvalid,

    /// Token used from another client
    #[error("Content token fingerprint mismatch")]
    FingerprintMismatch,

    /// Embedded on a foreign site
    #[error("Hotlinking from {0} is not allowed")]
    HotlinkBlocked(String),

    /// Unknown video or asset, or not visible to this viewer
    #[error("Content not found")]
    NotFound,

    /// Guests never download
    #[error("Guests cannot download")]
    GuestNotAllowed,

    #[error("Downloads are disabled for this project")]
    DownloadsDisabled,

    /// Downloads unlock with approval
    #[error("Video is not approved yet")]
    NotApproved,

    #[error("Too many requests")]
    RateLimited { retry_after_secs: u64 },

    /// Missing required header
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Repository failure in the review context
    #[error(transparent)]
    Review(ReviewError),

    /// Repository failure in the share context
    #[error(transparent)]
    Share(ShareError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ContentError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContentError::InvalidToken | ContentError::SessionInvalid => StatusCode::UNAUTHORIZED,
            ContentError::FingerprintMismatch
            | ContentError::HotlinkBlocked(_)
            | ContentError::GuestNotAllowed
            | ContentError::DownloadsDisabled
            | ContentError::NotApproved => StatusCode::FORBIDDEN,
            ContentError::NotFound => StatusCode::NOT_FOUND,
            ContentError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ContentError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            ContentError::Review(e) => e.status_code(),
            ContentError::Share(e) => e.status_code(),
            ContentError::Storage(_) | ContentError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContentError::InvalidToken | ContentError::SessionInvalid => ErrorKind::Unauthorized,
            ContentError::FingerprintMismatch
            | ContentError::HotlinkBlocked(_)
            | ContentError::GuestNotAllowed
            | ContentError::DownloadsDisabled
            | ContentError::NotApproved => ErrorKind::Forbidden,
            ContentError::NotFound => ErrorKind::NotFound,
            ContentError::RateLimited { .. } => ErrorKind::TooManyRequests,
            ContentError::MissingHeader(_) => ErrorKind::BadRequest,
            ContentError::Review(e) => e.kind(),
            ContentError::Share(e) => e.kind(),
            ContentError::Storage(_) | ContentError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError (for callers composing JSON APIs)
    pub fn to_app_error(&self) -> AppError {
        match self {
            ContentError::Storage(_) | ContentError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            ContentError::RateLimited { retry_after_secs } => {
                AppError::new(self.kind(), self.to_string()).with_retry_after(*retry_after_secs)
            }
            ContentError::Review(e) => e.to_app_error(),
            ContentError::Share(e) => e.to_app_error(),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ContentError::Storage(msg) => {
                tracing::error!(message = %msg, "Content storage error");
            }
            ContentError::Internal(msg) => {
                tracing::error!(message = %msg, "Content internal error");
            }
            ContentError::Review(e) if e.status_code().is_server_error() => {
                tracing::error!(error = %e, "Content lookup failed");
            }
            ContentError::Share(e) if e.status_code().is_server_error() => {
                tracing::error!(error = %e, "Content session check failed");
            }
            ContentError::FingerprintMismatch => {
                tracing::warn!("Content token used from another client");
            }
            ContentError::HotlinkBlocked(host) => {
                tracing::warn!(source = %host, "Hotlink blocked");
            }
            ContentError::RateLimited { .. } => {
                tracing::warn!("Content rate limit exceeded");
            }
            _ => {
                tracing::debug!(error = %self, "Content error");
            }
        }
    }
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        self.log();

        let mut response = self.status_code().into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("private, no-store"),
        );
        if let ContentError::RateLimited { retry_after_secs } = self {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

impl From<ReviewError> for ContentError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::VideoNotFound | ReviewError::ProjectNotFound => ContentError::NotFound,
            other => ContentError::Review(other),
        }
    }
}

impl From<ShareError> for ContentError {
    fn from(err: ShareError) -> Self {
        match err {
            ShareError::SessionInvalid | ShareError::ProjectArchived => ContentError::SessionInvalid,
            ShareError::SessionFingerprintMismatch => ContentError::FingerprintMismatch,
            ShareError::MissingHeader(h) => ContentError::MissingHeader(h),
            other => ContentError::Share(other),
        }
    }
}

impl From<StorageError> for ContentError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => ContentError::NotFound,
            StorageError::InvalidPath => {
                tracing::warn!("Stored path escapes the storage root");
                ContentError::NotFound
            }
            other => ContentError::Storage(other.to_string()),
        }
    }
}

impl From<platform::client::FingerprintError> for ContentError {
    fn from(err: platform::client::FingerprintError) -> Self {
        match err {
            platform::client::FingerprintError::MissingHeader(h) => ContentError::MissingHeader(h),
        }
    }
}
