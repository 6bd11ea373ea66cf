//! `From` conversions into [`AppError`]
//!
//! Messages stay generic; the source error is kept for logs only.

use super::app_error::AppError;
use super::kind::ErrorKind;

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind as Io;

        let kind = match err.kind() {
            Io::NotFound => ErrorKind::NotFound,
            Io::PermissionDenied => ErrorKind::Forbidden,
            Io::TimedOut | Io::WouldBlock => ErrorKind::ServiceUnavailable,
            _ => ErrorKind::InternalServerError,
        };
        AppError::new(kind, "Storage operation failed").with_source(err)
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::bad_request("Invalid identifier").with_source(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Syntax
            | serde_json::error::Category::Data
            | serde_json::error::Category::Eof => {
                AppError::bad_request(format!("Malformed JSON: {err}")).with_source(err)
            }
            _ => AppError::internal("JSON serialization error").with_source(err),
        }
    }
}

/// Postgres SQLSTATE to an API error
///
/// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
#[cfg(feature = "sqlx")]
fn from_sqlstate(code: &str) -> AppError {
    match code {
        // unique_violation: duplicate slug, recipient or video version
        "23505" => AppError::conflict("Already exists"),
        "23503" => AppError::conflict("Referenced record is missing or still in use"),
        "23502" | "23514" => AppError::bad_request("Value violates a column constraint"),
        "40001" | "40P01" => AppError::service_unavailable("Concurrent update, please retry"),
        _ if code.starts_with("23") => AppError::conflict("Integrity constraint violation"),
        _ if code.starts_with("53") || code.starts_with("57") => {
            AppError::service_unavailable("Database unavailable")
        }
        _ => AppError::internal("Database error"),
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let mapped = match &err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::service_unavailable("Database unavailable")
            }
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) => from_sqlstate(&code),
                None => AppError::internal("Database error"),
            },
            _ => AppError::internal("Database error"),
        };
        mapped.with_source(err)
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{HeaderValue, StatusCode, header};

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // RFC 9457 problem details
        let body = serde_json::json!({
            "type": "about:blank",
            "title": self.kind().as_str(),
            "status": status.as_u16(),
            "code": self.kind(),
            "detail": self.message(),
            "action": self.action(),
        });

        let mut response = (status, body.to_string()).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        if let Some(secs) = self.retry_after_secs() {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kinds() {
        let cases = [
            (std::io::ErrorKind::NotFound, ErrorKind::NotFound),
            (std::io::ErrorKind::PermissionDenied, ErrorKind::Forbidden),
            (std::io::ErrorKind::TimedOut, ErrorKind::ServiceUnavailable),
            (std::io::ErrorKind::Other, ErrorKind::InternalServerError),
        ];
        for (io, expected) in cases {
            let err: AppError = std::io::Error::new(io, "disk").into();
            assert_eq!(err.kind(), expected);
        }
    }

    #[test]
    fn test_bad_input_is_400() {
        let err: AppError = uuid::Uuid::parse_str("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        // Truncated body
        let err: AppError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::BadRequest);

        let err: AppError = serde_json::from_str::<serde_json::Value>("{]").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[cfg(feature = "sqlx")]
    #[test]
    fn test_sqlstate_mapping() {
        assert_eq!(from_sqlstate("23505").kind(), ErrorKind::Conflict);
        assert_eq!(from_sqlstate("23001").kind(), ErrorKind::Conflict);
        assert_eq!(from_sqlstate("23514").kind(), ErrorKind::BadRequest);
        assert_eq!(from_sqlstate("57P01").kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(from_sqlstate("42P01").kind(), ErrorKind::InternalServerError);
    }

    #[cfg(feature = "axum")]
    #[test]
    fn test_problem_response_headers() {
        use axum::http::header;
        use axum::response::IntoResponse;

        let response = AppError::too_many_requests("slow down")
            .with_retry_after(30)
            .into_response();
        assert_eq!(response.status().as_u16(), 429);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "30");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
    }
}
