//! Error Kind - Classification of errors
//!
//! [`ErrorKind`] の各バリアントは HTTP ステータスと理由フレーズの組で定義する。
//! 表は `error_kinds!` 一箇所にまとめてあり、`status_code` と `as_str` は
//! そこから生成される。

use serde::Serialize;

macro_rules! error_kinds {
    ($($(#[$doc:meta])* $variant:ident = $code:literal, $phrase:literal;)*) => {
        /// エラー種別の列挙体
        ///
        /// ```rust
        /// use kernel::error::kind::ErrorKind;
        ///
        /// assert_eq!(ErrorKind::NotFound.status_code(), 404);
        /// assert_eq!(ErrorKind::RangeNotSatisfiable.as_str(), "Range Not Satisfiable");
        /// ```
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        #[non_exhaustive]
        pub enum ErrorKind {
            $($(#[$doc])* $variant,)*
        }

        impl ErrorKind {
            /// HTTP ステータスコード
            #[inline]
            pub const fn status_code(&self) -> u16 {
                match self {
                    $(Self::$variant => $code,)*
                }
            }

            /// 標準の理由フレーズ（problem+json の `title`）
            #[inline]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $phrase,)*
                }
            }
        }
    };
}

error_kinds! {
    BadRequest = 400, "Bad Request";
    Unauthorized = 401, "Unauthorized";
    Forbidden = 403, "Forbidden";
    NotFound = 404, "Not Found";
    Conflict = 409, "Conflict";
    /// アーカイブ済みの共有ページ
    Gone = 410, "Gone";
    /// アップロードサイズ超過
    PayloadTooLarge = 413, "Payload Too Large";
    /// 動画以外のアップロード
    UnsupportedMediaType = 415, "Unsupported Media Type";
    RangeNotSatisfiable = 416, "Range Not Satisfiable";
    UnprocessableEntity = 422, "Unprocessable Entity";
    /// 管理者アカウントの一時ロック
    Locked = 423, "Locked";
    TooManyRequests = 429, "Too Many Requests";
    InternalServerError = 500, "Internal Server Error";
    ServiceUnavailable = 503, "Service Unavailable";
}

impl ErrorKind {
    /// 5xx（ログに残すもの）
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    #[inline]
    pub const fn is_client_error(&self) -> bool {
        matches!(self.status_code(), 400..=499)
    }

    /// 共有ページのフロントエンドはこの種別で認証画面へ戻す
    #[inline]
    pub const fn is_auth_error(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_statuses() {
        let table = [
            (ErrorKind::Gone, 410),
            (ErrorKind::PayloadTooLarge, 413),
            (ErrorKind::UnsupportedMediaType, 415),
            (ErrorKind::RangeNotSatisfiable, 416),
            (ErrorKind::Locked, 423),
            (ErrorKind::TooManyRequests, 429),
        ];
        for (kind, code) in table {
            assert_eq!(kind.status_code(), code, "{kind}");
        }
    }

    #[test]
    fn test_error_classes() {
        assert!(ErrorKind::InternalServerError.is_server_error());
        assert!(!ErrorKind::Locked.is_server_error());
        assert!(ErrorKind::RangeNotSatisfiable.is_client_error());
        assert!(!ErrorKind::ServiceUnavailable.is_client_error());
        assert!(ErrorKind::Forbidden.is_auth_error());
        assert!(!ErrorKind::Gone.is_auth_error());
    }

    #[test]
    fn test_serialized_code() {
        let json = serde_json::to_string(&ErrorKind::TooManyRequests).unwrap();
        assert_eq!(json, "\"TOO_MANY_REQUESTS\"");
        assert_eq!(ErrorKind::NotFound.to_string(), "Not Found");
    }
}
