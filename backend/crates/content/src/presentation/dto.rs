//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::IssuedContentToken;
use crate::domain::value_object::asset_kind::AssetKind;

/// Token request; an empty object asks for the streaming preview
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueTokenRequest {
    pub asset: AssetKind,
    pub download: bool,
}

/// Token response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenResponse {
    pub token: String,
    /// `/api/content/{token}`
    pub url: String,
    pub expires_at_ms: i64,
}

impl From<IssuedContentToken> for IssueTokenResponse {
    fn from(issued: IssuedContentToken) -> Self {
        Self {
            token: issued.token,
            url: issued.url,
            expires_at_ms: issued.expires_at_ms,
        }
    }
}
