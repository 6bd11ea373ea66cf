//! Domain Layer
//!
//! Content token claims, asset kinds and the hotlink policy.

pub mod claims;
pub mod value_object;

pub use claims::{ContentClaims, fingerprint_tag};
pub use value_object::{
    asset_kind::AssetKind,
    hotlink::{HotlinkMode, HotlinkPolicy, HotlinkVerdict},
};
