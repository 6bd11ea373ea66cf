//! Value Objects

pub mod asset_kind;
pub mod hotlink;
