//! Value Objects

pub mod annotation;
pub mod asset_slot;
pub mod author_kind;
pub mod comment_body;
pub mod timecode;
pub mod video_name;
