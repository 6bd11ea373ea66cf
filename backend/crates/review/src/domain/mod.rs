//! Domain Layer
//!
//! Videos, their versions and derived assets; comments and approvals.

pub mod entity;
pub mod repository;
pub mod value_object;

pub use entity::{
    comment::{Comment, CommentAuthor, CommentThread},
    video::Video,
};
pub use repository::{CommentRepository, ReviewStore, VideoRepository};
pub use value_object::{
    annotation::Annotation, asset_slot::AssetSlot, author_kind::AuthorKind,
    comment_body::CommentBody, timecode::Timecode, video_name::VideoName,
};
