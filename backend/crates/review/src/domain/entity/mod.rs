//! Domain Entities

pub mod comment;
pub mod video;
