//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, HMAC, Base64)
//! - Signed tokens (sessions, content access)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cookie management and client identification
//! - Rate limiting infrastructure
//! - Rooted local file storage for media

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod password;
pub mod rate_limit;
pub mod storage;
pub mod token;
