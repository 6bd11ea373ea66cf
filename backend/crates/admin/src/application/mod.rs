//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.

pub mod bootstrap;
pub mod check_session;
pub mod config;
pub mod session_token;
pub mod sign_in;
pub mod sign_out;

pub use bootstrap::BootstrapAdminUseCase;
pub use check_session::CheckAdminSessionUseCase;
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
