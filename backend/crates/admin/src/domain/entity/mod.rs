pub mod admin_session;
pub mod admin_user;
