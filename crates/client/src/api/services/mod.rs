//! Per-domain façades over [`ApiClient`](super::ApiClient).

pub mod auth;
pub mod user;

pub use auth::AuthApi;
pub use user::UserApi;
