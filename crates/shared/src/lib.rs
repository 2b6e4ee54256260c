//! Shared types for the minisource client and any Rust service speaking its API.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
