//! Minisource client
//!
//! Typed access to the backend API plus the client-side state that goes with
//! it: the persisted session, UI state, notifications and a query cache.
//! The Dioxus components, hooks and router live behind the `ui` feature.

pub mod logging;

pub mod api;
pub mod app;
pub mod config;
pub mod hooks;
pub mod query;
pub mod storage;
pub mod stores;
pub mod timer;
pub mod viewport;

#[cfg(feature = "ui")]
pub mod components;
#[cfg(feature = "ui")]
pub mod routes;
#[cfg(feature = "ui")]
pub mod views;

pub use api::{ApiClient, AuthApi, UserApi};
pub use app::AppContext;
pub use config::AppConfig;
pub use hooks::{AuthHooks, TokenRefresher};
pub use query::{QueryClient, QueryKey};
pub use storage::{AccessTokenStore, Storage};
pub use stores::{SessionStore, ToastStore, UiStore};

#[cfg(feature = "ui")]
pub use routes::Route;
