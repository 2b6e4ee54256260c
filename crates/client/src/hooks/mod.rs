//! Stateful operations that tie the service façades to the stores, plus the
//! component hooks that expose them to views.

pub mod auth;
#[cfg(feature = "ui")]
pub mod use_stores;
#[cfg(feature = "ui")]
pub mod use_viewport;

pub use auth::{AuthHooks, TokenRefresher};
#[cfg(feature = "ui")]
pub use use_stores::{
    use_current_user, use_local_storage, use_session, use_toasts, use_ui_state,
    LocalStorageValue,
};
#[cfg(feature = "ui")]
pub use use_viewport::{
    use_debounce, use_is_desktop, use_is_mobile, use_is_tablet, use_media_query,
    use_window_size,
};
