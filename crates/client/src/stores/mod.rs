//! Client-side state containers.
//!
//! Each store is a cloneable handle with a snapshot read, named mutations and
//! a subscription stream. Nothing outside a store assigns its fields.

mod observable;

pub mod session;
pub mod toasts;
pub mod ui;

pub use session::{PersistedSession, Session, SessionStore, SESSION_STORAGE_KEY};
pub use toasts::{
    Toast, ToastKind, ToastStore, DEFAULT_TOAST_DURATION, ERROR_TOAST_DURATION,
};
pub use ui::{Theme, UiState, UiStore};
