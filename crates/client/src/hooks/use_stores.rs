//! Component hooks that mirror the stores into Dioxus signals.

use dioxus::prelude::*;
use futures_channel::mpsc::UnboundedReceiver;
use futures_util::StreamExt;
use minisource_shared::{ApiError, User};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app::use_app;
use crate::storage::Storage;
use crate::stores::{Session, Toast, UiState};

/// Seed a signal from a store and keep it in sync with later changes.
fn use_store_signal<T: Clone + 'static>(
    initial: impl FnOnce() -> T,
    subscribe: impl FnOnce() -> UnboundedReceiver<T>,
) -> Signal<T> {
    let mut value = use_signal(initial);
    use_hook(|| {
        let mut updates = subscribe();
        spawn(async move {
            while let Some(next) = updates.next().await {
                value.set(next);
            }
        })
    });
    value
}

pub fn use_session() -> Signal<Session> {
    let app = use_app();
    let session = app.session.clone();
    use_store_signal(move || app.session.snapshot(), move || session.subscribe())
}

pub fn use_ui_state() -> Signal<UiState> {
    let app = use_app();
    let ui = app.ui.clone();
    use_store_signal(move || app.ui.snapshot(), move || ui.subscribe())
}

pub fn use_toasts() -> Signal<Vec<Toast>> {
    let app = use_app();
    let toasts = app.toasts.clone();
    use_store_signal(move || app.toasts.toasts(), move || toasts.subscribe())
}

/// The signed-in user's profile. Re-runs when the session changes; resolves
/// to `None` while signed out.
pub fn use_current_user() -> Resource<Option<Result<User, ApiError>>> {
    let app = use_app();
    let session = use_session();
    use_resource(move || {
        let auth = app.auth.clone();
        // Subscribe to sign-in and sign-out.
        let _signed_in = session.read().is_authenticated;
        async move { auth.current_user().await }
    })
}

/// A JSON value persisted under `key`, readable as a signal.
pub struct LocalStorageValue<T: 'static> {
    key: String,
    initial: T,
    value: Signal<T>,
    storage: Storage,
}

impl<T: Clone + 'static> Clone for LocalStorageValue<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            initial: self.initial.clone(),
            value: self.value,
            storage: self.storage.clone(),
        }
    }
}

impl<T> LocalStorageValue<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
{
    pub fn get(&self) -> T {
        self.value.cloned()
    }

    pub fn signal(&self) -> Signal<T> {
        self.value
    }

    pub fn set(&mut self, value: T) {
        if !self.storage.save(&self.key, &value) {
            crate::log_warn!("could not persist {}", self.key);
        }
        self.value.set(value);
    }

    /// Forget the stored value and fall back to the initial one.
    pub fn remove(&mut self) {
        self.storage.remove(&self.key);
        self.value.set(self.initial.clone());
    }
}

pub fn use_local_storage<T>(key: &str, initial: T) -> LocalStorageValue<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
{
    let storage = use_app().storage;
    let key = key.to_string();
    let stored = {
        let storage = storage.clone();
        let key = key.clone();
        let initial = initial.clone();
        move || storage.load(&key).unwrap_or(initial)
    };
    let value = use_signal(stored);
    use_hook(move || LocalStorageValue {
        key,
        initial,
        value,
        storage,
    })
}
