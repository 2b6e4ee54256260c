//! Cross-platform persistent storage.
//!
//! [`Storage`] is a cloneable handle over a [`KeyValueStore`] backend:
//! - Web: `localStorage`
//! - Desktop: JSON files in the platform-appropriate config directory:
//!   - Linux: `~/.config/minisource/`
//!   - macOS: `~/Library/Application Support/minisource/`
//!   - Windows: `%APPDATA%\minisource\`
//! - [`MemoryStorage`] for tests and contexts without a client-side store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{de::DeserializeOwned, Serialize};

/// Key holding the bare access token read by the transport's request stage.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Raw string key/value backend.
pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Returns `true` if the value was written.
    fn set_raw(&self, key: &str, value: &str) -> bool;

    fn remove_raw(&self, key: &str);

    /// Whether a client-side store exists at all (false e.g. outside a browser window).
    fn is_available(&self) -> bool {
        true
    }
}

/// Shared handle to a storage backend with typed JSON helpers.
#[derive(Clone)]
pub struct Storage {
    backend: Rc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Rc::new(backend),
        }
    }

    /// The platform store: `localStorage` on web, config-dir files on desktop.
    pub fn local() -> Self {
        Self::new(LocalStorage::default())
    }

    pub fn memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Save a value as JSON. Returns `true` if the operation succeeded.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(json) => self.backend.set_raw(key, &json),
            Err(err) => {
                crate::log_warn!("failed to encode {key}: {err}");
                false
            }
        }
    }

    /// Load a JSON value.
    ///
    /// Returns `None` if the key doesn't exist or deserialization fails.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = self.backend.get_raw(key)?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(err) => {
                crate::log_warn!("ignoring malformed {key}: {err}");
                None
            }
        }
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.backend.get_raw(key)
    }

    pub fn set_raw(&self, key: &str, value: &str) -> bool {
        self.backend.set_raw(key, value)
    }

    pub fn remove(&self, key: &str) {
        self.backend.remove_raw(key);
    }

    pub fn exists(&self, key: &str) -> bool {
        self.backend.get_raw(key).is_some()
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("available", &self.is_available())
            .finish()
    }
}

/// The persisted access token, stored as a bare string.
#[derive(Debug, Clone)]
pub struct AccessTokenStore {
    storage: Storage,
}

impl AccessTokenStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The stored token, if any. Always `None` without a client-side store.
    pub fn get(&self) -> Option<String> {
        if !self.storage.is_available() {
            return None;
        }
        self.storage
            .get_raw(ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    pub fn set(&self, token: &str) {
        if !self.storage.set_raw(ACCESS_TOKEN_KEY, token) {
            crate::log_warn!("access token was not persisted");
        }
    }

    pub fn clear(&self) {
        self.storage.remove(ACCESS_TOKEN_KEY);
    }
}

// =========================================
// In-memory implementation
// =========================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn remove_raw(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

// =========================================
// Web (WASM) implementation
// =========================================

/// Browser `localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set_raw(&self, key: &str, value: &str) -> bool {
        Self::storage().is_some_and(|storage| storage.set_item(key, value).is_ok())
    }

    fn remove_raw(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }

    fn is_available(&self) -> bool {
        Self::storage().is_some()
    }
}

// =========================================
// Desktop (native) implementation
// =========================================

/// One JSON file per key under a directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorage {
    dir: Option<std::path::PathBuf>,
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for LocalStorage {
    fn default() -> Self {
        Self {
            dir: dirs::config_dir().map(|dir| dir.join("minisource")),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorage {
    pub fn in_dir(dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    fn file_path(&self, key: &str) -> Option<std::path::PathBuf> {
        let dir = self.dir.as_ref()?;
        // Sanitize key to be a valid filename
        let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        Some(dir.join(format!("{safe_key}.json")))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for LocalStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        let path = self.file_path(key)?;
        std::fs::read_to_string(path).ok()
    }

    fn set_raw(&self, key: &str, value: &str) -> bool {
        let Some(path) = self.file_path(key) else {
            return false;
        };
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return false;
            }
        }
        std::fs::write(path, value).is_ok()
    }

    fn remove_raw(&self, key: &str) {
        if let Some(path) = self.file_path(key) {
            let _ = std::fs::remove_file(path);
        }
    }

    fn is_available(&self) -> bool {
        self.dir.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        compact: bool,
    }

    #[test]
    fn json_values_round_trip_through_memory() {
        let storage = Storage::memory();
        assert!(storage.save("prefs", &Prefs { compact: true }));
        assert_eq!(storage.load::<Prefs>("prefs"), Some(Prefs { compact: true }));
        storage.remove("prefs");
        assert!(!storage.exists("prefs"));
    }

    #[test]
    fn malformed_json_loads_as_none() {
        let storage = Storage::memory();
        storage.set_raw("prefs", "{not json");
        assert_eq!(storage.load::<Prefs>("prefs"), None);
    }

    #[test]
    fn access_token_is_stored_bare() {
        let storage = Storage::memory();
        let tokens = AccessTokenStore::new(storage.clone());
        tokens.set("a1");
        assert_eq!(storage.get_raw(ACCESS_TOKEN_KEY).as_deref(), Some("a1"));
        assert_eq!(tokens.get().as_deref(), Some("a1"));
        tokens.clear();
        assert_eq!(tokens.get(), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn files_persist_across_handles() {
        let dir = std::env::temp_dir().join(format!("minisource-{}", uuid::Uuid::new_v4()));
        let first = Storage::new(LocalStorage::in_dir(&dir));
        assert!(first.save("auth/storage", &Prefs { compact: false }));

        let second = Storage::new(LocalStorage::in_dir(&dir));
        assert_eq!(second.load::<Prefs>("auth/storage"), Some(Prefs { compact: false }));
        second.remove("auth/storage");
        assert!(!first.exists("auth/storage"));

        let _ = std::fs::remove_dir_all(dir);
    }
}
