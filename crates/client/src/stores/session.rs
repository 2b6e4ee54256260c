//! Authentication session store with persistence.
//!
//! The store is the single source of truth for who is signed in. Every
//! mutation writes `(user, tokens, isAuthenticated)` to storage; the store is
//! rehydrated from the same key when constructed.

use std::rc::Rc;

use futures_channel::mpsc::UnboundedReceiver;
use minisource_shared::{AuthTokens, AuthUser, AuthUserUpdate};
use serde::{Deserialize, Serialize};

use super::observable::Observable;
use crate::storage::Storage;

/// Storage key holding the persisted session envelope.
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

const SESSION_VERSION: u32 = 0;

/// Snapshot of the authenticated session.
///
/// `is_authenticated` is true if and only if both `user` and `tokens` are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<AuthUser>,
    pub tokens: Option<AuthTokens>,
    pub is_authenticated: bool,
    /// Set once the store has read storage. Never persisted.
    pub has_hydrated: bool,
}

impl Session {
    pub fn access_token(&self) -> Option<&str> {
        self.tokens.as_ref().map(|t| t.access_token.as_str())
    }

    /// The fields that survive a reload.
    pub fn persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.user.clone(),
            tokens: self.tokens.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    fn reset(&mut self) {
        self.user = None;
        self.tokens = None;
        self.is_authenticated = false;
    }
}

/// Persisted form of a [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub user: Option<AuthUser>,
    pub tokens: Option<AuthTokens>,
    pub is_authenticated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: PersistedSession,
    #[serde(default)]
    version: u32,
}

/// Cloneable handle to the session store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<Inner>,
}

struct Inner {
    state: Observable<Session>,
    storage: Storage,
}

impl SessionStore {
    /// Create the store and restore any persisted session.
    ///
    /// Missing or malformed persisted state yields the empty session.
    pub fn new(storage: Storage) -> Self {
        let restored = storage
            .load::<Envelope>(SESSION_STORAGE_KEY)
            .map(|envelope| envelope.state)
            .unwrap_or_default();

        let is_authenticated =
            restored.is_authenticated && restored.user.is_some() && restored.tokens.is_some();
        if restored.is_authenticated && !is_authenticated {
            crate::log_warn!("persisted session was incomplete; signing out");
        }

        let session = Session {
            user: restored.user,
            tokens: restored.tokens,
            is_authenticated,
            has_hydrated: true,
        };

        Self {
            inner: Rc::new(Inner {
                state: Observable::new(session),
                storage,
            }),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.with(|s| s.is_authenticated)
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.inner.state.with(|s| s.user.clone())
    }

    pub fn tokens(&self) -> Option<AuthTokens> {
        self.inner.state.with(|s| s.tokens.clone())
    }

    /// Receive a snapshot after every mutation.
    pub fn subscribe(&self) -> UnboundedReceiver<Session> {
        self.inner.state.subscribe()
    }

    /// Replace user and tokens and mark the session authenticated.
    pub fn set_auth(&self, user: AuthUser, tokens: AuthTokens) {
        self.mutate(|s| {
            s.user = Some(user);
            s.tokens = Some(tokens);
            s.is_authenticated = true;
        });
    }

    /// Reset to the empty session. Idempotent.
    pub fn clear_auth(&self) {
        self.mutate(Session::reset);
    }

    /// Merge fields into the current user. No-op when nobody is signed in.
    pub fn update_user(&self, update: AuthUserUpdate) {
        self.mutate(|s| {
            if let Some(user) = s.user.as_mut() {
                user.apply(update);
            }
        });
    }

    /// Replace the token set only.
    pub fn update_tokens(&self, tokens: AuthTokens) {
        self.mutate(|s| s.tokens = Some(tokens));
    }

    fn mutate(&self, f: impl FnOnce(&mut Session)) {
        let snapshot = self.inner.state.update(f);
        let envelope = Envelope {
            state: snapshot.persisted(),
            version: SESSION_VERSION,
        };
        if !self.inner.storage.save(SESSION_STORAGE_KEY, &envelope) {
            crate::log_warn!("session was not persisted");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("is_authenticated", &self.is_authenticated())
            .finish()
    }
}
