//! Application-wide wiring: one place that builds every service and store.

use std::rc::Rc;

use crate::api::{ApiClient, AuthApi, UserApi};
use crate::config::AppConfig;
use crate::hooks::{AuthHooks, TokenRefresher};
use crate::query::QueryClient;
use crate::storage::{AccessTokenStore, Storage};
use crate::stores::{SessionStore, ToastStore, UiStore};

/// Everything a view needs. Clones share state.
#[derive(Clone)]
pub struct AppContext {
    pub storage: Storage,
    pub client: ApiClient,
    pub session: SessionStore,
    pub ui: UiStore,
    pub toasts: ToastStore,
    pub queries: QueryClient,
    pub auth: AuthHooks,
}

impl AppContext {
    /// Production wiring against the platform's local storage.
    pub fn new(config: &AppConfig) -> Self {
        let storage = Storage::local();
        let client = ApiClient::new(config, AccessTokenStore::new(storage.clone()));
        Self::with_client(client, storage)
    }

    /// Wire the stores around an existing client. The client must read its
    /// bearer token from the same `storage`.
    pub fn with_client(client: ApiClient, storage: Storage) -> Self {
        let session = SessionStore::new(storage.clone());
        let toasts = ToastStore::new();
        let queries = QueryClient::new();
        let auth = AuthHooks::new(
            client.clone(),
            session.clone(),
            AccessTokenStore::new(storage.clone()),
            queries.clone(),
            toasts.clone(),
        );

        Self {
            storage,
            client,
            session,
            ui: UiStore::new(),
            toasts,
            queries,
            auth,
        }
    }

    pub fn auth_api(&self) -> AuthApi {
        AuthApi::new(self.client.clone())
    }

    pub fn user_api(&self) -> UserApi {
        UserApi::new(self.client.clone())
    }

    /// Install [`TokenRefresher`] so 401s trigger one refresh-and-retry.
    pub fn enable_token_refresh(&self) {
        let refresher = TokenRefresher::new(
            &self.client,
            self.session.clone(),
            AccessTokenStore::new(self.storage.clone()),
        );
        self.client.set_unauthorized_handler(Rc::new(refresher));
    }
}

#[cfg(feature = "ui")]
pub use provider::{use_app, AppProvider};

#[cfg(feature = "ui")]
mod provider {
    use dioxus::prelude::*;

    use super::AppContext;
    use crate::config::AppConfig;

    /// Provides [`AppContext`] to every descendant.
    #[component]
    pub fn AppProvider(children: Element) -> Element {
        use_context_provider(|| {
            let config = AppConfig::global();
            crate::log_info!(
                "{} v{} using API {}",
                config.app.name,
                config.app.version,
                config.api.base_url
            );
            AppContext::new(config)
        });

        children
    }

    pub fn use_app() -> AppContext {
        use_context::<AppContext>()
    }
}
