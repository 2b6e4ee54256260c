//! Authentication mutations and the current-user query.
//!
//! Each mutation keeps the session store, the raw access token, the query
//! cache and the notification list consistent with one another.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures_util::future::{FutureExt, LocalBoxFuture, Shared};
use minisource_shared::{ApiError, AuthResponse, LoginCredentials, RegisterCredentials, User};

use crate::api::{ApiClient, AuthApi, UnauthorizedHandler, UserApi};
use crate::query::{query_keys, CacheTime, QueryClient, QueryOptions};
use crate::storage::AccessTokenStore;
use crate::stores::{SessionStore, ToastStore};

pub const LOGIN_SUCCESS: &str = "Login successful!";
pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTER_SUCCESS: &str = "Registration successful!";
pub const REGISTER_FAILED: &str = "Registration failed";
pub const LOGOUT_SUCCESS: &str = "Logged out successfully";
pub const RESET_LINK_SENT: &str = "Password reset link sent to your email";
pub const PASSWORD_RESET: &str = "Password reset successful! Please sign in.";

#[derive(Clone)]
pub struct AuthHooks {
    auth: AuthApi,
    users: UserApi,
    session: SessionStore,
    tokens: AccessTokenStore,
    queries: QueryClient,
    toasts: ToastStore,
}

impl AuthHooks {
    pub fn new(
        client: ApiClient,
        session: SessionStore,
        tokens: AccessTokenStore,
        queries: QueryClient,
        toasts: ToastStore,
    ) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            users: UserApi::new(client),
            session,
            tokens,
            queries,
            toasts,
        }
    }

    /// Profile of the signed-in user, served from cache for
    /// [`CacheTime::MEDIUM`]. `None` while signed out, in which case no
    /// request is made.
    pub async fn current_user(&self) -> Option<Result<User, ApiError>> {
        if !self.session.is_authenticated() {
            return None;
        }
        let users = self.users.clone();
        let result = self
            .queries
            .fetch_query(
                query_keys::user_profile(),
                QueryOptions::stale_after(CacheTime::MEDIUM),
                move || async move { users.get_profile().await },
            )
            .await;
        Some(result)
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        let result = self.auth.login(credentials).await;
        self.finish_sign_in(result, LOGIN_SUCCESS, LOGIN_FAILED)
    }

    pub async fn register(
        &self,
        credentials: &RegisterCredentials,
    ) -> Result<AuthResponse, ApiError> {
        let result = self.auth.register(credentials).await;
        self.finish_sign_in(result, REGISTER_SUCCESS, REGISTER_FAILED)
    }

    /// Sign out. Local state is cleared even when the server call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let result = self.auth.logout().await;

        self.session.clear_auth();
        self.tokens.clear();
        self.queries.clear();

        match &result {
            Ok(()) => {
                crate::log_info!("signed out");
                self.toasts.success(LOGOUT_SUCCESS);
            }
            Err(err) => {
                crate::log_warn!("logout request failed, cleared local session: {err}");
                self.toasts
                    .error(format!("Logged out locally: {}", message_or(err, "logout failed")));
            }
        }
        result
    }

    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let result = self.auth.forgot_password(email).await;
        self.notify(&result, RESET_LINK_SENT, "Failed to send reset link");
        result
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let result = self.auth.reset_password(token, password).await;
        self.notify(&result, PASSWORD_RESET, "Password reset failed");
        result
    }

    fn finish_sign_in(
        &self,
        result: Result<AuthResponse, ApiError>,
        success: &str,
        fallback: &str,
    ) -> Result<AuthResponse, ApiError> {
        match &result {
            Ok(response) => {
                self.session
                    .set_auth(response.user.clone(), response.tokens.clone());
                self.tokens.set(&response.tokens.access_token);
                self.queries.invalidate_queries(&query_keys::user_all());
                crate::log_info!("signed in as {}", response.user.email);
                self.toasts.success(success);
            }
            Err(err) => {
                crate::log_debug!("sign-in rejected: {err}");
                self.toasts.error(message_or(err, fallback));
            }
        }
        result
    }

    fn notify<T>(&self, result: &Result<T, ApiError>, success: &str, fallback: &str) {
        match result {
            Ok(_) => {
                self.toasts.success(success);
            }
            Err(err) => {
                self.toasts.error(message_or(err, fallback));
            }
        }
    }
}

fn message_or(err: &ApiError, fallback: &str) -> String {
    if err.message.trim().is_empty() {
        fallback.to_string()
    } else {
        err.message.clone()
    }
}

type SharedRefresh = Shared<LocalBoxFuture<'static, Option<String>>>;

/// Refreshes the token pair when a request comes back 401.
///
/// Not installed by default. Attach it with
/// [`ApiClient::set_unauthorized_handler`]. Concurrent 401s share one
/// refresh call. A rejected refresh ends the session.
pub struct TokenRefresher {
    auth: AuthApi,
    session: SessionStore,
    tokens: AccessTokenStore,
    in_flight: Rc<RefCell<Option<SharedRefresh>>>,
}

impl TokenRefresher {
    pub fn new(client: &ApiClient, session: SessionStore, tokens: AccessTokenStore) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            session,
            tokens,
            in_flight: Rc::new(RefCell::new(None)),
        }
    }

    fn start(&self) -> SharedRefresh {
        let auth = self.auth.clone();
        let session = self.session.clone();
        let tokens = self.tokens.clone();
        let slot = Rc::downgrade(&self.in_flight);

        let refresh = async move {
            let access = refresh_session(&auth, &session, &tokens).await;
            if let Some(slot) = slot.upgrade() {
                slot.borrow_mut().take();
            }
            access
        }
        .boxed_local()
        .shared();

        *self.in_flight.borrow_mut() = Some(refresh.clone());
        refresh
    }
}

async fn refresh_session(
    auth: &AuthApi,
    session: &SessionStore,
    tokens: &AccessTokenStore,
) -> Option<String> {
    let refresh_token = session.tokens()?.refresh_token;
    match auth.refresh_token(&refresh_token).await {
        Ok(fresh) => {
            let access = fresh.access_token.clone();
            session.update_tokens(fresh);
            tokens.set(&access);
            crate::log_debug!("access token refreshed");
            Some(access)
        }
        Err(err) => {
            crate::log_warn!("token refresh failed, signing out: {err}");
            session.clear_auth();
            tokens.clear();
            None
        }
    }
}

#[async_trait(?Send)]
impl UnauthorizedHandler for TokenRefresher {
    async fn on_unauthorized(&self, _error: &ApiError) -> Option<String> {
        let pending = self.in_flight.borrow().clone();
        match pending {
            Some(refresh) => refresh.await,
            None => self.start().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_messages_fall_back() {
        let err = ApiError::new("");
        assert_eq!(message_or(&err, LOGIN_FAILED), LOGIN_FAILED);
        let err = ApiError::new("Invalid credentials");
        assert_eq!(message_or(&err, LOGIN_FAILED), "Invalid credentials");
    }
}
