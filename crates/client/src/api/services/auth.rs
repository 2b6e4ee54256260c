//! Authentication endpoints under `/auth`.

use minisource_shared::{
    ApiError, AuthResponse, AuthTokens, ForgotPasswordRequest, LoginCredentials,
    RefreshTokenRequest, RegisterCredentials, ResetPasswordRequest,
};
use serde::de::IgnoredAny;

use crate::api::{ApiClient, ServicePath};

const AUTH: ServicePath = ServicePath::new("/auth");

/// Calls under `/auth` never go through the client's 401 handler: a 401
/// here means bad credentials or a dead refresh token, and refreshing in
/// response would touch the session the caller is trying to establish.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client: client.without_unauthorized_handler(),
        }
    }

    /// Login with email and password
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResponse, ApiError> {
        self.client.post(&AUTH.join("/login"), credentials).await
    }

    /// Register a new user
    pub async fn register(
        &self,
        credentials: &RegisterCredentials,
    ) -> Result<AuthResponse, ApiError> {
        self.client.post(&AUTH.join("/register"), credentials).await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.client
            .post_empty::<IgnoredAny>(&AUTH.join("/logout"))
            .await
            .map(|_| ())
    }

    /// Exchange a refresh token for a new token set
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, ApiError> {
        let body = RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.client.post(&AUTH.join("/refresh"), &body).await
    }

    /// Request a password reset email
    pub async fn forgot_password(&self, email: &str) -> Result<(), ApiError> {
        let body = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.client
            .post::<IgnoredAny, _>(&AUTH.join("/forgot-password"), &body)
            .await
            .map(|_| ())
    }

    /// Reset password with the token from the reset email
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), ApiError> {
        let body = ResetPasswordRequest {
            token: token.to_string(),
            password: password.to_string(),
        };
        self.client
            .post::<IgnoredAny, _>(&AUTH.join("/reset-password"), &body)
            .await
            .map(|_| ())
    }
}
