//! The two interceptor stages composed around every call.
//!
//! Request stage: `ApiRequest -> ApiRequest`, attaches the bearer token when
//! one is stored and never fails. Response stage:
//! `Result<RawResponse, TransportFailure> -> Result<RawResponse, ApiError>`,
//! passes successes through and normalizes everything else.

use minisource_shared::ApiError;
use serde::de::DeserializeOwned;

use super::transport::{ApiRequest, RawResponse, TransportFailure};
use crate::storage::AccessTokenStore;

#[derive(Debug, Clone)]
pub struct Pipeline {
    tokens: AccessTokenStore,
}

impl Pipeline {
    pub fn new(tokens: AccessTokenStore) -> Self {
        Self { tokens }
    }

    pub fn on_request(&self, request: ApiRequest) -> ApiRequest {
        let mut request = request;
        request.set_header("Content-Type", "application/json");
        match self.tokens.get() {
            Some(token) => with_bearer(request, &token),
            None => request,
        }
    }

    pub fn on_response(
        &self,
        result: Result<RawResponse, TransportFailure>,
    ) -> Result<RawResponse, ApiError> {
        match result {
            Ok(response) if response.is_success() => Ok(response),
            Ok(response) => {
                let err = ApiError::from_http(response.status, &response.body);
                crate::log_debug!("request failed ({}): {}", response.status, err.message);
                Err(err)
            }
            Err(failure) => {
                crate::log_warn!("transport failure: {}", failure.message);
                Err(ApiError::from_transport(
                    &failure.message,
                    failure.code.as_deref(),
                ))
            }
        }
    }
}

/// Set the `Authorization: Bearer` header.
pub fn with_bearer(mut request: ApiRequest, token: &str) -> ApiRequest {
    request.set_header("Authorization", format!("Bearer {token}"));
    request
}

/// Decode a successful payload. An empty body decodes as JSON `null`.
pub fn decode<T: DeserializeOwned>(response: &RawResponse) -> Result<T, ApiError> {
    let body = response.body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::decode(response.status, e))
}
