//! Shared HTTP client with the request/response pipeline applied to every call.

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use minisource_shared::ApiError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::pipeline::{self, Pipeline};
use super::transport::{ApiRequest, HttpTransport, Method, RawResponse, ReqwestTransport};
use crate::config::AppConfig;
use crate::storage::AccessTokenStore;

const ENCODE_ERROR: &str = "ENCODE_ERROR";

/// Hook point invoked when a request is rejected with 401.
///
/// Returning a token retries the original request once with that bearer
/// token. Returning `None` lets the 401 reach the caller unchanged.
#[async_trait(?Send)]
pub trait UnauthorizedHandler {
    async fn on_unauthorized(&self, error: &ApiError) -> Option<String>;
}

/// Verb-based HTTP client. Clones share the transport, token source and
/// 401 handler.
#[derive(Clone)]
pub struct ApiClient {
    inner: Rc<Inner>,
}

struct Inner {
    transport: Rc<dyn HttpTransport>,
    base_url: String,
    pipeline: Pipeline,
    unauthorized: RefCell<Option<Rc<dyn UnauthorizedHandler>>>,
}

impl ApiClient {
    /// Create the production client from configuration.
    pub fn new(config: &AppConfig, tokens: AccessTokenStore) -> Self {
        Self::with_transport(
            ReqwestTransport::new(config.api.timeout),
            config.api.base_url.clone(),
            tokens,
        )
    }

    pub fn with_transport(
        transport: impl HttpTransport + 'static,
        base_url: impl Into<String>,
        tokens: AccessTokenStore,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                transport: Rc::new(transport),
                base_url: base_url.into(),
                pipeline: Pipeline::new(tokens),
                unauthorized: RefCell::new(None),
            }),
        }
    }

    /// Attach the 401 handler. Without one, a 401 is returned to the caller.
    pub fn set_unauthorized_handler(&self, handler: Rc<dyn UnauthorizedHandler>) {
        *self.inner.unauthorized.borrow_mut() = Some(handler);
    }

    /// A client sharing this one's transport and token source but with no 401
    /// handler, so the handler itself can make calls without recursing.
    pub fn without_unauthorized_handler(&self) -> Self {
        Self {
            inner: Rc::new(Inner {
                transport: self.inner.transport.clone(),
                base_url: self.inner.base_url.clone(),
                pipeline: self.inner.pipeline.clone(),
                unauthorized: RefCell::new(None),
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Resolve a path against the base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let base = self.inner.base_url.trim_end_matches('/');
        if base.is_empty() {
            if path.starts_with('/') {
                path.to_string()
            } else {
                format!("/{path}")
            }
        } else {
            let path = path.trim_start_matches('/');
            if path.is_empty() {
                base.to_string()
            } else {
                format!("{base}/{path}")
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::Get, path, None, None).await
    }

    /// GET with query parameters taken from a serializable value.
    pub async fn get_with_params<T: DeserializeOwned, P: Serialize>(
        &self,
        path: &str,
        params: &P,
    ) -> Result<T, ApiError> {
        let query = query_pairs(params)?;
        self.send(Method::Get, path, Some(query), None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(body)?;
        self.send(Method::Post, path, None, Some(body)).await
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::Post, path, None, None).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(body)?;
        self.send(Method::Put, path, None, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = encode(body)?;
        self.send(Method::Patch, path, None, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::Delete, path, None, None).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<Vec<(String, String)>>,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let mut url = self.url(path);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }

        let mut request = ApiRequest::new(method, url);
        request.body = body;

        let response = self.execute(request).await?;
        pipeline::decode(&response)
    }

    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let inner = &self.inner;
        let prepared = inner.pipeline.on_request(request.clone());
        let result = inner.transport.send(prepared).await;

        let err = match inner.pipeline.on_response(result) {
            Err(err) if err.is_unauthorized() => err,
            other => return other,
        };

        let handler = inner.unauthorized.borrow().clone();
        let Some(handler) = handler else {
            return Err(err);
        };

        match handler.on_unauthorized(&err).await {
            Some(token) => {
                crate::log_debug!("retrying {} {} after 401", request.method.as_str(), request.url);
                let retried = pipeline::with_bearer(inner.pipeline.on_request(request), &token);
                let result = inner.transport.send(retried).await;
                inner.pipeline.on_response(result)
            }
            None => Err(err),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

fn encode<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError {
        message: format!("Failed to encode request: {e}"),
        code: Some(ENCODE_ERROR.to_string()),
        status: None,
        details: None,
    })
}

/// Flatten a serializable value into query pairs. Nulls are skipped and
/// arrays repeat the key.
fn query_pairs<P: Serialize>(params: &P) -> Result<Vec<(String, String)>, ApiError> {
    let mut pairs = Vec::new();
    let Value::Object(map) = encode(params)? else {
        return Ok(pairs);
    };
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(v) = scalar(item) {
                        pairs.push((key.clone(), v));
                    }
                }
            }
            other => {
                if let Some(v) = scalar(other) {
                    pairs.push((key, v));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
