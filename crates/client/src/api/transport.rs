//! The networking boundary: plain request/response values and the transport
//! that moves them. Interceptor logic lives in [`super::pipeline`], not here.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Transport code for a request that exceeded the configured timeout.
pub const TIMEOUT_CODE: &str = "TIMEOUT";
/// Transport code for every other failure to obtain a response.
pub const NETWORK_CODE: &str = "NETWORK_ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully-resolved outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL including the query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Send cookies cross-origin.
    pub with_credentials: bool,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            with_credentials: true,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub message: String,
    pub code: Option<String>,
}

impl TransportFailure {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(NETWORK_CODE.to_string()),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            message: format!("timeout of {}ms exceeded", after.as_millis()),
            code: Some(TIMEOUT_CODE.to_string()),
        }
    }
}

/// Sends requests over the wire. Implementations never interpret status codes.
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportFailure>;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                crate::log_error!("falling back to default HTTP client: {err}");
                reqwest::Client::new()
            });
        Self { client, timeout }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn build(&self, request: ApiRequest) -> reqwest::RequestBuilder {
        let mut rb = self
            .client
            .request(request.method.to_reqwest(), &request.url);

        for (name, value) in &request.headers {
            rb = rb.header(name.as_str(), value.as_str());
        }

        #[cfg(target_arch = "wasm32")]
        if request.with_credentials {
            rb = rb.fetch_credentials_include();
        }

        if let Some(body) = &request.body {
            rb = rb.json(body);
        }
        rb
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<RawResponse, TransportFailure> {
        let resp = self
            .build(request)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| TransportFailure::network(format!("failed to read body: {e}")))?;

        Ok(RawResponse { status, body })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn map_error(&self, err: reqwest::Error) -> TransportFailure {
        if err.is_timeout() {
            TransportFailure::timeout(self.timeout)
        } else {
            TransportFailure::network(err.to_string())
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn map_error(&self, err: reqwest::Error) -> TransportFailure {
        TransportFailure::network(err.to_string())
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait(?Send)]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportFailure> {
        self.dispatch(request).await
    }
}

// The fetch API has no timeout; race the request against a timer instead.
#[cfg(target_arch = "wasm32")]
#[async_trait(?Send)]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportFailure> {
        use futures_util::future::{select, Either};

        let millis = u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX);
        let request = Box::pin(self.dispatch(request));
        let timer = gloo_timers::future::TimeoutFuture::new(millis);

        match select(request, timer).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(TransportFailure::timeout(self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut req = ApiRequest::new(Method::Get, "http://localhost/api/users");
        req.set_header("authorization", "Bearer old");
        req.set_header("Authorization", "Bearer new");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("AUTHORIZATION"), Some("Bearer new"));
    }

    #[test]
    fn requests_include_credentials_by_default() {
        assert!(ApiRequest::new(Method::Post, "/auth/login").with_credentials);
    }

    #[test]
    fn success_range() {
        assert!(RawResponse { status: 204, body: String::new() }.is_success());
        assert!(!RawResponse { status: 401, body: String::new() }.is_success());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn silent_server_times_out() {
        // Accepts connections at the socket level but never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/users", listener.local_addr().unwrap());
        let transport = ReqwestTransport::new(Duration::from_millis(200));

        let failure = transport
            .send(ApiRequest::new(Method::Get, url))
            .await
            .unwrap_err();

        assert_eq!(failure.code.as_deref(), Some(TIMEOUT_CODE));
        assert_eq!(failure.message, "timeout of 200ms exceeded");
        drop(listener);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[tokio::test]
    async fn refused_connection_is_a_network_failure() {
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let transport = ReqwestTransport::new(Duration::from_secs(5));

        let failure = transport
            .send(ApiRequest::new(Method::Get, format!("http://{addr}/")))
            .await
            .unwrap_err();

        assert_eq!(failure.code.as_deref(), Some(NETWORK_CODE));
    }
}
