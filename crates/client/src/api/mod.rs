//! HTTP transport, interceptor pipeline and typed service façades.

pub mod base;
pub mod client;
pub mod pipeline;
pub mod services;
pub mod transport;

pub use base::ServicePath;
pub use client::{ApiClient, UnauthorizedHandler};
pub use services::{AuthApi, UserApi};
pub use transport::{
    ApiRequest, HttpTransport, Method, RawResponse, ReqwestTransport, TransportFailure,
};
