mod common;

use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use common::{client, MockTransport, BASE_URL};
use minisource_client::api::{Method, TransportFailure, UnauthorizedHandler};
use minisource_client::storage::{AccessTokenStore, ACCESS_TOKEN_KEY};
use minisource_client::Storage;
use minisource_shared::{ApiError, PaginationParams, FALLBACK_MESSAGE};
use serde_json::{json, Value};

#[tokio::test]
async fn attaches_stored_token_and_json_headers() {
    let transport = MockTransport::new();
    transport.reply(200, r#"{"ok":true}"#);
    let storage = Storage::memory();
    AccessTokenStore::new(storage.clone()).set("a1");

    let body: Value = client(&transport, &storage).get("/users/profile").await.unwrap();

    assert_eq!(body, json!({"ok": true}));
    let sent = transport.last();
    assert_eq!(sent.method, Method::Get);
    assert_eq!(sent.url, format!("{BASE_URL}/users/profile"));
    assert_eq!(sent.header("Authorization"), Some("Bearer a1"));
    assert_eq!(sent.header("Content-Type"), Some("application/json"));
    assert!(sent.with_credentials);
}

#[tokio::test]
async fn no_token_means_no_authorization_header() {
    let transport = MockTransport::new();
    transport.reply(200, "{}");
    let storage = Storage::memory();

    let _: Value = client(&transport, &storage).get("/users/profile").await.unwrap();

    assert_eq!(transport.last().header("Authorization"), None);
}

#[tokio::test]
async fn token_is_read_at_send_time() {
    let transport = MockTransport::new();
    transport.reply(200, "{}").reply(200, "{}");
    let storage = Storage::memory();
    let api = client(&transport, &storage);

    let _: Value = api.get("/a").await.unwrap();
    storage.set_raw(ACCESS_TOKEN_KEY, "later");
    let _: Value = api.get("/b").await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].header("Authorization"), None);
    assert_eq!(requests[1].header("Authorization"), Some("Bearer later"));
}

#[tokio::test]
async fn query_params_are_appended() {
    let transport = MockTransport::new();
    transport.reply(200, "[]");
    let storage = Storage::memory();
    let params = PaginationParams {
        page: Some(3),
        ..Default::default()
    };

    let _: Vec<Value> = client(&transport, &storage)
        .get_with_params("/users", &params)
        .await
        .unwrap();

    assert_eq!(transport.last().url, format!("{BASE_URL}/users?page=3"));
}

#[tokio::test]
async fn upstream_message_and_code_win() {
    let transport = MockTransport::new();
    transport.reply(
        422,
        r#"{"message":"Email taken","code":"EMAIL_TAKEN","details":{"field":"email"}}"#,
    );
    let storage = Storage::memory();

    let err = client(&transport, &storage)
        .post::<Value, _>("/auth/register", &json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.message, "Email taken");
    assert_eq!(err.code.as_deref(), Some("EMAIL_TAKEN"));
    assert_eq!(err.status, Some(422));
    assert_eq!(err.details, Some(json!({"field": "email"})));
}

#[tokio::test]
async fn bodyless_failure_uses_generic_message() {
    let transport = MockTransport::new();
    transport.reply(500, "");
    let storage = Storage::memory();

    let err = client(&transport, &storage)
        .get::<Value>("/users/profile")
        .await
        .unwrap_err();

    assert_eq!(err.message, "Request failed with status code 500");
    assert_eq!(err.status, Some(500));
}

#[tokio::test]
async fn transport_failures_carry_no_status() {
    let transport = MockTransport::new();
    transport
        .fail(TransportFailure::timeout(std::time::Duration::from_millis(30000)))
        .fail(TransportFailure {
            message: String::new(),
            code: None,
        });
    let storage = Storage::memory();
    let api = client(&transport, &storage);

    let timeout = api.get::<Value>("/slow").await.unwrap_err();
    assert_eq!(timeout.status, None);
    assert_eq!(timeout.code.as_deref(), Some("TIMEOUT"));
    assert_eq!(timeout.message, "timeout of 30000ms exceeded");

    let silent = api.get::<Value>("/silent").await.unwrap_err();
    assert_eq!(silent.message, FALLBACK_MESSAGE);
}

#[tokio::test]
async fn unauthorized_reaches_caller_without_a_handler() {
    let transport = MockTransport::new();
    transport.reply(401, r#"{"message":"Token expired"}"#);
    let storage = Storage::memory();
    AccessTokenStore::new(storage.clone()).set("stale");

    let err = client(&transport, &storage)
        .get::<Value>("/users/profile")
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.message, "Token expired");
    assert_eq!(transport.requests().len(), 1);
    // The stored token is left alone.
    assert_eq!(storage.get_raw(ACCESS_TOKEN_KEY).as_deref(), Some("stale"));
}

struct FixedToken {
    token: Option<&'static str>,
    calls: Rc<Cell<u32>>,
}

#[async_trait(?Send)]
impl UnauthorizedHandler for FixedToken {
    async fn on_unauthorized(&self, _error: &ApiError) -> Option<String> {
        self.calls.set(self.calls.get() + 1);
        self.token.map(str::to_string)
    }
}

#[tokio::test]
async fn handler_token_retries_once() {
    let transport = MockTransport::new();
    transport
        .reply(401, r#"{"message":"expired"}"#)
        .reply(200, r#"{"id":"u1"}"#);
    let storage = Storage::memory();
    let api = client(&transport, &storage);
    let calls = Rc::new(Cell::new(0));
    api.set_unauthorized_handler(Rc::new(FixedToken {
        token: Some("fresh"),
        calls: calls.clone(),
    }));

    let body: Value = api.get("/users/profile").await.unwrap();

    assert_eq!(body, json!({"id": "u1"}));
    assert_eq!(calls.get(), 1);
    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].header("Authorization"), Some("Bearer fresh"));
}

#[tokio::test]
async fn second_unauthorized_is_not_retried() {
    let transport = MockTransport::new();
    transport
        .reply(401, r#"{"message":"expired"}"#)
        .reply(401, r#"{"message":"still expired"}"#);
    let storage = Storage::memory();
    let api = client(&transport, &storage);
    let calls = Rc::new(Cell::new(0));
    api.set_unauthorized_handler(Rc::new(FixedToken {
        token: Some("fresh"),
        calls: calls.clone(),
    }));

    let err = api.get::<Value>("/users/profile").await.unwrap_err();

    assert_eq!(err.message, "still expired");
    assert_eq!(calls.get(), 1);
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn declined_refresh_returns_original_error() {
    let transport = MockTransport::new();
    transport.reply(401, r#"{"message":"expired"}"#);
    let storage = Storage::memory();
    let api = client(&transport, &storage);
    api.set_unauthorized_handler(Rc::new(FixedToken {
        token: None,
        calls: Rc::new(Cell::new(0)),
    }));

    let err = api.get::<Value>("/users/profile").await.unwrap_err();

    assert_eq!(err.message, "expired");
    assert_eq!(transport.requests().len(), 1);
}
