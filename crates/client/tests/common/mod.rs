#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;
use futures_channel::oneshot;
use minisource_client::api::{ApiRequest, HttpTransport, RawResponse, TransportFailure};
use minisource_client::{ApiClient, AppContext, Storage};
use minisource_client::storage::AccessTokenStore;

pub const BASE_URL: &str = "http://api.test/api";

type Reply = Result<RawResponse, TransportFailure>;

struct Scripted {
    gate: Option<oneshot::Receiver<()>>,
    reply: Reply,
}

/// Scripted transport: answers requests in order and records what it saw.
#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Rc<RefCell<VecDeque<Scripted>>>,
    seen: Rc<RefCell<Vec<ApiRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, gate: Option<oneshot::Receiver<()>>, reply: Reply) -> &Self {
        self.replies.borrow_mut().push_back(Scripted { gate, reply });
        self
    }

    pub fn reply(&self, status: u16, body: &str) -> &Self {
        self.push(None, Ok(response(status, body)))
    }

    /// Like [`reply`](Self::reply), but the response is held back until the
    /// returned sender fires (or is dropped).
    pub fn reply_gated(&self, status: u16, body: &str) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.push(Some(gate), Ok(response(status, body)));
        release
    }

    pub fn fail(&self, failure: TransportFailure) -> &Self {
        self.push(None, Err(failure))
    }

    pub fn count(&self, path: &str) -> usize {
        let url = format!("{BASE_URL}{path}");
        self.seen.borrow().iter().filter(|r| r.url == url).count()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.seen.borrow().clone()
    }

    pub fn last(&self) -> ApiRequest {
        self.seen.borrow().last().cloned().expect("no request was sent")
    }
}

#[async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportFailure> {
        self.seen.borrow_mut().push(request);
        let next = self.replies.borrow_mut().pop_front();
        let Some(Scripted { gate, reply }) = next else {
            return Err(TransportFailure::network("no scripted reply"));
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        reply
    }
}

fn response(status: u16, body: &str) -> RawResponse {
    RawResponse {
        status,
        body: body.to_string(),
    }
}

pub fn client(transport: &MockTransport, storage: &Storage) -> ApiClient {
    ApiClient::with_transport(
        transport.clone(),
        BASE_URL,
        AccessTokenStore::new(storage.clone()),
    )
}

/// A fully wired app over in-memory storage.
pub fn app(transport: &MockTransport) -> AppContext {
    let storage = Storage::memory();
    AppContext::with_client(client(transport, &storage), storage)
}

pub const USER_JSON: &str = r#"{"id":"u1","email":"a@b.c","name":"Ann","role":"user"}"#;
pub const TOKENS_JSON: &str = r#"{"accessToken":"a1","refreshToken":"r1","expiresIn":3600}"#;

pub fn auth_response_json() -> String {
    format!(r#"{{"user":{USER_JSON},"tokens":{TOKENS_JSON}}}"#)
}

pub const PROFILE_JSON: &str = r#"{"id":"u1","email":"a@b.c","name":"Ann","role":"user","createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-02T00:00:00Z"}"#;
