//! Request-deduplicating query cache.
//!
//! Entries hold the last successful payload as JSON plus the last error.
//! Concurrent fetches for one key share a single in-flight request. A fetch
//! whose key was cleared, removed or invalidated while it was running still
//! resolves for its callers, but its result is not written back.

mod key;

pub use key::{query_keys, CacheTime, QueryKey};

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::future::{FutureExt, LocalBoxFuture, Shared};
use minisource_shared::ApiError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

type SharedFetch = Shared<LocalBoxFuture<'static, Result<Value, ApiError>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Loading,
    Success,
    Error,
}

/// Public view of one cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub status: QueryStatus,
    pub data: Option<Value>,
    pub error: Option<ApiError>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_invalidated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a successful result is served without refetching.
    pub stale_time: Duration,
}

impl QueryOptions {
    pub fn stale_after(stale_time: Duration) -> Self {
        Self { stale_time }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
        }
    }
}

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

#[derive(Clone)]
pub struct QueryClient {
    inner: Rc<Inner>,
}

struct Inner {
    entries: RefCell<HashMap<QueryKey, QueryState>>,
    in_flight: RefCell<HashMap<QueryKey, InFlight>>,
    next_id: Cell<u64>,
    clock: Box<dyn Fn() -> DateTime<Utc>>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                entries: RefCell::new(HashMap::new()),
                in_flight: RefCell::new(HashMap::new()),
                next_id: Cell::new(0),
                clock: Box::new(clock),
            }),
        }
    }

    /// Serve fresh cached data, join an in-flight fetch, or start a new one.
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        if let Some(data) = self.fresh_data(&key, options.stale_time) {
            crate::log_debug!("cache hit for {key}");
            return from_value(data);
        }

        let fetch = self.join_or_start(key, fetcher);
        from_value(fetch.await?)
    }

    pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let data = self.inner.entries.borrow().get(key)?.data.clone()?;
        serde_json::from_value(data).ok()
    }

    /// Write data directly, as if a fetch had just succeeded.
    pub fn set_query_data<T: Serialize>(&self, key: QueryKey, data: &T) {
        match serde_json::to_value(data) {
            Ok(value) => {
                let now = self.now();
                self.inner.entries.borrow_mut().insert(key, success(value, now));
            }
            Err(err) => crate::log_warn!("not caching {key}: {err}"),
        }
    }

    pub fn query_state(&self, key: &QueryKey) -> Option<QueryState> {
        self.inner.entries.borrow().get(key).cloned()
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.inner.in_flight.borrow().contains_key(key)
    }

    /// Mark every entry under `prefix` stale so the next read refetches.
    /// Returns the number of entries marked.
    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        self.detach_in_flight(prefix);
        let mut marked = 0;
        for (key, entry) in self.inner.entries.borrow_mut().iter_mut() {
            if key.starts_with(prefix) {
                entry.is_invalidated = true;
                marked += 1;
            }
        }
        crate::log_debug!("invalidated {marked} queries under {prefix}");
        marked
    }

    /// Drop every entry under `prefix`.
    pub fn remove_queries(&self, prefix: &QueryKey) {
        self.detach_in_flight(prefix);
        self.inner
            .entries
            .borrow_mut()
            .retain(|key, _| !key.starts_with(prefix));
    }

    /// Drop the whole cache, including results of fetches still running.
    pub fn clear(&self) {
        self.inner.in_flight.borrow_mut().clear();
        self.inner.entries.borrow_mut().clear();
    }

    fn now(&self) -> DateTime<Utc> {
        (self.inner.clock)()
    }

    fn fresh_data(&self, key: &QueryKey, stale_time: Duration) -> Option<Value> {
        let entries = self.inner.entries.borrow();
        let entry = entries.get(key)?;
        if entry.is_invalidated || entry.error.is_some() {
            return None;
        }
        let age = (self.now() - entry.updated_at?).num_milliseconds();
        if age >= 0 && (age as u128) < stale_time.as_millis() {
            entry.data.clone()
        } else {
            None
        }
    }

    fn join_or_start<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> SharedFetch
    where
        T: Serialize + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + 'static,
    {
        if let Some(existing) = self.inner.in_flight.borrow().get(&key) {
            crate::log_debug!("joining in-flight fetch for {key}");
            return existing.fetch.clone();
        }
        self.start(key, to_json(fetcher()))
    }

    fn start(
        &self,
        key: QueryKey,
        request: LocalBoxFuture<'static, Result<Value, ApiError>>,
    ) -> SharedFetch {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);

        self.inner
            .entries
            .borrow_mut()
            .entry(key.clone())
            .or_insert_with(loading)
            .status = QueryStatus::Loading;

        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let settle_key = key.clone();
        let fetch = async move {
            let result = request.await;
            if let Some(inner) = weak.upgrade() {
                QueryClient { inner }.settle(&settle_key, id, &result);
            }
            result
        }
        .boxed_local()
        .shared();

        self.inner.in_flight.borrow_mut().insert(
            key,
            InFlight {
                id,
                fetch: fetch.clone(),
            },
        );
        fetch
    }

    fn settle(&self, key: &QueryKey, id: u64, result: &Result<Value, ApiError>) {
        let current = {
            let mut in_flight = self.inner.in_flight.borrow_mut();
            match in_flight.get(key) {
                Some(flight) if flight.id == id => {
                    in_flight.remove(key);
                    true
                }
                _ => false,
            }
        };
        if !current {
            crate::log_debug!("discarding detached result for {key}");
            return;
        }

        let now = self.now();
        let mut entries = self.inner.entries.borrow_mut();
        match result {
            Ok(value) => {
                entries.insert(key.clone(), success(value.clone(), now));
            }
            Err(err) => {
                let entry = entries.entry(key.clone()).or_insert_with(loading);
                entry.status = QueryStatus::Error;
                entry.error = Some(err.clone());
            }
        }
    }

    /// Forget in-flight fetches under `prefix`. Entries they had put into
    /// `Loading` fall back to what they held before the fetch started.
    fn detach_in_flight(&self, prefix: &QueryKey) {
        let detached: Vec<QueryKey> = {
            let mut in_flight = self.inner.in_flight.borrow_mut();
            let keys: Vec<QueryKey> = in_flight
                .keys()
                .filter(|key| key.starts_with(prefix))
                .cloned()
                .collect();
            for key in &keys {
                in_flight.remove(key);
            }
            keys
        };

        let mut entries = self.inner.entries.borrow_mut();
        for key in detached {
            let Some(entry) = entries.get_mut(&key) else {
                continue;
            };
            if entry.status != QueryStatus::Loading {
                continue;
            }
            if entry.error.is_some() {
                entry.status = QueryStatus::Error;
            } else if entry.data.is_some() {
                entry.status = QueryStatus::Success;
            } else {
                entries.remove(&key);
            }
        }
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

fn loading() -> QueryState {
    QueryState {
        status: QueryStatus::Loading,
        data: None,
        error: None,
        updated_at: None,
        is_invalidated: false,
    }
}

fn success(data: Value, now: DateTime<Utc>) -> QueryState {
    QueryState {
        status: QueryStatus::Success,
        data: Some(data),
        error: None,
        updated_at: Some(now),
        is_invalidated: false,
    }
}

fn to_json<T, Fut>(request: Fut) -> LocalBoxFuture<'static, Result<Value, ApiError>>
where
    T: Serialize + 'static,
    Fut: Future<Output = Result<T, ApiError>> + 'static,
{
    async move {
        let data = request.await?;
        serde_json::to_value(data).map_err(|e| ApiError::new(format!("cannot cache: {e}")))
    }
    .boxed_local()
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::new(format!("Cached data has an unexpected shape: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_channel::oneshot;
    use futures_util::future::join3;

    fn fake_clock() -> (Rc<Cell<i64>>, QueryClient) {
        let seconds = Rc::new(Cell::new(1_700_000_000));
        let handle = seconds.clone();
        let client = QueryClient::with_clock(move || {
            DateTime::from_timestamp(handle.get(), 0).unwrap_or_default()
        });
        (seconds, client)
    }

    fn key() -> QueryKey {
        query_keys::user_profile()
    }

    #[tokio::test(flavor = "current_thread")]
    async fn fresh_data_is_served_from_cache() {
        let (_, client) = fake_clock();
        let calls = Rc::new(Cell::new(0));
        let opts = QueryOptions::stale_after(CacheTime::MEDIUM);

        for _ in 0..3 {
            let calls = calls.clone();
            let value: u32 = client
                .fetch_query(key(), opts, move || {
                    calls.set(calls.get() + 1);
                    async { Ok(7u32) }
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn stale_data_is_refetched() {
        let (seconds, client) = fake_clock();
        let opts = QueryOptions::stale_after(CacheTime::SHORT);

        let first: u32 = client.fetch_query(key(), opts, || async { Ok(1u32) }).await.unwrap();
        seconds.set(seconds.get() + 61);
        let second: u32 = client.fetch_query(key(), opts, || async { Ok(2u32) }).await.unwrap();

        assert_eq!((first, second), (1, 2));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn concurrent_fetches_share_one_request() {
        let client = QueryClient::new();
        let calls = Rc::new(Cell::new(0));
        let (tx, rx) = oneshot::channel::<u32>();
        let opts = QueryOptions::default();

        let first = {
            let calls = calls.clone();
            client.fetch_query(key(), opts, move || {
                calls.set(calls.get() + 1);
                async move { rx.await.map_err(|_| ApiError::new("cancelled")) }
            })
        };
        let second = {
            let calls = calls.clone();
            client.fetch_query(key(), opts, move || {
                calls.set(calls.get() + 1);
                async { Ok(0u32) }
            })
        };
        let release = async move {
            let _ = tx.send(42);
        };

        let (a, b, ()) = join3(first, second, release).await;
        assert_eq!(a.unwrap(), 42u32);
        assert_eq!(b.unwrap(), 42u32);
        assert_eq!(calls.get(), 1);
        assert!(!client.is_fetching(&key()));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn invalidation_forces_refetch() {
        let client = QueryClient::new();
        let opts = QueryOptions::stale_after(CacheTime::DAY);
        let _: u32 = client.fetch_query(key(), opts, || async { Ok(1u32) }).await.unwrap();

        assert_eq!(client.invalidate_queries(&query_keys::user_all()), 1);
        assert!(client.query_state(&key()).unwrap().is_invalidated);

        let refreshed: u32 = client.fetch_query(key(), opts, || async { Ok(2u32) }).await.unwrap();
        assert_eq!(refreshed, 2);
        assert!(!client.query_state(&key()).unwrap().is_invalidated);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn result_after_clear_is_not_cached() {
        let client = QueryClient::new();
        let (tx, rx) = oneshot::channel::<u32>();

        let fetch = client.fetch_query(key(), QueryOptions::default(), move || async move {
            rx.await.map_err(|_| ApiError::new("cancelled"))
        });
        let clear_then_release = {
            let client = client.clone();
            async move {
                client.clear();
                let _ = tx.send(9);
            }
        };

        // The clear runs after the fetch registered itself: join polls in order.
        let (value, ()) = futures_util::future::join(fetch, clear_then_release).await;
        assert_eq!(value.unwrap(), 9u32);
        assert_eq!(client.query_state(&key()), None);
        assert_eq!(client.get_query_data::<u32>(&key()), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn invalidation_during_flight_does_not_leave_loading() {
        let client = QueryClient::new();
        let (tx, rx) = oneshot::channel::<u32>();

        let fetch = client.fetch_query(key(), QueryOptions::default(), move || async move {
            rx.await.map_err(|_| ApiError::new("cancelled"))
        });
        let invalidate_then_release = {
            let client = client.clone();
            async move {
                assert_eq!(client.query_state(&key()).unwrap().status, QueryStatus::Loading);
                client.invalidate_queries(&query_keys::user_all());
                let _ = tx.send(1);
            }
        };

        let (value, ()) = futures_util::future::join(fetch, invalidate_then_release).await;
        assert_eq!(value.unwrap(), 1u32);
        assert!(!client.is_fetching(&key()));
        // Nothing was cached before the fetch, so nothing is left behind.
        assert_eq!(client.query_state(&key()), None);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn detached_refetch_keeps_previous_data() {
        let client = QueryClient::new();
        client.set_query_data(key(), &5u32);
        let (tx, rx) = oneshot::channel::<u32>();

        let fetch = client.fetch_query(key(), QueryOptions::default(), move || async move {
            rx.await.map_err(|_| ApiError::new("cancelled"))
        });
        let invalidate_then_release = {
            let client = client.clone();
            async move {
                client.invalidate_queries(&query_keys::user_all());
                let _ = tx.send(6);
            }
        };

        let (value, ()) = futures_util::future::join(fetch, invalidate_then_release).await;
        assert_eq!(value.unwrap(), 6u32);
        let state = client.query_state(&key()).unwrap();
        assert_eq!(state.status, QueryStatus::Success);
        assert!(state.is_invalidated);
        assert_eq!(client.get_query_data::<u32>(&key()), Some(5));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn errors_are_recorded_and_not_served() {
        let client = QueryClient::new();
        let opts = QueryOptions::stale_after(CacheTime::DAY);
        let err = client
            .fetch_query::<u32, _, _>(key(), opts, || async { Err(ApiError::new("boom")) })
            .await
            .unwrap_err();
        assert_eq!(err.message, "boom");

        let state = client.query_state(&key()).unwrap();
        assert_eq!(state.status, QueryStatus::Error);
        assert_eq!(state.error.unwrap().message, "boom");

        let value: u32 = client.fetch_query(key(), opts, || async { Ok(3u32) }).await.unwrap();
        assert_eq!(value, 3);
    }

    #[test]
    fn remove_and_set_query_data() {
        let client = QueryClient::new();
        client.set_query_data(query_keys::user_detail("u1"), &"alice");
        client.set_query_data(QueryKey::new(["products"]), &"widget");

        assert_eq!(
            client.get_query_data::<String>(&query_keys::user_detail("u1")).as_deref(),
            Some("alice")
        );
        client.remove_queries(&query_keys::user_all());
        assert_eq!(client.get_query_data::<String>(&query_keys::user_detail("u1")), None);
        assert!(client.get_query_data::<String>(&QueryKey::new(["products"])).is_some());
    }
}
