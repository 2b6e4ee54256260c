//! Platform sleep, plus the debouncer built on it.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

/// Sleep without blocking the event loop.
#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

/// Sleep on the tokio runtime the desktop renderer runs on.
#[cfg(not(target_arch = "wasm32"))]
pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Holds a changing value back until it has stopped changing for `delay`.
///
/// Clones share state.
pub struct Debouncer<T> {
    delay: Duration,
    latest: Rc<RefCell<(u64, T)>>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            delay: self.delay,
            latest: self.latest.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            latest: Rc::new(RefCell::new((0, initial))),
        }
    }

    /// Record a new value. The returned future waits out the delay and yields
    /// the value, or `None` if a newer one arrived meanwhile. Returns `None`
    /// straight away when the value did not change.
    pub fn push(&self, value: T) -> Option<impl Future<Output = Option<T>>> {
        let generation = {
            let mut latest = self.latest.borrow_mut();
            if latest.1 == value {
                return None;
            }
            latest.0 += 1;
            latest.1 = value.clone();
            latest.0
        };
        let latest = self.latest.clone();
        let delay = self.delay;
        Some(async move {
            sleep(delay).await;
            (latest.borrow().0 == generation).then_some(value)
        })
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn sleeps_for_the_requested_time() {
        let start = tokio::time::Instant::now();
        sleep(Duration::from_millis(250)).await;
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn debouncer_keeps_only_the_last_value() {
        let debouncer = Debouncer::new(String::new(), Duration::from_millis(300));
        let first = debouncer.push("a".to_string()).unwrap();
        let second = debouncer.push("ab".to_string()).unwrap();
        assert!(debouncer.push("ab".to_string()).is_none());

        let (first, second) = futures_util::join!(first, second);

        assert_eq!(first, None);
        assert_eq!(second.as_deref(), Some("ab"));
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn debounced_value_waits_for_the_delay() {
        let debouncer = Debouncer::new(0, Duration::from_millis(500));
        let start = tokio::time::Instant::now();

        let settled = debouncer.push(1).unwrap().await;

        assert_eq!(settled, Some(1));
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
