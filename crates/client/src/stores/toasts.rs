//! Notification queue rendered by the toaster.
//!
//! Toasts expire after their duration. The toaster schedules a dismissal for
//! each one it shows, and every push also drops toasts that have already
//! expired, so the queue stays bounded even with nothing rendering it.

use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_channel::mpsc::UnboundedReceiver;

use super::observable::Observable;

/// Lifetime of success and info toasts.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(4);
/// Errors stay up a little longer.
pub const ERROR_TOAST_DURATION: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

impl ToastKind {
    pub fn default_duration(self) -> Duration {
        match self {
            ToastKind::Error => ERROR_TOAST_DURATION,
            ToastKind::Success | ToastKind::Info => DEFAULT_TOAST_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub duration: Duration,
}

impl Toast {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now).is_zero()
    }

    /// Time left before the toast should disappear.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = (now - self.created_at).to_std().unwrap_or(Duration::ZERO);
        self.duration.saturating_sub(elapsed)
    }
}

#[derive(Clone)]
pub struct ToastStore {
    toasts: Rc<Observable<Vec<Toast>>>,
    clock: Rc<dyn Fn() -> DateTime<Utc>>,
}

impl ToastStore {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        Self {
            toasts: Rc::new(Observable::new(Vec::new())),
            clock: Rc::new(clock),
        }
    }

    pub fn success(&self, message: impl Into<String>) -> String {
        self.show(ToastKind::Success, message, ToastKind::Success.default_duration())
    }

    pub fn error(&self, message: impl Into<String>) -> String {
        self.show(ToastKind::Error, message, ToastKind::Error.default_duration())
    }

    pub fn info(&self, message: impl Into<String>) -> String {
        self.show(ToastKind::Info, message, ToastKind::Info.default_duration())
    }

    /// Queue a toast with an explicit lifetime. Returns its id.
    pub fn show(&self, kind: ToastKind, message: impl Into<String>, duration: Duration) -> String {
        let message = message.into();
        let id = uuid::Uuid::new_v4().to_string();
        let now = self.now();
        crate::log_debug!("toast {kind:?}: {message}");
        let toast = Toast {
            id: id.clone(),
            kind,
            message,
            created_at: now,
            duration,
        };
        self.toasts.update(|toasts| {
            toasts.retain(|t| !t.is_expired(now));
            toasts.push(toast);
        });
        id
    }

    pub fn dismiss(&self, id: &str) {
        if self.toasts.with(|toasts| toasts.iter().any(|t| t.id == id)) {
            self.toasts.update(|toasts| toasts.retain(|t| t.id != id));
        }
    }

    /// Drop every expired toast. Returns how many were removed.
    pub fn prune_expired(&self) -> usize {
        let now = self.now();
        let expired = self
            .toasts
            .with(|toasts| toasts.iter().filter(|t| t.is_expired(now)).count());
        if expired > 0 {
            self.toasts.update(|toasts| toasts.retain(|t| !t.is_expired(now)));
        }
        expired
    }

    pub fn clear(&self) {
        self.toasts.update(Vec::clear);
    }

    /// Current toasts, oldest first.
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.get()
    }

    /// Time left for the toast with `id`, if it is still queued.
    pub fn remaining(&self, id: &str) -> Option<Duration> {
        let now = self.now();
        self.toasts
            .with(|toasts| toasts.iter().find(|t| t.id == id).map(|t| t.remaining(now)))
    }

    pub fn subscribe(&self) -> UnboundedReceiver<Vec<Toast>> {
        self.toasts.subscribe()
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fake_clock() -> (Rc<Cell<i64>>, ToastStore) {
        let seconds = Rc::new(Cell::new(1_700_000_000));
        let handle = seconds.clone();
        let store = ToastStore::with_clock(move || {
            DateTime::from_timestamp(handle.get(), 0).unwrap_or_default()
        });
        (seconds, store)
    }

    #[test]
    fn toasts_queue_in_order_and_dismiss_by_id() {
        let store = ToastStore::new();
        let first = store.success("Saved");
        store.error("Nope");

        let toasts = store.toasts();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].kind, ToastKind::Success);
        assert_eq!(toasts[1].message, "Nope");

        store.dismiss(&first);
        assert_eq!(store.toasts().len(), 1);
        store.clear();
        assert!(store.toasts().is_empty());
    }

    #[test]
    fn expired_toasts_are_dropped_on_push() {
        let (seconds, store) = fake_clock();
        store.success("Login successful!");
        store.error("Invalid credentials");

        seconds.set(seconds.get() + 5);
        store.info("Later");

        let messages: Vec<_> = store.toasts().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["Invalid credentials", "Later"]);
    }

    #[test]
    fn queue_stays_bounded_across_many_sign_ins() {
        let (seconds, store) = fake_clock();
        for _ in 0..50 {
            store.success("Login successful!");
            seconds.set(seconds.get() + 10);
        }
        assert_eq!(store.toasts().len(), 1);
    }

    #[test]
    fn remaining_time_counts_down() {
        let (seconds, store) = fake_clock();
        let id = store.success("Saved");
        assert_eq!(store.remaining(&id), Some(DEFAULT_TOAST_DURATION));

        seconds.set(seconds.get() + 3);
        assert_eq!(store.remaining(&id), Some(Duration::from_secs(1)));

        seconds.set(seconds.get() + 2);
        assert_eq!(store.remaining(&id), Some(Duration::ZERO));
        assert_eq!(store.prune_expired(), 1);
        assert_eq!(store.remaining(&id), None);
    }
}
