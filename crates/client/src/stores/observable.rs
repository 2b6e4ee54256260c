//! Single-threaded observable cell backing the stores.

use std::cell::RefCell;

use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};

/// A value plus the subscribers that receive a snapshot after every change.
///
/// Subscribers whose receiver was dropped are pruned on the next notification.
pub(crate) struct Observable<T: Clone> {
    value: RefCell<T>,
    subscribers: RefCell<Vec<UnboundedSender<T>>>,
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Read a projection without cloning the whole value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Mutate the value, then notify subscribers with the new snapshot.
    pub fn update(&self, f: impl FnOnce(&mut T)) -> T {
        let snapshot = {
            let mut value = self.value.borrow_mut();
            f(&mut value);
            value.clone()
        };
        self.notify(&snapshot);
        snapshot
    }

    pub fn subscribe(&self) -> UnboundedReceiver<T> {
        let (tx, rx) = unbounded();
        self.subscribers.borrow_mut().push(tx);
        rx
    }

    fn notify(&self, snapshot: &T) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(snapshot.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_see_every_change() {
        let cell = Observable::new(0u32);
        let mut rx = cell.subscribe();
        cell.update(|v| *v += 1);
        cell.update(|v| *v += 1);
        assert_eq!(rx.try_next().unwrap(), Some(1));
        assert_eq!(rx.try_next().unwrap(), Some(2));
        assert!(rx.try_next().is_err());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let cell = Observable::new(0u32);
        drop(cell.subscribe());
        let _live = cell.subscribe();
        cell.update(|v| *v = 7);
        assert_eq!(cell.subscribers.borrow().len(), 1);
        assert_eq!(cell.get(), 7);
    }
}
