//! Snapshot-or-missing observable values
//!
//! Output sinks expose their stream state and media spec as observables. A
//! source that has not produced a value yet reads as missing; queries never
//! block.

use tokio::sync::watch;

/// Producer side of an observable value
///
/// Held by the output sink implementation. Each [`publish`](Self::publish)
/// replaces the current value and wakes subscribers.
#[derive(Debug)]
pub struct ObservableState<T> {
    tx: watch::Sender<Option<T>>,
}

impl<T: Clone + Send + Sync + 'static> ObservableState<T> {
    /// Create a source with no value yet
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Create a source that already holds `value`
    pub fn with_initial(value: T) -> Self {
        let (tx, _rx) = watch::channel(Some(value));
        Self { tx }
    }

    /// Replace the current value and notify subscribers
    pub fn publish(&self, value: T) {
        self.tx.send_replace(Some(value));
    }

    /// Read side handed to observers
    pub fn observable(&self) -> Observable<T> {
        Observable {
            rx: self.tx.subscribe(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Default for ObservableState<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of an observable value
#[derive(Debug, Clone)]
pub struct Observable<T> {
    rx: watch::Receiver<Option<T>>,
}

impl<T: Clone> Observable<T> {
    /// Latest value, or `None` when the source has not produced one yet
    ///
    /// Never blocks.
    pub fn snapshot(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Subscribe to updates
    ///
    /// The returned receiver reports the current value as unseen, so a new
    /// subscriber observes the latest state immediately instead of waiting
    /// for the next change. The receiver errors once the producer side is
    /// dropped.
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        let mut rx = self.rx.clone();
        rx.mark_changed();
        rx
    }
}
