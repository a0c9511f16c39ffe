use arc_swap::ArcSwap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::options::{OptionBundle, OptionKey, OptionValue};

/// Change notification channel capacity
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Configuration change event
#[derive(Debug, Clone)]
pub struct ConfigChange {
    pub key: OptionKey,
}

/// Option store for one use case
///
/// Uses `ArcSwap` for lock-free reads, so hot paths can snapshot the current
/// bundle without locking. Writes are last-write-wins.
#[derive(Clone)]
pub struct ConfigStore {
    /// Lock-free cache using ArcSwap for zero-cost reads
    cache: Arc<ArcSwap<OptionBundle>>,
    change_tx: broadcast::Sender<ConfigChange>,
}

impl ConfigStore {
    /// Create a store holding `initial`
    pub fn new(initial: OptionBundle) -> Self {
        let (change_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            cache: Arc::new(ArcSwap::from_pointee(initial)),
            change_tx,
        }
    }

    /// Get the current bundle (lock-free, zero-copy)
    ///
    /// Returns an `Arc<OptionBundle>` for efficient sharing without cloning.
    pub fn get(&self) -> Arc<OptionBundle> {
        self.cache.load_full()
    }

    /// Insert a single option and notify subscribers
    ///
    /// Concurrent writers are last-write-wins, which is acceptable for
    /// configuration changes: they are infrequent and serialized on the
    /// use case's coordinator in practice.
    pub fn set(&self, key: OptionKey, value: OptionValue) {
        let current = self.cache.load();
        let mut bundle = (**current).clone();
        bundle.insert(key, value);
        self.cache.store(Arc::new(bundle));

        // Notify subscribers
        let _ = self.change_tx.send(ConfigChange { key });
    }

    /// Subscribe to configuration changes
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigChange> {
        self.change_tx.subscribe()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(OptionBundle::default())
    }
}
