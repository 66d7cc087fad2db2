//! Hot-reloadable config store with change notification.
//!
//! `ConfigStore<T>` wraps `Arc<RwLock<T>>` and bumps a watch-channel version
//! on every replacement, so long-running loops (the poller, the agent's
//! SIGHUP handler) can react to a reload without polling for it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, RwLockReadGuard, watch};

/// A shared, versioned configuration value.
///
/// Clones share the same underlying value.
pub struct ConfigStore<T> {
    inner: Arc<ConfigStoreInner<T>>,
}

struct ConfigStoreInner<T> {
    data: RwLock<T>,
    version: AtomicU64,
    version_tx: watch::Sender<u64>,
}

/// Receives notifications when a [`ConfigStore`] is replaced.
pub struct ConfigWatcher {
    version_rx: watch::Receiver<u64>,
}

// -- ConfigStore --------------------------------------------------------

impl<T> ConfigStore<T> {
    pub fn new(initial: T) -> Self {
        let (version_tx, _) = watch::channel(0u64);
        Self {
            inner: Arc::new(ConfigStoreInner {
                data: RwLock::new(initial),
                version: AtomicU64::new(0),
                version_tx,
            }),
        }
    }

    /// Replace the stored value and notify all watchers.
    ///
    /// Returns the new version number.
    pub async fn update(&self, value: T) -> u64 {
        let mut guard = self.inner.data.write().await;
        *guard = value;
        let new_version = self.inner.version.fetch_add(1, Ordering::Relaxed) + 1;
        // Release the write lock first so woken watchers can read immediately.
        drop(guard);
        let _ = self.inner.version_tx.send(new_version);
        new_version
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.data.read().await
    }

    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Relaxed)
    }

    pub fn subscribe(&self) -> ConfigWatcher {
        ConfigWatcher {
            version_rx: self.inner.version_tx.subscribe(),
        }
    }
}

impl<T: Clone> ConfigStore<T> {
    /// Copy out the current value without holding the lock.
    pub async fn snapshot(&self) -> T {
        self.inner.data.read().await.clone()
    }
}

impl<T: Default> Default for ConfigStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for ConfigStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

// -- ConfigWatcher ------------------------------------------------------

impl ConfigWatcher {
    /// Wait until the config store is updated.
    ///
    /// Returns `Err` once every [`ConfigStore`] handle has been dropped.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.version_rx.changed().await
    }
}
