//! Time-bounded snapshot cache.

use super::{FetchMode, SnapshotSource, SourceError};
use async_trait::async_trait;
use matchpulse_sdk::objects::Snapshot;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Serves repeated [`FetchMode::Cached`] requests from memory for `ttl`.
///
/// Forced fetches always reach the inner source and refresh the cache.
/// Failures are never cached.
pub struct CachedSource<S> {
    inner: S,
    ttl: Duration,
    entry: Mutex<Option<(Instant, Snapshot)>>,
}

impl<S> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entry: Mutex::new(None),
        }
    }

    pub fn invalidate(&self) {
        self.entry.lock().take();
    }

    fn fresh(&self) -> Option<Snapshot> {
        let entry = self.entry.lock();
        match entry.as_ref() {
            Some((stored_at, snapshot)) if stored_at.elapsed() < self.ttl => {
                Some(snapshot.clone())
            }
            _ => None,
        }
    }
}

#[async_trait]
impl<S: SnapshotSource> SnapshotSource for CachedSource<S> {
    async fn fetch(&self, mode: FetchMode) -> Result<Snapshot, SourceError> {
        if mode == FetchMode::Cached {
            if let Some(snapshot) = self.fresh() {
                debug!("Serving snapshot from cache");
                return Ok(snapshot);
            }
        }
        let snapshot = self.inner.fetch(mode).await?;
        *self.entry.lock() = Some((Instant::now(), snapshot.clone()));
        Ok(snapshot)
    }
}
