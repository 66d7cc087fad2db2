//! Persisted record of matches whose end has already been reported.
//!
//! A key moves through two stages: *claimed* (a notice is in flight) and
//! *notified* (the backend acknowledged it). Only notified keys are written
//! to disk, so a failed delivery can be retried on a later transition while
//! a successful one is never repeated, across restarts included.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to access ledger file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse ledger file: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk format.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    notified: BTreeSet<String>,
}

pub struct NotificationLedger {
    path: Option<PathBuf>,
    inner: Mutex<LedgerInner>,
}

#[derive(Default)]
struct LedgerInner {
    notified: BTreeSet<String>,
    pending: HashSet<String>,
}

impl NotificationLedger {
    /// A ledger that forgets everything when dropped.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            inner: Mutex::new(LedgerInner::default()),
        }
    }

    /// Load the ledger at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let file = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str::<LedgerFile>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LedgerFile::default(),
            Err(e) => return Err(e.into()),
        };
        info!(
            path = %path.display(),
            entries = file.notified.len(),
            "Loaded match-end notification ledger"
        );
        Ok(Self {
            path: Some(path),
            inner: Mutex::new(LedgerInner {
                notified: file.notified,
                pending: HashSet::new(),
            }),
        })
    }

    pub fn is_notified(&self, key: &str) -> bool {
        self.inner.lock().notified.contains(key)
    }

    /// Reserve `key` for a notification.
    ///
    /// Returns `false` when the key is already notified or claimed.
    pub fn try_claim(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        if inner.notified.contains(key) || inner.pending.contains(key) {
            return false;
        }
        inner.pending.insert(key.to_string());
        true
    }

    /// Drop a claim after a failed delivery so the key can be claimed again.
    pub fn release(&self, key: &str) {
        self.inner.lock().pending.remove(key);
    }

    /// Mark `key` as notified and persist the ledger.
    ///
    /// The in-memory record is updated even if writing the file fails.
    pub fn confirm(&self, key: &str) -> Result<(), LedgerError> {
        let mut inner = self.inner.lock();
        inner.pending.remove(key);
        inner.notified.insert(key.to_string());

        let Some(path) = &self.path else {
            return Ok(());
        };
        let file = LedgerFile {
            notified: inner.notified.clone(),
        };
        drop(inner);

        let json = serde_json::to_string_pretty(&file)?;
        // Write atomically: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, path)?;
        debug!(key, path = %path.display(), "Persisted notification ledger");
        Ok(())
    }
}
