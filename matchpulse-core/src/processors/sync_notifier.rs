//! SyncNotifier processor.
//!
//! The SyncNotifier is responsible for:
//! - Receiving `MatchEndNotice` from the match-end watcher
//! - Telling the backend to persist the finished match (`/api/sync-notify`)
//! - Confirming the match key in the `NotificationLedger` on success, or
//!   releasing the claim on failure so a later transition can retry

use crate::events::{MatchEndNotice, MatchEndNoticeReceiver};
use crate::ledger::{LedgerError, NotificationLedger};
use async_trait::async_trait;
use kanau::processor::Processor;
use matchpulse_sdk::client::{ClientError, DataClient};
use std::convert::Infallible;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("sync endpoint request failed: {0}")]
    Endpoint(#[from] ClientError),

    /// The backend was notified but the ledger could not be saved.
    #[error("failed to persist notification ledger: {0}")]
    Ledger(#[from] LedgerError),
}

/// The backend call behind a match-end notice.
#[async_trait]
pub trait SyncEndpoint: Send + Sync {
    async fn notify_match_end(&self, match_key: &str) -> Result<(), ClientError>;
}

#[async_trait]
impl SyncEndpoint for DataClient {
    async fn notify_match_end(&self, match_key: &str) -> Result<(), ClientError> {
        DataClient::notify_match_end(self, match_key).await
    }
}

pub struct SyncNotifier<E> {
    endpoint: E,
    ledger: Arc<NotificationLedger>,
}

impl<E: SyncEndpoint> SyncNotifier<E> {
    pub fn new(endpoint: E, ledger: Arc<NotificationLedger>) -> Self {
        Self { endpoint, ledger }
    }

    /// Run the SyncNotifier until shutdown is signaled or every sender is
    /// dropped.
    pub async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut notice_rx: MatchEndNoticeReceiver,
    ) {
        info!("SyncNotifier started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("SyncNotifier received shutdown signal");
                        break;
                    }
                }

                notice = notice_rx.recv() => {
                    let Some(notice) = notice else {
                        info!("MatchEndNotice channel closed");
                        break;
                    };
                    debug!(notice = ?notice, "Received MatchEndNotice");
                    let _ = self.process(notice).await;
                }
            }
        }

        info!("SyncNotifier shutdown complete");
    }

    async fn deliver(&self, notice: &MatchEndNotice) -> Result<(), NotifyError> {
        if let Err(e) = self.endpoint.notify_match_end(&notice.match_key).await {
            self.ledger.release(&notice.match_key);
            return Err(e.into());
        }
        self.ledger.confirm(&notice.match_key)?;
        Ok(())
    }
}

impl<E: SyncEndpoint> Processor<MatchEndNotice> for SyncNotifier<E> {
    type Output = ();
    type Error = Infallible;

    async fn process(&self, notice: MatchEndNotice) -> Result<(), Infallible> {
        match self.deliver(&notice).await {
            Ok(()) => info!(
                match_key = %notice.match_key,
                status = %notice.status,
                "Backend notified of match end"
            ),
            Err(NotifyError::Ledger(e)) => error!(
                match_key = %notice.match_key,
                error = %e,
                "Backend notified but ledger write failed"
            ),
            Err(e) => warn!(
                match_key = %notice.match_key,
                error = %e,
                "Match-end notification failed, will retry on next transition"
            ),
        }
        Ok(())
    }
}
