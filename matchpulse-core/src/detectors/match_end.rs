//! Match-end watcher.
//!
//! Detects a tracked match leaving play and queues exactly one
//! [`MatchEndNotice`] per match key for the `SyncNotifier`. The watcher
//! publishes nothing on the bus.

use super::{Detected, Detector};
use crate::events::{MatchEndNotice, MatchEndNoticeSender};
use crate::ledger::NotificationLedger;
use matchpulse_sdk::objects::Match;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{info, warn};

pub struct MatchEndWatcher {
    ledger: Arc<NotificationLedger>,
    notice_tx: MatchEndNoticeSender,
}

impl MatchEndWatcher {
    pub fn new(ledger: Arc<NotificationLedger>, notice_tx: MatchEndNoticeSender) -> Self {
        Self { ledger, notice_tx }
    }
}

impl Detector for MatchEndWatcher {
    fn detect(&self, previous: &Match, current: &Match) -> anyhow::Result<Detected> {
        // Half-time shorthands count as "in play" here, unlike the
        // built-in MATCH_END rule.
        if !(previous.status.is_live_like() && current.status.is_finished_like()) {
            return Ok(Detected::new());
        }

        let match_key = current.dedup_key();
        if !self.ledger.try_claim(&match_key) {
            return Ok(Detected::new());
        }

        info!(
            match_key = %match_key,
            from = %previous.status,
            to = %current.status,
            "Match finished, queueing sync notification"
        );
        let notice = MatchEndNotice {
            match_key: match_key.clone(),
            previous_status: previous.status.clone(),
            status: current.status.clone(),
        };
        if let Err(e) = self.notice_tx.try_send(notice) {
            // Let a later transition retry.
            self.ledger.release(&match_key);
            match e {
                TrySendError::Full(_) => warn!(match_key = %match_key, "Sync notice queue full"),
                TrySendError::Closed(_) => {
                    warn!(match_key = %match_key, "Sync notifier is not running")
                }
            }
        }
        Ok(Detected::new())
    }
}
