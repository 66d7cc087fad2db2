//! User activity feeder.
//!
//! A headless agent has no pointer or scroll events; every line typed on
//! stdin counts as a key press.
//!
//! Lines are read on a plain OS thread: a blocking stdin read cannot be
//! cancelled, and a runtime-managed blocking task would hold up shutdown.

use crate::state::AgentState;
use matchpulse_core::processors::ActivitySignal;
use std::io::BufRead;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub fn spawn_stdin_activity(state: AgentState, mut shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
    let (line_tx, mut line_rx) = mpsc::channel::<()>(8);

    let reader = std::thread::Builder::new()
        .name("stdin-activity".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                if let Err(e) = line {
                    warn!(error = %e, "Failed to read stdin");
                    break;
                }
                if line_tx.blocking_send(()).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = reader {
        warn!(error = %e, "Failed to start stdin reader, activity feeder disabled");
    }

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        break;
                    }
                }

                line = line_rx.recv() => {
                    if line.is_none() {
                        info!("stdin closed, activity feeder stopped");
                        break;
                    }
                    let poller = state.pipeline.poller();
                    if poller.record_activity(ActivitySignal::KeyPress).await {
                        info!("Activity after idle period, polling now");
                    } else {
                        debug!("Recorded activity");
                    }
                }
            }
        }
    })
}
