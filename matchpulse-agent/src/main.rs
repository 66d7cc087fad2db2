//! matchpulse agent
//!
//! Hosts the live football data pipeline as a long-running process: polls
//! the data endpoint, detects match events, drives ambient effects and
//! notifications, and reports finished matches back to the backend.

mod activity;
mod config;
mod connectivity;
mod notify;
mod shutdown;
mod state;

use clap::Parser;
use config::ConfigLoader;
use connectivity::ConnectivityProbe;
use matchpulse_core::LivePipeline;
use matchpulse_core::config::ConfigStore;
use matchpulse_core::consumers::{AmbientEngine, attach_notifications};
use matchpulse_core::events::match_end_notice_channel;
use matchpulse_core::ledger::NotificationLedger;
use matchpulse_core::processors::SyncNotifier;
use matchpulse_core::source::{CachedSource, HttpSnapshotSource};
use matchpulse_sdk::client::DataClient;
use shutdown::{shutdown_signal, spawn_config_reload_handler};
use state::AgentState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// matchpulse - live football data agent
#[derive(Parser, Debug)]
#[command(name = "matchpulse-agent")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./matchpulse.toml")]
    config: PathBuf,

    /// Override the data endpoint base URL (e.g., http://localhost:8788)
    #[arg(short, long, env = "MATCHPULSE_BASE_URL")]
    base_url: Option<Url>,

    /// Do not treat stdin lines as user activity
    #[arg(long, default_value = "false")]
    no_stdin_activity: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    tracing::info!("Starting matchpulse-agent v{}", env!("CARGO_PKG_VERSION"));

    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.base_url));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", config_loader.path());

    let http = reqwest::Client::builder()
        .timeout(loaded_config.source.timeout)
        .build()?;
    let client = DataClient::new(loaded_config.source.base_url.clone()).with_http_client(http);
    let source = CachedSource::new(
        HttpSnapshotSource::new(client.clone()),
        loaded_config.source.cache_ttl,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = Vec::new();

    let mut pipeline = LivePipeline::new(source, ConfigStore::new(loaded_config.polling.clone()));

    if loaded_config.notifications.enabled {
        let ledger = Arc::new(
            NotificationLedger::open(&loaded_config.notifications.ledger_path).map_err(|e| {
                tracing::error!("Failed to open notification ledger: {}", e);
                e
            })?,
        );
        let (notice_tx, notice_rx) = match_end_notice_channel();
        pipeline = pipeline.with_match_end_watcher(Arc::clone(&ledger), notice_tx);

        let notifier = SyncNotifier::new(client, ledger);
        tasks.push(tokio::spawn(notifier.run(shutdown_rx.clone(), notice_rx)));
    } else {
        tracing::info!("Match-end sync notifications disabled");
    }

    let ambient = Arc::new(AmbientEngine::new(loaded_config.followed_team_id));
    ambient.attach(pipeline.bus());
    attach_notifications(pipeline.bus(), Arc::new(notify::LogSink));
    pipeline
        .state()
        .subscribe(|state| tracing::info!(state = %state, "Application state"));

    let state = AgentState::new(pipeline);

    {
        let state = state.clone();
        let shutdown_rx = shutdown_rx.clone();
        tasks.push(tokio::spawn(async move {
            state.pipeline.run(shutdown_rx).await;
        }));
    }

    if args.no_stdin_activity {
        tracing::info!("stdin activity feeder disabled");
    } else {
        tasks.push(activity::spawn_stdin_activity(state.clone(), shutdown_rx.clone()));
    }

    match ConnectivityProbe::for_url(&loaded_config.source.base_url, loaded_config.connectivity) {
        Some(probe) => {
            let app_state = Arc::clone(state.pipeline.state());
            tasks.push(probe.spawn(app_state, shutdown_rx.clone()));
        }
        None => tracing::warn!("Base URL has no probeable host, connectivity feeder disabled"),
    }

    // Spawn config reload handler (listens for SIGHUP)
    let reload_notify = spawn_config_reload_handler(state.clone(), config_loader);

    shutdown_signal().await;

    let _ = shutdown_tx.send(true);
    reload_notify.notify_one();
    for task in tasks {
        if let Err(e) = task.await {
            tracing::warn!("Background task ended abnormally: {}", e);
        }
    }

    tracing::info!("matchpulse-agent shutdown complete");
    Ok(())
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,matchpulse_core=debug,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
