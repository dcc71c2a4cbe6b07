//! oeks-watch – console companion to the dashboard.  Polls the roster,
//! keeps the realtime channel open and logs a summary on every refresh.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::watch;
use tracing::{info, warn};

use oeks_client::{ApiClient, Poller, PollerOptions, RealtimeChannel, RosterSnapshot};
use oeks_common::config::{self, Config};
use oeks_common::filter::{self, FilterState, StatusFilter};
use oeks_common::protocol::ConnectionStatus;
use oeks_common::timefmt::format_time_ago;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── load config ──────────────────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("OEKS_CONFIG").ok())
        .unwrap_or_else(|| Config::default_path().to_string());
    let config = config::load_or_default(&PathBuf::from(&config_path)).context("Config load failed")?;

    info!(
        "OEKS watcher starting (api={}, ws={})",
        config.api_base_url,
        config.websocket_url()
    );

    let filter = filter_from_env(&config);
    if !filter.is_default() {
        info!(
            "Filter: division={} name={} status={} search={:?}",
            filter.division,
            filter.name,
            filter.status.as_str(),
            filter.search
        );
    }

    // ── ctrl-c ───────────────────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        info!("Shutdown signal received");
        shutdown_tx.send_replace(true);
    })
    .context("Cannot set Ctrl-C handler")?;

    // ── poller + realtime channel ────────────────────────────────────
    let api = ApiClient::new(&config).context("Cannot build API client")?;
    let poller = Poller::spawn(api, PollerOptions::from_config(&config));

    let (status_tx, mut status_rx) = watch::channel(ConnectionStatus::Connecting);
    let channel = RealtimeChannel::from_config(&config);
    let realtime_shutdown = shutdown_rx.clone();
    let realtime = tokio::spawn(async move { channel.run(status_tx, realtime_shutdown).await });

    // ── main loop ────────────────────────────────────────────────────
    let mut snapshots = poller.subscribe();
    let mut shutdown = shutdown_rx;
    let mut realtime_open = true;
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    warn!("Roster poller stopped unexpectedly");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                log_snapshot(&snapshot, &filter);
            }
            changed = status_rx.changed(), if realtime_open => {
                match changed {
                    Ok(()) => info!("Realtime channel: {}", status_rx.borrow_and_update().label()),
                    Err(_) => realtime_open = false,
                }
            }
            _ = shutdown.wait_for(|stop| *stop) => break,
        }
    }

    poller.shutdown().await;
    if tokio::time::timeout(Duration::from_secs(2), realtime).await.is_err() {
        warn!("Realtime channel did not stop in time");
    }
    info!("OEKS watcher stopped");
    Ok(())
}

/// Optional roster filter from `OEKS_FILTER_*` variables.
fn filter_from_env(config: &Config) -> FilterState {
    let var = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
    let mut filter = FilterState::default().with_window(config.active_window());
    if let Some(division) = var("OEKS_FILTER_DIVISION") {
        filter.division = division;
    }
    if let Some(name) = var("OEKS_FILTER_NAME") {
        filter.name = name;
    }
    if let Some(status) = var("OEKS_FILTER_STATUS") {
        filter.status = status.parse().unwrap_or(StatusFilter::All);
    }
    if let Some(search) = var("OEKS_FILTER_SEARCH") {
        filter.search = search;
    }
    filter
}

fn log_snapshot(snapshot: &RosterSnapshot, filter: &FilterState) {
    let now = Utc::now();
    if snapshot.status == ConnectionStatus::Error {
        warn!("Roster unavailable ({})", snapshot.status.label());
        return;
    }

    let stats = snapshot.roster.stats();
    info!(
        "Roster: {} staff, {} recording, {} with screenshots",
        stats.total, stats.active, stats.with_screenshot
    );
    if snapshot.roster.is_empty() {
        info!("No staff members found");
        return;
    }

    let outcome = filter::apply(&snapshot.roster, filter, now);
    if outcome.show_empty_state {
        info!("No staff match the current filters");
        return;
    }
    for record in outcome.visible.iter().filter_map(|id| snapshot.roster.get(id)) {
        info!(
            "  {:<24} {:<16} {:<10} last seen {}",
            record.name,
            record.division,
            record.recording_status.label(),
            format_time_ago(Some(&record.timestamp), now)
        );
    }
}
