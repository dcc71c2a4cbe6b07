//! Background roster polling.
//!
//! A single task owns the fetch loop.  Timer ticks and manual refresh
//! requests only arm a debounce deadline; the fetch runs once the deadline
//! passes, so a burst of triggers costs one request.  Every completed fetch
//! replaces the whole snapshot on a `watch` channel.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info};

use oeks_common::config::Config;
use oeks_common::protocol::ConnectionStatus;
use oeks_common::roster::{Roster, StaffListResponse};

use crate::api::{ApiClient, ApiError};

/// Anything that can produce the current staff list.
pub trait RosterSource: Send + Sync + 'static {
    fn fetch_roster(&self) -> impl Future<Output = Result<StaffListResponse, ApiError>> + Send;
}

impl RosterSource for ApiClient {
    fn fetch_roster(&self) -> impl Future<Output = Result<StaffListResponse, ApiError>> + Send {
        self.staff_list()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerOptions {
    /// `None` disables automatic refresh.
    pub interval: Option<Duration>,
    pub debounce: Duration,
}

impl PollerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.refresh_interval(),
            debounce: config.debounce(),
        }
    }
}

/// Result of the latest fetch.  A failed fetch yields an empty roster with
/// [`ConnectionStatus::Error`]; the previous roster is not kept.
#[derive(Debug, Clone, Default)]
pub struct RosterSnapshot {
    pub roster: Roster,
    pub status: ConnectionStatus,
    pub fetched_at: Option<DateTime<Utc>>,
}

enum Command {
    Refresh,
    SetInterval(Option<Duration>),
    Shutdown,
}

/// Control side of a running poller.
pub struct PollerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<RosterSnapshot>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn subscribe(&self) -> watch::Receiver<RosterSnapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> RosterSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Request a fetch after the debounce delay.
    pub fn refresh(&self) {
        let _ = self.commands.send(Command::Refresh);
    }

    pub fn set_interval(&self, interval: Option<Duration>) {
        let _ = self.commands.send(Command::SetInterval(interval));
    }

    /// Stop the loop and wait for it to exit.
    pub async fn shutdown(self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            error!("Poller task failed: {e}");
        }
    }
}

pub struct Poller<S> {
    source: S,
    options: PollerOptions,
    commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<RosterSnapshot>,
}

impl<S: RosterSource> Poller<S> {
    /// Start polling.  The first fetch happens immediately.
    pub fn spawn(source: S, options: PollerOptions) -> PollerHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (snap_tx, snap_rx) = watch::channel(RosterSnapshot::default());
        let poller = Poller {
            source,
            options,
            commands: cmd_rx,
            snapshots: snap_tx,
        };
        let task = tokio::spawn(poller.run());
        PollerHandle {
            commands: cmd_tx,
            snapshots: snap_rx,
            task,
        }
    }

    async fn run(mut self) {
        info!(
            "Roster poller started (interval={:?}, debounce={:?})",
            self.options.interval, self.options.debounce
        );
        let mut ticker = self.options.interval.map(ticker_for);
        let mut due = Some(Instant::now());

        loop {
            tokio::select! {
                _ = next_tick(&mut ticker) => {
                    debug!("Auto-refresh tick");
                    due = Some(Instant::now() + self.options.debounce);
                }
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Refresh) => {
                        debug!("Refresh requested");
                        due = Some(Instant::now() + self.options.debounce);
                    }
                    Some(Command::SetInterval(interval)) => {
                        match interval {
                            Some(period) => info!("Auto-refresh every {period:?}"),
                            None => info!("Auto-refresh disabled"),
                        }
                        ticker = interval.map(ticker_for);
                    }
                    Some(Command::Shutdown) | None => break,
                },
                _ = wait_until(due) => {
                    due = None;
                    let snapshot = fetch(&self.source).await;
                    self.snapshots.send_replace(snapshot);
                }
            }
        }
        info!("Roster poller stopped");
    }
}

async fn fetch<S: RosterSource>(source: &S) -> RosterSnapshot {
    let now = Utc::now();
    match source.fetch_roster().await {
        Ok(resp) => {
            let roster = Roster::from_response(resp, now);
            debug!("Roster refreshed: {} staff", roster.len());
            RosterSnapshot {
                roster,
                status: ConnectionStatus::Connected,
                fetched_at: Some(now),
            }
        }
        Err(e) => {
            error!("Error fetching staff list: {e}");
            RosterSnapshot {
                roster: Roster::empty(),
                status: ConnectionStatus::Error,
                fetched_at: Some(now),
            }
        }
    }
}

fn ticker_for(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}

// ─── tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use oeks_common::roster::{RecordingStatus, StaffRecord};
    use reqwest::StatusCode;

    #[derive(Clone)]
    struct FakeSource {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl FakeSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl RosterSource for FakeSource {
        fn fetch_roster(
            &self,
        ) -> impl Future<Output = Result<StaffListResponse, ApiError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            async move {
                if fail {
                    return Err(ApiError::Status {
                        endpoint: "/api/staff-list".into(),
                        status: StatusCode::BAD_GATEWAY,
                    });
                }
                let record = StaffRecord {
                    id: String::new(),
                    name: "Ayse".into(),
                    division: "IT".into(),
                    recording_status: RecordingStatus::Active,
                    timestamp: "2024-05-01T10:00:00Z".into(),
                    screenshot_path: None,
                    video_path: None,
                    last_5min_video: None,
                };
                Ok(StaffListResponse {
                    staff_list: vec!["pc_1".into()],
                    staff_data: HashMap::from([("pc_1".to_string(), record)]),
                })
            }
        }
    }

    fn options(interval: Option<u64>) -> PollerOptions {
        PollerOptions {
            interval: interval.map(Duration::from_secs),
            debounce: Duration::from_millis(300),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_fetch_publishes_roster() {
        let source = FakeSource::new(false);
        let handle = Poller::spawn(source.clone(), options(None));
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();

        let snap = rx.borrow_and_update().clone();
        assert_eq!(snap.status, ConnectionStatus::Connected);
        assert_eq!(snap.roster.len(), 1);
        assert_eq!(snap.roster.get("pc_1").map(|r| r.name.as_str()), Some("Ayse"));
        assert_eq!(source.calls(), 1);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_clears_roster() {
        let handle = Poller::spawn(FakeSource::new(true), options(None));
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();

        let snap = rx.borrow_and_update().clone();
        assert_eq!(snap.status, ConnectionStatus::Error);
        assert!(snap.roster.is_empty());
        assert!(snap.fetched_at.is_some());
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_burst_is_debounced() {
        let source = FakeSource::new(false);
        let handle = Poller::spawn(source.clone(), options(None));
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();

        for _ in 0..5 {
            handle.refresh();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        rx.changed().await.unwrap();
        assert_eq!(source.calls(), 2);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(source.calls(), 2);
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_ticks_and_can_be_disabled() {
        let source = FakeSource::new(false);
        let handle = Poller::spawn(source.clone(), options(Some(10)));
        let mut rx = handle.subscribe();
        rx.changed().await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(source.calls(), 2);

        handle.set_interval(None);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), 2);
        handle.shutdown().await;
    }
}
