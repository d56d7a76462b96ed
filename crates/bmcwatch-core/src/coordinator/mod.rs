// ── Data coordinator ──
//
// Owns the polling cadence for one BMC connection: the scheduled tick, the
// burst sub-scheduler, the static-data cache and the failure-counting alert
// policy. Every trigger funnels into `refresh()`, which runs at most once at
// a time; concurrent callers join the in-flight run.

mod burst;
mod refresh;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use futures_util::future::{BoxFuture, Shared};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bmcwatch_api::ClientStats;

use crate::alert::AlertSink;
use crate::command::Command;
use crate::config::CoordinatorConfig;
use crate::error::CoreError;
use crate::fetch::FetchClient;
use crate::snapshot::MergedSnapshot;
use crate::stream::SnapshotStream;

use self::burst::BurstCycle;
use self::refresh::StaticCache;

pub(crate) type RefreshResult = Result<Arc<MergedSnapshot>, CoreError>;
type SharedRefresh = Shared<BoxFuture<'static, RefreshResult>>;

/// Alert-policy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Health {
    Normal,
    /// Consecutive connection failures reached the alert threshold.
    Degraded,
}

/// Point-in-time view of coordinator state, for status and diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorStatus {
    pub health: Health,
    pub consecutive_connection_errors: u32,
    pub reauth_required: bool,
    pub has_snapshot: bool,
    pub burst_active: bool,
    /// Seconds until burst mode ends.
    pub burst_remaining_secs: Option<u64>,
    /// Seconds since static data was last fetched.
    pub static_age_secs: Option<u64>,
    pub client_stats: Option<ClientStats>,
}

/// Adaptive polling coordinator for one BMC.
///
/// Cheap to clone; all clones share state. Call [`shutdown`](Self::shutdown)
/// when the connection is torn down so background tasks stop.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("entry_id", &self.inner.entry_id)
            .finish_non_exhaustive()
    }
}

pub(crate) struct CoordinatorInner {
    entry_id: String,
    client: Arc<dyn FetchClient>,
    alerts: Arc<dyn AlertSink>,
    config: CoordinatorConfig,
    cache: Mutex<StaticCache>,
    consecutive_errors: AtomicU32,
    current: watch::Sender<Option<Arc<MergedSnapshot>>>,
    health: watch::Sender<Health>,
    reauth: watch::Sender<bool>,
    in_flight: Mutex<Option<SharedRefresh>>,
    burst: Mutex<Option<BurstCycle>>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    pub fn new(
        entry_id: impl Into<String>,
        client: Arc<dyn FetchClient>,
        alerts: Arc<dyn AlertSink>,
        config: CoordinatorConfig,
    ) -> Self {
        let (current, _) = watch::channel(None);
        let (health, _) = watch::channel(Health::Normal);
        let (reauth, _) = watch::channel(false);
        Self {
            inner: Arc::new(CoordinatorInner {
                entry_id: entry_id.into(),
                client,
                alerts,
                config,
                cache: Mutex::new(StaticCache::default()),
                consecutive_errors: AtomicU32::new(0),
                current,
                health,
                reauth,
                in_flight: Mutex::new(None),
                burst: Mutex::new(None),
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn entry_id(&self) -> &str {
        &self.inner.entry_id
    }

    pub fn host(&self) -> &str {
        self.inner.client.host()
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &Arc<dyn FetchClient> {
        &self.inner.client
    }

    /// The last successfully merged snapshot, if any refresh has succeeded.
    pub fn current_snapshot(&self) -> Option<Arc<MergedSnapshot>> {
        self.inner.current.borrow().clone()
    }

    /// Subscribe to published snapshots.
    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.inner.current.subscribe())
    }

    pub fn consecutive_connection_errors(&self) -> u32 {
        self.inner.consecutive_errors.load(Ordering::SeqCst)
    }

    pub fn health(&self) -> Health {
        *self.inner.health.borrow()
    }

    pub fn subscribe_health(&self) -> watch::Receiver<Health> {
        self.inner.health.subscribe()
    }

    /// `true` after an authentication failure. Scheduled and burst polling
    /// stop; a new session with updated credentials is needed.
    pub fn reauth_required(&self) -> bool {
        *self.inner.reauth.borrow()
    }

    pub fn subscribe_reauth(&self) -> watch::Receiver<bool> {
        self.inner.reauth.subscribe()
    }

    pub async fn status(&self) -> CoordinatorStatus {
        let now = Instant::now();
        let burst_deadline = self.burst_deadline().await;
        let static_age = self.inner.cache.lock().await.age(now);
        CoordinatorStatus {
            health: self.health(),
            consecutive_connection_errors: self.consecutive_connection_errors(),
            reauth_required: self.reauth_required(),
            has_snapshot: self.inner.current.borrow().is_some(),
            burst_active: burst_deadline.is_some(),
            burst_remaining_secs: burst_deadline
                .map(|deadline| deadline.saturating_duration_since(now).as_secs()),
            static_age_secs: static_age.map(|age| age.as_secs()),
            client_stats: self.inner.client.stats(),
        }
    }

    // ── Refresh requests ─────────────────────────────────────────────

    /// Refresh now, discarding the snapshot. Joins an in-flight refresh.
    pub async fn request_refresh(&self) -> Result<(), CoreError> {
        self.refresh().await.map(drop)
    }

    /// Enter burst mode, then refresh now.
    pub async fn request_refresh_burst(&self) -> Result<(), CoreError> {
        self.enable_burst_mode().await;
        self.request_refresh().await
    }

    /// Invalidate the static cache and refresh.
    pub async fn force_static_refresh(&self) -> Result<Arc<MergedSnapshot>, CoreError> {
        self.mark_static_stale().await;
        self.refresh().await
    }

    pub(crate) async fn mark_static_stale(&self) {
        self.inner.cache.lock().await.request_force();
        debug!("static data marked stale");
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run a control action, then poll in burst mode so the effect is
    /// picked up quickly.
    ///
    /// The action's error is returned; the follow-up refresh is only logged.
    pub async fn execute(&self, command: Command) -> Result<(), CoreError> {
        info!(%command, host = %self.host(), "executing command");
        self.inner.client.execute(&command).await?;

        if command.touches_static() {
            self.mark_static_stale().await;
        }
        if let Err(e) = self.request_refresh_burst().await {
            warn!(error = %e, "refresh after command failed");
        }
        Ok(())
    }

    // ── Scheduled polling ────────────────────────────────────────────

    /// Spawn the scan-interval polling task.
    ///
    /// The first tick fires one `scan_interval` from now; callers perform
    /// the initial refresh themselves.
    pub async fn start_polling(&self) {
        let handle = tokio::spawn(refresh_task(
            self.clone(),
            self.inner.config.scan_interval,
            self.inner.cancel.child_token(),
        ));
        self.inner.tasks.lock().await.push(handle);
        debug!(interval = ?self.inner.config.scan_interval, "polling started");
    }

    /// Stop scheduled and burst polling and wait for the tasks to exit.
    ///
    /// A refresh already in flight runs to completion.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let burst = self.inner.burst.lock().await.take();
        let mut handles: Vec<JoinHandle<()>> = self.inner.tasks.lock().await.drain(..).collect();
        handles.extend(burst.map(BurstCycle::into_handle));
        for handle in handles {
            let _ = handle.await;
        }
        debug!("coordinator stopped");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodic refresh at the normal scan interval.
///
/// Exits on cancellation or once credentials are rejected.
async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if coordinator.reauth_required() {
                    warn!("polling halted until credentials are updated");
                    break;
                }
                match coordinator.refresh().await {
                    Ok(_) => {}
                    Err(e) if e.is_auth() => {
                        warn!("polling halted until credentials are updated");
                        break;
                    }
                    Err(e) => debug!(error = %e, "scheduled refresh failed"),
                }
            }
        }
    }
}

