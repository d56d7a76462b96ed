// ── Burst mode ──
//
// A bounded window of fast polling after a user action. At most one burst
// cycle exists; enabling burst mode again cancels the running cycle and
// starts a fresh full-length window.

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::Coordinator;

pub(crate) struct BurstCycle {
    cancel: CancellationToken,
    deadline: Instant,
    handle: JoinHandle<()>,
}

impl BurstCycle {
    pub(crate) fn into_handle(self) -> JoinHandle<()> {
        self.cancel.cancel();
        self.handle
    }

    fn is_active(&self, now: Instant) -> bool {
        !self.handle.is_finished() && now < self.deadline
    }
}

impl Coordinator {
    /// Start (or restart) burst mode for `burst_duration`.
    pub async fn enable_burst_mode(&self) {
        if self.is_shut_down() {
            return;
        }

        let config = self.inner.config;
        let deadline = Instant::now() + config.burst_duration;
        let cancel = self.inner.cancel.child_token();

        let mut slot = self.inner.burst.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel.cancel();
            debug!("restarting burst window");
        }
        let handle = tokio::spawn(burst_task(self.clone(), deadline, cancel.clone()));
        *slot = Some(BurstCycle {
            cancel,
            deadline,
            handle,
        });
        debug!(
            interval = ?config.burst_interval,
            duration = ?config.burst_duration,
            "burst mode enabled"
        );
    }

    pub async fn burst_active(&self) -> bool {
        self.burst_deadline().await.is_some()
    }

    /// End of the active burst window, if one is running.
    pub async fn burst_deadline(&self) -> Option<Instant> {
        let now = Instant::now();
        self.inner
            .burst
            .lock()
            .await
            .as_ref()
            .filter(|cycle| cycle.is_active(now))
            .map(|cycle| cycle.deadline)
    }
}

/// Refresh every `burst_interval` until the deadline passes.
async fn burst_task(coordinator: Coordinator, deadline: Instant, cancel: CancellationToken) {
    let period = coordinator.config().burst_interval;

    while Instant::now() < deadline {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                trace!("burst cycle cancelled");
                return;
            }
            () = tokio::time::sleep(period) => {}
        }
        if coordinator.reauth_required() {
            debug!("burst mode stopped, reauthentication required");
            return;
        }
        if let Err(e) = coordinator.refresh().await {
            debug!(error = %e, "burst refresh failed");
        }
    }
    debug!("burst mode ended");
}
