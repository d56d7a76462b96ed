// ── Refresh protocol ──
//
// One refresh = dynamic fetch, static fetch (or cache reuse), merge,
// publish. The body runs in its own task so a caller that stops waiting
// never aborts a half-finished cycle; the coalescing slot is cleared by
// that task once the result is settled.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::time::Instant;
use tracing::{debug, error, info, trace, warn};

use bmcwatch_api::models::StaticSnapshot;

use super::{Coordinator, CoordinatorInner, Health, RefreshResult, SharedRefresh};
use crate::alert::Issue;
use crate::config::CONNECTION_ERROR_THRESHOLD;
use crate::error::{CoreError, ErrorKind};
use crate::snapshot::{MergedSnapshot, merge};

/// Cached static snapshot plus the force-refresh bookkeeping.
///
/// A force request is satisfied only by a static fetch that *started* after
/// the request, so a fetch already in flight cannot swallow it.
#[derive(Default)]
pub(crate) struct StaticCache {
    snapshot: Option<Arc<StaticSnapshot>>,
    fetched_at: Option<Instant>,
    force_requested: u64,
    force_satisfied: u64,
}

impl StaticCache {
    pub(crate) fn request_force(&mut self) {
        self.force_requested += 1;
    }

    pub(crate) fn age(&self, now: Instant) -> Option<Duration> {
        self.fetched_at.map(|at| now.saturating_duration_since(at))
    }

    fn reusable(&self, now: Instant, max_age: Duration) -> Option<Arc<StaticSnapshot>> {
        if self.force_requested > self.force_satisfied {
            return None;
        }
        let age = self.age(now)?;
        if age > max_age {
            return None;
        }
        self.snapshot.clone()
    }

    fn store(&mut self, snapshot: Arc<StaticSnapshot>, fetched_at: Instant, generation: u64) {
        self.snapshot = Some(snapshot);
        self.fetched_at = Some(fetched_at);
        self.force_satisfied = self.force_satisfied.max(generation);
    }
}

impl Coordinator {
    /// Run one refresh cycle, or join the one already running.
    ///
    /// Every caller of a coalesced cycle receives the same result, down to
    /// the same `Arc`. On failure the published snapshot is left untouched.
    pub async fn refresh(&self) -> RefreshResult {
        let pending = {
            let mut slot = self.inner.in_flight.lock().await;
            match slot.as_ref() {
                Some(pending) => {
                    trace!("joining in-flight refresh");
                    pending.clone()
                }
                None => {
                    let pending = self.start_refresh();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    fn start_refresh(&self) -> SharedRefresh {
        let inner = Arc::clone(&self.inner);
        let handle = tokio::spawn(async move {
            let result = inner.run_refresh().await;
            inner.in_flight.lock().await.take();
            result
        });
        async move {
            handle
                .await
                .unwrap_or_else(|e| Err(CoreError::Internal(format!("refresh task failed: {e}"))))
        }
        .boxed()
        .shared()
    }
}

impl CoordinatorInner {
    async fn run_refresh(&self) -> RefreshResult {
        let started = Instant::now();
        match self.fetch_and_merge().await {
            Ok(snapshot) => {
                self.on_success(&snapshot);
                debug!(elapsed = ?started.elapsed(), "refresh complete");
                Ok(snapshot)
            }
            Err(e) => Err(self.on_failure(e)),
        }
    }

    async fn fetch_and_merge(&self) -> Result<Arc<MergedSnapshot>, CoreError> {
        let dynamic = self.client.fetch_dynamic().await?;
        let static_data = self.static_data().await?;
        Ok(Arc::new(merge(&static_data, &dynamic)))
    }

    /// Cached static data if fresh, otherwise a new fetch.
    async fn static_data(&self) -> Result<Arc<StaticSnapshot>, CoreError> {
        let now = Instant::now();
        let (cached, generation) = {
            let cache = self.cache.lock().await;
            (
                cache.reusable(now, self.config.static_max_age),
                cache.force_requested,
            )
        };
        if let Some(cached) = cached {
            trace!("reusing cached static data");
            return Ok(cached);
        }

        debug!("fetching static data");
        let fresh = Arc::new(self.client.fetch_static().await?);
        self.cache
            .lock()
            .await
            .store(Arc::clone(&fresh), now, generation);
        Ok(fresh)
    }

    fn on_success(&self, snapshot: &Arc<MergedSnapshot>) {
        let previous = self.consecutive_errors.swap(0, Ordering::SeqCst);
        if previous > 0 {
            info!(host = %self.client.host(), previous, "connection recovered");
        }
        self.health.send_if_modified(|health| {
            let changed = *health != Health::Normal;
            *health = Health::Normal;
            changed
        });
        self.current.send_replace(Some(Arc::clone(snapshot)));
    }

    /// Apply the failure policy and return the error callers should see.
    fn on_failure(&self, err: CoreError) -> CoreError {
        let host = self.client.host().to_owned();
        // A shut-down coordinator no longer owns the connection's health.
        if self.cancel.is_cancelled() {
            debug!(%host, error = %err, "refresh failed after shutdown");
            return err;
        }
        match err.kind() {
            ErrorKind::Auth => {
                warn!(%host, error = %err, "authentication failed, reauthentication required");
                self.reauth.send_replace(true);
                match err {
                    CoreError::ReauthRequired { .. } => err,
                    other => CoreError::ReauthRequired {
                        host,
                        message: other.to_string(),
                    },
                }
            }
            ErrorKind::Connection => {
                let count = self.consecutive_errors.fetch_add(1, Ordering::SeqCst) + 1;
                warn!(
                    %host,
                    error = %err,
                    "connection error ({count}/{CONNECTION_ERROR_THRESHOLD})"
                );
                if count >= CONNECTION_ERROR_THRESHOLD {
                    self.alerts
                        .raise(Issue::connection_failed(&self.entry_id, &host, count));
                    self.health.send_if_modified(|health| {
                        let changed = *health != Health::Degraded;
                        *health = Health::Degraded;
                        changed
                    });
                }
                err
            }
            ErrorKind::Unexpected => {
                error!(%host, error = ?err, "unexpected error during refresh");
                CoreError::RefreshFailed {
                    message: err.to_string(),
                }
            }
        }
    }
}
