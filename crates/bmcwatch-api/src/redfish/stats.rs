// Request statistics
//
// Lock-free counters updated on every request; read by the diagnostics
// export and the API response time sensor.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Default)]
pub(crate) struct RequestStats {
    total: AtomicU64,
    failed: AtomicU64,
    total_micros: AtomicU64,
    last_micros: AtomicU64,
}

impl RequestStats {
    pub(crate) fn record(&self, elapsed: Duration, failed: bool) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.total.fetch_add(1, Ordering::Relaxed);
        self.total_micros.fetch_add(micros, Ordering::Relaxed);
        self.last_micros.store(micros, Ordering::Relaxed);
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self) -> ClientStats {
        let total_requests = self.total.load(Ordering::Relaxed);
        let total_micros = self.total_micros.load(Ordering::Relaxed);
        let last_micros = self.last_micros.load(Ordering::Relaxed);
        ClientStats {
            total_requests,
            failed_requests: self.failed.load(Ordering::Relaxed),
            average_response_ms: total_micros
                .checked_div(total_requests)
                .map(micros_to_ms),
            last_response_ms: (total_requests > 0).then(|| micros_to_ms(last_micros)),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn micros_to_ms(micros: u64) -> f64 {
    micros as f64 / 1000.0
}

/// Point-in-time view of a client's request counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClientStats {
    pub total_requests: u64,
    /// Transport failures and 5xx responses.
    pub failed_requests: u64,
    pub average_response_ms: Option<f64>,
    pub last_response_ms: Option<f64>,
}
