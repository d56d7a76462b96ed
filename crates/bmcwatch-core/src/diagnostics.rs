// ── Diagnostics export ──
//
// A JSON document for bug reports: connection settings, polling options,
// the merged snapshot, coordinator state and client request statistics.
// Identifying values are replaced before the document leaves this module.

use serde_json::{Map, Value, json};

use crate::config::TlsVerification;
use crate::coordinator::{Coordinator, CoordinatorStatus};
use crate::error::CoreError;
use crate::session::Session;
use crate::snapshot::MergedSnapshot;

pub const REDACTED: &str = "**REDACTED**";

/// Normalized key names that are always redacted.
const REDACT_KEYS: &[&str] = &[
    "password",
    "username",
    "serialnumber",
    "uuid",
    "token",
    "sessionuri",
    "macaddress",
    "boardserialnumber",
];

/// Keys compare case-insensitively with `_` and `-` ignored, so
/// `SerialNumber`, `serial_number` and `serial-number` all match.
fn is_sensitive(key: &str) -> bool {
    let normalized: String = key
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect();
    REDACT_KEYS.contains(&normalized.as_str())
}

/// Recursively replace the values of sensitive keys.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if is_sensitive(key) {
                    *inner = Value::String(REDACTED.to_owned());
                } else {
                    redact(inner);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

/// Assemble and redact a diagnostics document.
pub fn build(
    entry: Value,
    snapshot: Option<&MergedSnapshot>,
    status: &CoordinatorStatus,
) -> Result<Value, CoreError> {
    let snapshot = snapshot
        .map(serde_json::to_value)
        .transpose()
        .map_err(|e| CoreError::Internal(format!("serialize snapshot: {e}")))?;
    let status = serde_json::to_value(status)
        .map_err(|e| CoreError::Internal(format!("serialize status: {e}")))?;

    let mut doc = Value::Object(Map::from_iter([
        ("entry".to_owned(), entry),
        ("coordinator".to_owned(), status),
        ("snapshot".to_owned(), snapshot.unwrap_or(Value::Null)),
    ]));
    redact(&mut doc);
    Ok(doc)
}

/// Diagnostics for a started session.
pub async fn collect(session: &Session) -> Result<Value, CoreError> {
    let coordinator = session
        .coordinator()
        .await
        .ok_or(CoreError::NotConnected)?;
    collect_for(session, &coordinator).await
}

async fn collect_for(
    session: &Session,
    coordinator: &Coordinator,
) -> Result<Value, CoreError> {
    let connection = session.connection().await;
    let options = session.coordinator_config();
    let verify_ssl = connection.tls != TlsVerification::DangerAcceptInvalid;
    let snapshot = coordinator.current_snapshot();
    let title = snapshot
        .as_deref()
        .map_or_else(|| connection.host.clone(), |s| s.title(&connection.host));

    let entry = json!({
        "entry_id": session.entry_id(),
        "title": title,
        "state": session.state(),
        "data": {
            "host": connection.host,
            "username": connection.credentials.username,
            "verify_ssl": verify_ssl,
            "timeout_secs": connection.timeout.as_secs(),
            "max_concurrent_requests": connection.max_concurrent_requests,
        },
        "options": {
            "scan_interval": options.scan_interval.as_secs(),
            "burst_interval": options.burst_interval.as_secs(),
            "burst_duration": options.burst_duration.as_secs(),
            "static_interval": options.static_max_age.as_secs(),
        },
    });

    build(entry, snapshot.as_deref(), &coordinator.status().await)
}
