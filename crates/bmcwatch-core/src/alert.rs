// ── Operator-visible alerts ──
//
// Persistent, host-scoped issues raised by the coordinator's failure
// policy. Raising is an idempotent upsert keyed by issue id; an issue
// stays until something explicitly clears it (the repair flow).

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

/// Issue id for the connection-failure alert of one configured BMC.
pub fn connection_issue_id(entry_id: &str) -> String {
    format!("connection_failed_{entry_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    ConnectionFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// A persistent alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub id: String,
    pub kind: IssueKind,
    /// The configured connection the issue belongs to.
    pub entry_id: String,
    pub host: String,
    pub error_count: u32,
    pub severity: Severity,
    /// Has a guided repair flow.
    pub fixable: bool,
    /// Survives until explicitly cleared, even after recovery.
    pub persistent: bool,
    pub raised_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn connection_failed(entry_id: &str, host: &str, error_count: u32) -> Self {
        let now = Utc::now();
        Self {
            id: connection_issue_id(entry_id),
            kind: IssueKind::ConnectionFailed,
            entry_id: entry_id.to_owned(),
            host: host.to_owned(),
            error_count,
            severity: Severity::Error,
            fixable: true,
            persistent: true,
            raised_at: now,
            updated_at: now,
        }
    }
}

/// Where the coordinator sends alerts.
pub trait AlertSink: Send + Sync {
    /// Create the issue, or update it in place if one with the same id exists.
    fn raise(&self, issue: Issue);

    /// Remove an issue. Returns `true` if it existed.
    fn clear(&self, issue_id: &str) -> bool;

    fn get(&self, issue_id: &str) -> Option<Issue>;
}

/// In-memory issue registry.
///
/// Observers can wait on `subscribe()`; the counter bumps on every change.
pub struct IssueRegistry {
    issues: DashMap<String, Issue>,
    revision: watch::Sender<u64>,
}

impl Default for IssueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IssueRegistry {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            issues: DashMap::new(),
            revision,
        }
    }

    /// All open issues, oldest first.
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues: Vec<Issue> = self.issues.iter().map(|e| e.value().clone()).collect();
        issues.sort_by(|a, b| a.raised_at.cmp(&b.raised_at).then_with(|| a.id.cmp(&b.id)));
        issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Change notifications.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl AlertSink for IssueRegistry {
    fn raise(&self, issue: Issue) {
        match self.issues.entry(issue.id.clone()) {
            Entry::Occupied(mut existing) => {
                let existing = existing.get_mut();
                debug!(id = %issue.id, error_count = issue.error_count, "updating issue");
                existing.error_count = issue.error_count;
                existing.host = issue.host;
                existing.updated_at = issue.updated_at;
            }
            Entry::Vacant(slot) => {
                info!(id = %issue.id, host = %issue.host, error_count = issue.error_count, "raising issue");
                slot.insert(issue);
            }
        }
        self.bump();
    }

    fn clear(&self, issue_id: &str) -> bool {
        let removed = self.issues.remove(issue_id).is_some();
        if removed {
            info!(id = %issue_id, "issue cleared");
            self.bump();
        }
        removed
    }

    fn get(&self, issue_id: &str) -> Option<Issue> {
        self.issues.get(issue_id).map(|e| e.value().clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn raise_is_idempotent() {
        let registry = IssueRegistry::new();
        registry.raise(Issue::connection_failed("e1", "10.0.0.5", 3));
        let first = registry.get("connection_failed_e1").unwrap();

        registry.raise(Issue::connection_failed("e1", "10.0.0.5", 4));
        assert_eq!(registry.len(), 1);
        let updated = registry.get("connection_failed_e1").unwrap();
        assert_eq!(updated.error_count, 4);
        assert_eq!(updated.raised_at, first.raised_at);
    }

    #[test]
    fn issues_are_scoped_by_entry() {
        let registry = IssueRegistry::new();
        registry.raise(Issue::connection_failed("e1", "10.0.0.5", 3));
        registry.raise(Issue::connection_failed("e2", "10.0.0.6", 3));
        assert_eq!(registry.issues().len(), 2);
        assert!(registry.clear("connection_failed_e1"));
        assert!(!registry.clear("connection_failed_e1"));
        assert_eq!(registry.issues()[0].host, "10.0.0.6");
    }

    #[test]
    fn changes_bump_revision() {
        let registry = IssueRegistry::new();
        let rx = registry.subscribe();
        registry.raise(Issue::connection_failed("e1", "h", 3));
        registry.clear("connection_failed_e1");
        assert_eq!(*rx.borrow(), 2);
    }

    #[test]
    fn connection_issue_is_fixable_and_persistent() {
        let issue = Issue::connection_failed("abc", "bmc.lan", 3);
        assert_eq!(issue.id, "connection_failed_abc");
        assert!(issue.fixable);
        assert!(issue.persistent);
        assert_eq!(issue.severity, Severity::Error);
    }
}
