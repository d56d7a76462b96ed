// ── Repair flow ──
//
// Guided resolution of the connection-failure issue: test new credentials
// with a throwaway client, store them, reload, clear the issue. A failed
// attempt or a failed reload leaves the issue open.

use thiserror::Error;
use tracing::{info, warn};

use crate::alert::{Issue, connection_issue_id};
use crate::config::Credentials;
use crate::coordinator::Coordinator;
use crate::error::ErrorKind;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    #[error("The BMC rejected the credentials")]
    InvalidAuth,

    #[error("Cannot connect to the BMC")]
    CannotConnect,

    #[error("Unexpected error: {0}")]
    Unknown(String),

    #[error("No open issue with id {issue_id}")]
    IssueNotFound { issue_id: String },

    #[error("Issue {issue_id} has no repair flow")]
    NotFixable { issue_id: String },

    #[error("Credentials saved, but the connection did not come back: {message}")]
    Reload { message: String },
}

impl RepairError {
    /// Stable short code for form errors and scripting.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAuth => "invalid_auth",
            Self::CannotConnect => "cannot_connect",
            Self::Unknown(_) => "unknown",
            Self::IssueNotFound { .. } => "issue_not_found",
            Self::NotFixable { .. } => "not_fixable",
            Self::Reload { .. } => "reload_failed",
        }
    }
}

/// Repair flow for one session's connection-failure issue.
pub struct RepairFlow {
    session: Session,
    issue_id: String,
}

impl RepairFlow {
    /// Open the flow for an issue. Only connection-failure issues belonging
    /// to this session are fixable here.
    pub fn new(session: Session, issue_id: impl Into<String>) -> Result<Self, RepairError> {
        let issue_id = issue_id.into();
        let Some(issue) = session.alerts().get(&issue_id) else {
            return Err(RepairError::IssueNotFound { issue_id });
        };
        if !issue.fixable || issue_id != connection_issue_id(session.entry_id()) {
            return Err(RepairError::NotFixable { issue_id });
        }
        Ok(Self { session, issue_id })
    }

    /// Open the flow for the session's own connection issue.
    pub fn for_session(session: Session) -> Result<Self, RepairError> {
        let issue_id = connection_issue_id(session.entry_id());
        Self::new(session, issue_id)
    }

    pub fn issue_id(&self) -> &str {
        &self.issue_id
    }

    /// The issue as currently recorded.
    pub fn issue(&self) -> Option<Issue> {
        self.session.alerts().get(&self.issue_id)
    }

    /// Host shown in the credential prompt.
    pub async fn host(&self) -> String {
        self.session.connection().await.host
    }

    /// Test `credentials`; on success store them, clear the issue and reload.
    pub async fn submit(&self, credentials: Credentials) -> Result<Coordinator, RepairError> {
        if let Err(e) = self.session.validate_credentials(&credentials).await {
            warn!(issue_id = %self.issue_id, error = %e, "repair attempt failed");
            return Err(match e.kind() {
                ErrorKind::Auth => RepairError::InvalidAuth,
                ErrorKind::Connection => RepairError::CannotConnect,
                ErrorKind::Unexpected => RepairError::Unknown(e.to_string()),
            });
        }

        self.session.update_credentials(credentials).await;
        info!(issue_id = %self.issue_id, "credentials accepted, reloading");

        // The old coordinator is fully shut down once reload returns, so
        // nothing can raise the issue again after this clear.
        let coordinator = self
            .session
            .reload()
            .await
            .map_err(|e| RepairError::Reload {
                message: e.to_string(),
            })?;
        self.session.alerts().clear(&self.issue_id);
        info!(issue_id = %self.issue_id, "issue repaired");
        Ok(coordinator)
    }
}
