// ── Core error types ──
//
// Domain errors from bmcwatch-core. Consumers never see reqwest errors or
// JSON parse failures directly: the `From<bmcwatch_api::Error>` impl folds
// transport-layer errors into the auth / connection / unexpected taxonomy
// that drives the coordinator's failure policy.
//
// Every variant carries owned strings so the error is `Clone`: coalesced
// refresh callers all receive the same result.

use thiserror::Error;

/// How the coordinator reacts to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials rejected. Fatal to the refresh cycle, never retried.
    Auth,
    /// BMC unreachable or timing out. Counted toward the alert threshold.
    Connection,
    /// Anything else. Logged, surfaced generically, not counted.
    Unexpected,
}

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach BMC: {message}")]
    ConnectionFailed { message: String },

    #[error("BMC at {host} is not ready: {message}")]
    NotReady { host: String, message: String },

    #[error("Not connected to BMC")]
    NotConnected,

    // ── Authentication errors ────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// A refresh hit an auth failure; polling stays halted until the
    /// credentials are replaced.
    #[error("Reauthentication required for {host}: {message}")]
    ReauthRequired { host: String, message: String },

    // ── Refresh errors ───────────────────────────────────────────────
    #[error("Refresh failed: {message}")]
    RefreshFailed { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected by BMC (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid option: {message}")]
    InvalidOption { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unexpected response from BMC: {message}")]
    UnexpectedResponse { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationFailed { .. } | Self::ReauthRequired { .. } => ErrorKind::Auth,
            Self::ConnectionFailed { .. } | Self::NotReady { .. } | Self::NotConnected => {
                ErrorKind::Connection
            }
            _ => ErrorKind::Unexpected,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    pub fn is_connection(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<bmcwatch_api::Error> for CoreError {
    fn from(err: bmcwatch_api::Error) -> Self {
        use bmcwatch_api::Error as Api;

        if err.is_auth_expired() {
            return Self::AuthenticationFailed {
                message: err.to_string(),
            };
        }
        if err.is_transient() {
            return Self::ConnectionFailed {
                message: err.to_string(),
            };
        }

        match err {
            Api::Transport(e) => Self::ConnectionFailed {
                message: e.to_string(),
            },
            Api::Tls(message) => Self::ConnectionFailed {
                message: format!("TLS: {message}"),
            },
            Api::InvalidUrl(e) => Self::Config {
                message: format!("invalid BMC address: {e}"),
            },
            Api::Redfish { status, message } => Self::Rejected { status, message },
            Api::Deserialization { message, .. } => Self::UnexpectedResponse { message },
            other => Self::Internal(other.to_string()),
        }
    }
}
