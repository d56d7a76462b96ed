use thiserror::Error;

/// Top-level error type for the `bmcwatch-api` crate.
///
/// Covers every failure mode of the Redfish surface: session
/// authentication, transport, HTTP status and payload decoding.
/// `bmcwatch-core` folds these into its auth / connection / unexpected
/// taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The session token was revoked or timed out on the BMC.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// A request was issued before `connect()` established a session.
    #[error("Not connected -- call connect() first")]
    NotConnected,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Redfish ─────────────────────────────────────────────────────
    /// Non-success HTTP status with the Redfish extended error message, if any.
    #[error("Redfish error (HTTP {status}): {message}")]
    Redfish { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the credentials or session
    /// are no longer accepted and re-authentication is required.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }

    /// Returns `true` if the BMC could not be reached or did not answer
    /// in time. Retrying on the normal cadence may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Timeout { .. } | Self::NotConnected => true,
            Self::Redfish { status, .. } => matches!(status, 502..=504),
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Redfish { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the BMC does not implement (or license) a resource.
    pub fn is_unsupported(&self) -> bool {
        self.is_not_found() || matches!(self, Self::Redfish { status: 403 | 405 | 501, .. })
    }
}
