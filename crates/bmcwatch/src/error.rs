//! CLI error types with miette diagnostics.
//!
//! Maps core, config and repair errors into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use bmcwatch_config::ConfigError;
use bmcwatch_core::{CoreError, RepairError};

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the BMC: {message}")]
    #[diagnostic(
        code(bmcwatch::connection_failed),
        help(
            "Check that the BMC is powered and reachable on the network.\n\
             Self-signed certificates need --insecure (-k)."
        )
    )]
    ConnectionFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(bmcwatch::auth_failed),
        help(
            "Verify the BMC username and password.\n\
             Run: bmcwatch config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(bmcwatch::no_credentials),
        help(
            "Configure credentials with: bmcwatch config init\n\
             Or pass --username and set BMCWATCH_PASSWORD."
        )
    )]
    NoCredentials { profile: String },

    // ── BMC responses ────────────────────────────────────────────────
    #[error("The BMC rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(bmcwatch::rejected))]
    Rejected { status: u16, message: String },

    #[error("{message}")]
    #[diagnostic(
        code(bmcwatch::refresh_failed),
        help("Run with -vv for request details.")
    )]
    RefreshFailed { message: String },

    #[error("{option} '{value}' is not available on this BMC")]
    #[diagnostic(code(bmcwatch::not_found), help("Available: {available}"))]
    NotAvailable {
        option: String,
        value: String,
        available: String,
    },

    // ── Repair ───────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(bmcwatch::repair))]
    Repair(#[from] RepairError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bmcwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(bmcwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: bmcwatch config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No BMC configured")]
    #[diagnostic(
        code(bmcwatch::no_config),
        help(
            "Create a profile with: bmcwatch config init\n\
             Or pass --host. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(bmcwatch::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(bmcwatch::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(bmcwatch::json))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(bmcwatch::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Repair(RepairError::CannotConnect) => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. }
            | Self::NoCredentials { .. }
            | Self::Repair(RepairError::InvalidAuth) => exit_code::AUTH,
            Self::NotAvailable { .. } | Self::Rejected { status: 404, .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { message } => Self::ConnectionFailed { message },
            CoreError::NotReady { host, message } => Self::ConnectionFailed {
                message: format!("{host}: {message}"),
            },
            CoreError::NotConnected => Self::ConnectionFailed {
                message: "session is not started".into(),
            },
            CoreError::AuthenticationFailed { message }
            | CoreError::ReauthRequired { message, .. } => Self::AuthFailed { message },
            CoreError::RefreshFailed { message } | CoreError::UnexpectedResponse { message } => {
                Self::RefreshFailed { message }
            }
            CoreError::Rejected { status, message } => Self::Rejected { status, message },
            CoreError::InvalidOption { message } => Self::Validation {
                field: "option".into(),
                reason: message,
            },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::ProfileNotFound { name, available } => Self::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            other => Self::Config(Box::new(other)),
        }
    }
}
