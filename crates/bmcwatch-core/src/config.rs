// ── Runtime connection and polling configuration ──
//
// These types describe *how* to reach a BMC and *how often* to poll it.
// They carry credential data and cadence tuning, but never touch disk.
// The CLI constructs them (via bmcwatch-config) and hands them in.

use std::path::PathBuf;
use std::time::Duration;

use bmcwatch_api::{TlsMode, TransportConfig};
use secrecy::SecretString;
use serde::Serialize;

use crate::error::CoreError;

/// Consecutive connection failures before the persistent alert is raised.
pub const CONNECTION_ERROR_THRESHOLD: u32 = 3;

/// BMC account credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. BMCs ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

/// Everything needed to open a session on one BMC.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Host or base URL (`10.0.0.5`, `https://bmc.lan:8443`).
    pub host: String,
    pub credentials: Credentials,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    pub max_concurrent_requests: usize,
}

impl ConnectionConfig {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            credentials,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            max_concurrent_requests: usize::try_from(MAX_CONCURRENT_REQUESTS.default)
                .unwrap_or(5),
        }
    }

    /// Transport settings for the API client.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
            max_concurrent_requests: self.max_concurrent_requests,
        }
    }
}

// ── Option ranges ────────────────────────────────────────────────────

/// An integer option with inclusive bounds and a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionRange {
    pub name: &'static str,
    pub min: u64,
    pub max: u64,
    pub default: u64,
}

impl OptionRange {
    pub fn validate(&self, value: u64) -> Result<u64, CoreError> {
        if (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(CoreError::InvalidOption {
                message: format!(
                    "{} must be between {} and {}, got {value}",
                    self.name, self.min, self.max
                ),
            })
        }
    }
}

pub const SCAN_INTERVAL: OptionRange = OptionRange {
    name: "scan_interval",
    min: 10,
    max: 300,
    default: 30,
};

pub const BURST_INTERVAL: OptionRange = OptionRange {
    name: "burst_interval",
    min: 1,
    max: 30,
    default: 5,
};

pub const BURST_DURATION: OptionRange = OptionRange {
    name: "burst_duration",
    min: 10,
    max: 300,
    default: 60,
};

pub const STATIC_MAX_AGE: OptionRange = OptionRange {
    name: "static_interval",
    min: 60,
    max: 900,
    default: 300,
};

pub const MAX_CONCURRENT_REQUESTS: OptionRange = OptionRange {
    name: "max_concurrent_requests",
    min: 1,
    max: 10,
    default: 5,
};

/// Polling cadence for one coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoordinatorConfig {
    /// Normal tick period.
    pub scan_interval: Duration,
    /// Tick period while burst mode is active.
    pub burst_interval: Duration,
    /// How long burst mode lasts after activation.
    pub burst_duration: Duration,
    /// Maximum age of cached static data.
    pub static_max_age: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(SCAN_INTERVAL.default),
            burst_interval: Duration::from_secs(BURST_INTERVAL.default),
            burst_duration: Duration::from_secs(BURST_DURATION.default),
            static_max_age: Duration::from_secs(STATIC_MAX_AGE.default),
        }
    }
}

impl CoordinatorConfig {
    /// Build a config from second values, rejecting anything out of range.
    pub fn from_secs(
        scan_interval: u64,
        burst_interval: u64,
        burst_duration: u64,
        static_max_age: u64,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            scan_interval: Duration::from_secs(SCAN_INTERVAL.validate(scan_interval)?),
            burst_interval: Duration::from_secs(BURST_INTERVAL.validate(burst_interval)?),
            burst_duration: Duration::from_secs(BURST_DURATION.validate(burst_duration)?),
            static_max_age: Duration::from_secs(STATIC_MAX_AGE.validate(static_max_age)?),
        })
    }
}
