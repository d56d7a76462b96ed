// Shared transport configuration for building reqwest::Client instances.
//
// TLS, timeout and the per-client request concurrency bound live here so
// the Redfish client and throwaway validation clients build identically.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Error;

/// Inclusive bounds for [`TransportConfig::max_concurrent_requests`].
pub const MAX_CONCURRENT_REQUESTS_RANGE: (usize, usize) = (1, 10);

/// TLS verification mode (api-level mirror of core's TlsVerification).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (BMCs ship with self-signed certificates).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    /// Upper bound on simultaneous in-flight HTTP requests to one BMC.
    pub max_concurrent_requests: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Duration::from_secs(30),
            max_concurrent_requests: 5,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("bmcwatch/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// The concurrency bound clamped into its valid range.
    pub fn permits(&self) -> usize {
        let (min, max) = MAX_CONCURRENT_REQUESTS_RANGE;
        self.max_concurrent_requests.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permits_are_clamped() {
        let mut config = TransportConfig {
            max_concurrent_requests: 0,
            ..TransportConfig::default()
        };
        assert_eq!(config.permits(), 1);
        config.max_concurrent_requests = 64;
        assert_eq!(config.permits(), 10);
        config.max_concurrent_requests = 3;
        assert_eq!(config.permits(), 3);
    }

    #[test]
    fn missing_ca_file_is_a_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/bmc-ca.pem")),
            ..TransportConfig::default()
        };
        assert!(matches!(config.build_client(), Err(Error::Tls(_))));
    }
}
