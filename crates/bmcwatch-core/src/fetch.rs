// ── Fetch client boundary ──
//
// The coordinator talks to the BMC only through `FetchClient`, so it can be
// driven by the Redfish client in production and by scripted fakes in
// tests. `ClientFactory` builds throwaway clients for session (re)starts and
// credential checks.

use std::sync::Arc;

use async_trait::async_trait;
use bmcwatch_api::models::{DynamicSnapshot, StaticSnapshot};
use bmcwatch_api::{ClientStats, RedfishClient};
use tracing::warn;

use crate::command::Command;
use crate::config::ConnectionConfig;
use crate::error::CoreError;

/// Data and action source for one BMC.
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// Host this client talks to (for alerts and diagnostics).
    fn host(&self) -> &str;

    async fn connect(&self) -> Result<(), CoreError>;

    /// Close the session. Failures are logged, not returned.
    async fn disconnect(&self);

    /// Composite fetch of runtime telemetry.
    async fn fetch_dynamic(&self) -> Result<DynamicSnapshot, CoreError>;

    /// Composite fetch of identity and configuration data.
    async fn fetch_static(&self) -> Result<StaticSnapshot, CoreError>;

    /// Perform a control action.
    async fn execute(&self, command: &Command) -> Result<(), CoreError>;

    /// Request counters, if the client keeps them.
    fn stats(&self) -> Option<ClientStats> {
        None
    }
}

/// Builds clients from connection settings.
pub trait ClientFactory: Send + Sync {
    fn build(&self, config: &ConnectionConfig) -> Result<Arc<dyn FetchClient>, CoreError>;
}

// ── Redfish implementation ───────────────────────────────────────────

#[async_trait]
impl FetchClient for RedfishClient {
    fn host(&self) -> &str {
        RedfishClient::host(self)
    }

    async fn connect(&self) -> Result<(), CoreError> {
        RedfishClient::connect(self).await.map_err(CoreError::from)
    }

    async fn disconnect(&self) {
        if let Err(e) = RedfishClient::disconnect(self).await {
            warn!(error = %e, "logout failed");
        }
    }

    async fn fetch_dynamic(&self) -> Result<DynamicSnapshot, CoreError> {
        RedfishClient::fetch_dynamic(self)
            .await
            .map_err(CoreError::from)
    }

    async fn fetch_static(&self) -> Result<StaticSnapshot, CoreError> {
        RedfishClient::fetch_static(self)
            .await
            .map_err(CoreError::from)
    }

    async fn execute(&self, command: &Command) -> Result<(), CoreError> {
        let result = match command {
            Command::SystemReset(reset) => self.reset_system(*reset).await,
            Command::ManagerReset(reset) => self.reset_manager(*reset).await,
            Command::SetIndicatorLed(state) => self.set_indicator_led(*state).await,
            Command::SetProtocolEnabled { protocol, enabled } => {
                self.set_protocol_enabled(*protocol, *enabled).await
            }
            Command::SetFanMode(mode) => self.set_fan_mode(*mode).await,
            Command::SetBootSource { target, enabled } => {
                self.set_boot_source(target, *enabled).await
            }
            Command::ResetIntrusionSensor => self.reset_intrusion_sensor().await,
        };
        result.map_err(CoreError::from)
    }

    fn stats(&self) -> Option<ClientStats> {
        Some(RedfishClient::stats(self))
    }
}

/// Builds [`RedfishClient`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedfishClientFactory;

impl ClientFactory for RedfishClientFactory {
    fn build(&self, config: &ConnectionConfig) -> Result<Arc<dyn FetchClient>, CoreError> {
        let client = RedfishClient::new(
            &config.host,
            config.credentials.username.clone(),
            config.credentials.password.clone(),
            &config.transport(),
        )?;
        Ok(Arc::new(client))
    }
}
