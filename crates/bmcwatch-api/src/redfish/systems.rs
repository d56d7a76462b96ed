// Computer system endpoints
//
// Identity, power control, indicator LED and boot override.

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::models::{BootSourceOverrideEnabled, ComputerSystem, IndicatorLed, ResetType};
use crate::redfish::client::RedfishClient;
use crate::redfish::paths;

impl RedfishClient {
    /// Get the system resource.
    ///
    /// `GET /redfish/v1/Systems/1`
    pub async fn system(&self) -> Result<ComputerSystem, Error> {
        self.get(paths::SYSTEM).await
    }

    /// Issue a host power action.
    ///
    /// `POST /redfish/v1/Systems/1/Actions/ComputerSystem.Reset`
    pub async fn reset_system(&self, reset_type: ResetType) -> Result<(), Error> {
        debug!(%reset_type, "system reset");
        self.post_action(paths::SYSTEM_RESET, &json!({ "ResetType": reset_type }))
            .await
    }

    /// Set the identify LED.
    ///
    /// `PATCH /redfish/v1/Systems/1` with `{"IndicatorLED": ...}`
    pub async fn set_indicator_led(&self, state: IndicatorLed) -> Result<(), Error> {
        self.patch(paths::SYSTEM, &json!({ "IndicatorLED": state }))
            .await
    }

    /// Override the next boot device.
    ///
    /// `PATCH /redfish/v1/Systems/1` with the `Boot` override block.
    pub async fn set_boot_source(
        &self,
        target: &str,
        enabled: BootSourceOverrideEnabled,
    ) -> Result<(), Error> {
        debug!(boot_target = target, %enabled, "boot override");
        self.patch(
            paths::SYSTEM,
            &json!({
                "Boot": {
                    "BootSourceOverrideTarget": target,
                    "BootSourceOverrideEnabled": enabled,
                }
            }),
        )
        .await
    }
}
