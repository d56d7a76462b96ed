// Supermicro OEM endpoints

use serde_json::json;

use crate::error::Error;
use crate::models::{FanMode, FanModeType, License, Lldp, Ntp, Snooping};
use crate::redfish::client::RedfishClient;
use crate::redfish::paths;

impl RedfishClient {
    /// `GET .../Oem/Supermicro/FanMode`
    pub async fn fan_mode(&self) -> Result<FanMode, Error> {
        self.get(paths::FAN_MODE).await
    }

    /// `PATCH .../Oem/Supermicro/FanMode` with `{"Mode": ...}`
    pub async fn set_fan_mode(&self, mode: FanModeType) -> Result<(), Error> {
        self.patch(paths::FAN_MODE, &json!({ "Mode": mode })).await
    }

    /// `GET .../Oem/Supermicro/NTP`
    pub async fn ntp(&self) -> Result<Ntp, Error> {
        self.get(paths::NTP).await
    }

    /// `GET .../Oem/Supermicro/LLDP`
    pub async fn lldp(&self) -> Result<Lldp, Error> {
        self.get(paths::LLDP).await
    }

    /// Last BIOS POST code seen by the BMC.
    ///
    /// `GET .../Oem/Supermicro/Snooping`
    pub async fn snooping(&self) -> Result<Snooping, Error> {
        self.get(paths::SNOOPING).await
    }

    /// `GET .../Oem/Supermicro/LicenseManager/QueryLicense`
    pub async fn license(&self) -> Result<License, Error> {
        self.get(paths::LICENSE).await
    }
}
