// Chassis endpoints
//
// Enclosure identity, physical security, thermal and power telemetry.

use serde_json::json;

use crate::error::Error;
use crate::models::{Chassis, IntrusionSensor, Power, Thermal};
use crate::redfish::client::RedfishClient;
use crate::redfish::paths;

impl RedfishClient {
    /// `GET /redfish/v1/Chassis/1`
    pub async fn chassis(&self) -> Result<Chassis, Error> {
        self.get(paths::CHASSIS).await
    }

    /// `GET /redfish/v1/Chassis/1/Thermal`
    pub async fn thermal(&self) -> Result<Thermal, Error> {
        self.get(paths::THERMAL).await
    }

    /// `GET /redfish/v1/Chassis/1/Power`
    pub async fn power(&self) -> Result<Power, Error> {
        self.get(paths::POWER).await
    }

    /// Re-arm the chassis intrusion sensor after the case was opened.
    ///
    /// `PATCH /redfish/v1/Chassis/1` with `IntrusionSensor: Normal`
    pub async fn reset_intrusion_sensor(&self) -> Result<(), Error> {
        self.patch(
            paths::CHASSIS,
            &json!({ "PhysicalSecurity": { "IntrusionSensor": IntrusionSensor::Normal } }),
        )
        .await
    }
}
