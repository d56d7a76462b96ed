// `/redfish/v1/Chassis/1`

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::common::{IndicatorLed, PowerState, Status};

/// The physical enclosure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Chassis {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub chassis_type: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub power_state: Option<PowerState>,
    #[serde(default, rename = "IndicatorLED")]
    pub indicator_led: Option<IndicatorLed>,
    #[serde(default)]
    pub physical_security: Option<PhysicalSecurity>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl Chassis {
    /// `true` when the intrusion sensor reports anything but `Normal`.
    pub fn is_intruded(&self) -> bool {
        self.physical_security
            .as_ref()
            .and_then(|security| security.intrusion_sensor)
            .is_some_and(|sensor| {
                matches!(
                    sensor,
                    IntrusionSensor::HardwareIntrusion | IntrusionSensor::TamperingDetected
                )
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhysicalSecurity {
    #[serde(default)]
    pub intrusion_sensor: Option<IntrusionSensor>,
    #[serde(default)]
    pub intrusion_sensor_number: Option<u32>,
    #[serde(default, rename = "IntrusionSensorReArm")]
    pub intrusion_sensor_rearm: Option<String>,
}

/// `PhysicalSecurity.IntrusionSensor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum IntrusionSensor {
    Normal,
    HardwareIntrusion,
    TamperingDetected,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn intrusion_detection() {
        let chassis: Chassis = serde_json::from_str(
            r#"{"Id":"1","PhysicalSecurity":{"IntrusionSensor":"HardwareIntrusion","IntrusionSensorNumber":170}}"#,
        )
        .unwrap();
        assert!(chassis.is_intruded());

        let chassis: Chassis = serde_json::from_str(
            r#"{"Id":"1","PhysicalSecurity":{"IntrusionSensor":"Normal"}}"#,
        )
        .unwrap();
        assert!(!chassis.is_intruded());

        assert!(!Chassis::default().is_intruded());
    }
}
