// `/redfish/v1/Chassis/1/Power`

use serde::{Deserialize, Serialize};

use super::common::{Health, Status};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Power {
    #[serde(default)]
    pub power_control: Vec<PowerControl>,
    #[serde(default)]
    pub voltages: Vec<Voltage>,
    #[serde(default)]
    pub power_supplies: Vec<PowerSupply>,
    #[serde(default)]
    pub oem: Option<PowerOem>,
}

impl Power {
    /// Total consumed watts as reported by the first power-control domain.
    pub fn consumed_watts(&self) -> Option<f64> {
        self.power_control
            .first()
            .and_then(|control| control.power_consumed_watts)
    }

    /// CMOS battery health from the Supermicro OEM block.
    pub fn battery_health(&self) -> Option<&Health> {
        self.oem
            .as_ref()?
            .supermicro
            .as_ref()?
            .battery
            .as_ref()?
            .status
            .health
            .as_ref()
    }

    pub fn voltage(&self, member_id: &str) -> Option<&Voltage> {
        self.voltages.iter().find(|v| v.member_id == member_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PowerControl {
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub power_consumed_watts: Option<f64>,
    #[serde(default)]
    pub power_capacity_watts: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Voltage {
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reading_volts: Option<f64>,
    #[serde(default)]
    pub upper_threshold_critical: Option<f64>,
    #[serde(default)]
    pub lower_threshold_critical: Option<f64>,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PowerSupply {
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub power_capacity_watts: Option<f64>,
    #[serde(default)]
    pub last_power_output_watts: Option<f64>,
    #[serde(default)]
    pub line_input_voltage: Option<f64>,
    #[serde(default)]
    pub status: Status,
}

// ── Supermicro OEM ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerOem {
    #[serde(default, rename = "Supermicro")]
    pub supermicro: Option<SupermicroPowerOem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SupermicroPowerOem {
    #[serde(default)]
    pub battery: Option<Battery>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Battery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Status,
}
