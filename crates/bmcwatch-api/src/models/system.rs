// `/redfish/v1/Systems/1`

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::common::{IndicatorLed, PowerState, Status};

/// The host system managed by the BMC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default, rename = "UUID")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub bios_version: Option<String>,
    #[serde(default)]
    pub power_state: Option<PowerState>,
    #[serde(default, rename = "IndicatorLED")]
    pub indicator_led: Option<IndicatorLed>,
    #[serde(default)]
    pub processor_summary: Option<ProcessorSummary>,
    #[serde(default)]
    pub memory_summary: Option<MemorySummary>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub boot: Option<Boot>,
}

impl ComputerSystem {
    pub fn is_powered_on(&self) -> bool {
        self.power_state == Some(PowerState::On)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProcessorSummary {
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MemorySummary {
    #[serde(default, rename = "TotalSystemMemoryGiB")]
    pub total_system_memory_gib: Option<f64>,
}

/// Boot override configuration.
///
/// Targets stay strings: the allowable set differs per board and BIOS,
/// and the BMC advertises it alongside the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Boot {
    #[serde(default)]
    pub boot_source_override_enabled: Option<BootSourceOverrideEnabled>,
    #[serde(default)]
    pub boot_source_override_target: Option<String>,
    #[serde(default, rename = "BootSourceOverrideTarget@Redfish.AllowableValues")]
    pub allowable_targets: Vec<String>,
}

/// `Boot.BootSourceOverrideEnabled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum BootSourceOverrideEnabled {
    Disabled,
    Once,
    Continuous,
    #[serde(other)]
    Unknown,
}
