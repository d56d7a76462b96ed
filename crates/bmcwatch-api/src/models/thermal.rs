// `/redfish/v1/Chassis/1/Thermal`

use serde::{Deserialize, Serialize};

use super::common::Status;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Thermal {
    #[serde(default)]
    pub temperatures: Vec<Temperature>,
    #[serde(default)]
    pub fans: Vec<Fan>,
}

impl Thermal {
    pub fn temperature(&self, member_id: &str) -> Option<&Temperature> {
        self.temperatures.iter().find(|t| t.member_id == member_id)
    }

    pub fn fan(&self, member_id: &str) -> Option<&Fan> {
        self.fans.iter().find(|f| f.member_id == member_id)
    }
}

/// A temperature sensor. `member_id` is stable across polls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Temperature {
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reading_celsius: Option<f64>,
    #[serde(default)]
    pub upper_threshold_non_critical: Option<f64>,
    #[serde(default)]
    pub upper_threshold_critical: Option<f64>,
    #[serde(default)]
    pub upper_threshold_fatal: Option<f64>,
    #[serde(default)]
    pub physical_context: Option<String>,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fan {
    #[serde(default)]
    pub member_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Usually RPM; see `reading_units`.
    #[serde(default)]
    pub reading: Option<f64>,
    #[serde(default)]
    pub reading_units: Option<String>,
    #[serde(default)]
    pub lower_threshold_critical: Option<f64>,
    #[serde(default)]
    pub status: Status,
}
