// Supermicro OEM resources under `/redfish/v1/Managers/1/Oem/Supermicro/`
//
// Not every board or firmware exposes every OEM endpoint. Each model has an
// `is_valid` flag: decoded bodies set it, while the derived `Default` used
// for a 404 leaves it `false`.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::common::endpoint_available;

// ── Fan mode ─────────────────────────────────────────────────────────

/// `.../Oem/Supermicro/FanMode`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FanMode {
    #[serde(default)]
    pub mode: Option<FanModeType>,
    #[serde(default, rename = "Mode@Redfish.AllowableValues")]
    pub allowable_modes: Vec<FanModeType>,
    #[serde(default = "endpoint_available")]
    pub is_valid: bool,
}

/// Supermicro fan control policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum FanModeType {
    Standard,
    FullSpeed,
    Optimal,
    #[serde(rename = "HeavyIO")]
    #[strum(serialize = "HeavyIO")]
    HeavyIo,
    #[serde(rename = "PUEOptimal", alias = "PUE2")]
    #[strum(serialize = "PUEOptimal")]
    PueOptimal,
    #[serde(other)]
    Unknown,
}

impl FanModeType {
    /// The modes a user may select, in display order.
    pub const SELECTABLE: [Self; 5] = [
        Self::Standard,
        Self::FullSpeed,
        Self::Optimal,
        Self::HeavyIo,
        Self::PueOptimal,
    ];
}

// ── NTP ──────────────────────────────────────────────────────────────

/// `.../Oem/Supermicro/NTP`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ntp {
    #[serde(default, rename = "NTPEnable")]
    pub enabled: Option<bool>,
    #[serde(default, rename = "PrimaryNTPServer")]
    pub primary_server: Option<String>,
    #[serde(default, rename = "SecondaryNTPServer")]
    pub secondary_server: Option<String>,
    #[serde(default, rename = "DaylightSavingTime")]
    pub daylight_saving_time: Option<bool>,
    #[serde(default = "endpoint_available", rename = "IsValid")]
    pub is_valid: bool,
}

// ── LLDP ─────────────────────────────────────────────────────────────

/// `.../Oem/Supermicro/LLDP`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lldp {
    #[serde(default, rename = "LLDPEnabled", alias = "LLDPEnable")]
    pub enabled: Option<bool>,
    #[serde(default = "endpoint_available", rename = "IsValid")]
    pub is_valid: bool,
}

// ── BIOS POST code snooping ──────────────────────────────────────────

/// `.../Oem/Supermicro/Snooping`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snooping {
    #[serde(default, rename = "PostCode")]
    pub post_code: Option<String>,
    #[serde(default = "endpoint_available", rename = "IsValid")]
    pub is_valid: bool,
}

// ── License ──────────────────────────────────────────────────────────

/// `.../Oem/Supermicro/LicenseManager/QueryLicense`.
///
/// Entries are opaque vendor blobs; only their presence matters here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(default, rename = "Licenses")]
    pub licenses: Vec<serde_json::Value>,
    #[serde(default = "endpoint_available", rename = "IsValid")]
    pub is_valid: bool,
}

impl License {
    /// `None` when the license endpoint is not available on this BMC.
    pub fn is_licensed(&self) -> Option<bool> {
        self.is_valid.then(|| !self.licenses.is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fan_mode_with_allowable_values() {
        let fan: FanMode = serde_json::from_str(
            r#"{"Mode":"HeavyIO","Mode@Redfish.AllowableValues":["Standard","FullSpeed","HeavyIO","PUE2"]}"#,
        )
        .unwrap();
        assert!(fan.is_valid);
        assert_eq!(fan.mode, Some(FanModeType::HeavyIo));
        assert_eq!(fan.allowable_modes.last(), Some(&FanModeType::PueOptimal));
        assert_eq!(FanModeType::HeavyIo.to_string(), "HeavyIO");
        assert_eq!(
            "pueoptimal".parse::<FanModeType>().unwrap(),
            FanModeType::PueOptimal
        );
    }

    #[test]
    fn license_presence() {
        let license: License =
            serde_json::from_str(r#"{"Licenses":["{\"ProductKey\":\"SFT-DCMS-SINGLE\"}"]}"#)
                .unwrap();
        assert_eq!(license.is_licensed(), Some(true));
        let license: License = serde_json::from_str(r#"{"Licenses":[]}"#).unwrap();
        assert_eq!(license.is_licensed(), Some(false));
        assert_eq!(License::default().is_licensed(), None);
    }

    #[test]
    fn lldp_accepts_both_spellings() {
        let lldp: Lldp = serde_json::from_str(r#"{"LLDPEnable":true}"#).unwrap();
        assert_eq!(lldp.enabled, Some(true));
        assert!(!Lldp::default().is_valid);
    }
}
