// Shared Redfish value types
//
// Enumerations use `#[serde(other)]` catch-alls: firmware revisions add
// values freely and an unknown string must never fail a whole fetch.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default for `is_valid` flags: present in a decoded body means the
/// endpoint answered. A derived `Default` (false) marks it unavailable.
pub(crate) fn endpoint_available() -> bool {
    true
}

// ── Status ───────────────────────────────────────────────────────────

/// Redfish `Status` object embedded in most resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Status {
    #[serde(default)]
    pub state: Option<ResourceState>,
    #[serde(default)]
    pub health: Option<Health>,
    #[serde(default)]
    pub health_rollup: Option<Health>,
}

impl Status {
    /// `true` when the resource reports anything other than `OK`.
    ///
    /// A missing health value is not treated as a problem.
    pub fn has_problem(&self) -> bool {
        self.health
            .as_ref()
            .is_some_and(|health| *health != Health::Ok)
    }

    /// `false` only when the BMC explicitly reports the component absent.
    pub fn is_present(&self) -> bool {
        !matches!(self.state, Some(ResourceState::Absent))
    }
}

/// `Status.Health` / `Status.HealthRollup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum Health {
    #[serde(rename = "OK")]
    #[strum(serialize = "OK")]
    Ok,
    Warning,
    Critical,
    #[serde(other)]
    Unknown,
}

/// `Status.State`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum ResourceState {
    Enabled,
    Disabled,
    StandbyOffline,
    StandbySpare,
    InTest,
    Starting,
    Absent,
    UnavailableOffline,
    Deferring,
    Quiesced,
    Updating,
    #[serde(other)]
    Unknown,
}

// ── Power / LED ──────────────────────────────────────────────────────

/// `ComputerSystem.PowerState` and `Chassis.PowerState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum PowerState {
    On,
    Off,
    PoweringOn,
    PoweringOff,
    Paused,
    #[serde(other)]
    Unknown,
}

/// `IndicatorLED` values. Writes accept `Lit`, `Blinking` and `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum IndicatorLed {
    Lit,
    Blinking,
    Off,
    #[serde(other)]
    Unknown,
}

/// `ResetType` parameter of `ComputerSystem.Reset` and `Manager.Reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ResetType {
    On,
    ForceOff,
    GracefulShutdown,
    GracefulRestart,
    ForceRestart,
    Nmi,
    ForceOn,
    PushPowerButton,
    PowerCycle,
}

// ── Errors ───────────────────────────────────────────────────────────

/// Redfish error body: `{"error": {"code": "...", "message": "...", "@Message.ExtendedInfo": [...]}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct RedfishErrorBody {
    pub error: RedfishErrorInner,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RedfishErrorInner {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "@Message.ExtendedInfo")]
    pub extended_info: Vec<ExtendedInfo>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExtendedInfo {
    #[serde(default, rename = "Message")]
    pub message: Option<String>,
}

impl RedfishErrorBody {
    /// The most specific human-readable message in the body.
    pub(crate) fn into_message(self) -> Option<String> {
        self.error
            .extended_info
            .into_iter()
            .find_map(|info| info.message)
            .or(self.error.message)
    }
}
