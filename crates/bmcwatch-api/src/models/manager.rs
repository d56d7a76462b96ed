// `/redfish/v1/Managers/1` and its `NetworkProtocol` sub-resource

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::common::{Status, endpoint_available};

/// The BMC itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Manager {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub manager_type: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default, rename = "UUID")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
}

// ── Network protocols ────────────────────────────────────────────────

/// `/redfish/v1/Managers/1/NetworkProtocol`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkProtocol {
    #[serde(default)]
    pub host_name: Option<String>,
    #[serde(default, rename = "FQDN")]
    pub fqdn: Option<String>,
    #[serde(default, rename = "HTTP")]
    pub http: Option<ProtocolSetting>,
    #[serde(default, rename = "HTTPS")]
    pub https: Option<ProtocolSetting>,
    #[serde(default, rename = "SSH")]
    pub ssh: Option<ProtocolSetting>,
    #[serde(default, rename = "IPMI")]
    pub ipmi: Option<ProtocolSetting>,
    #[serde(default, rename = "SNMP")]
    pub snmp: Option<ProtocolSetting>,
    #[serde(default = "endpoint_available")]
    pub is_valid: bool,
}

impl NetworkProtocol {
    pub fn setting(&self, protocol: Protocol) -> Option<&ProtocolSetting> {
        match protocol {
            Protocol::Http => self.http.as_ref(),
            Protocol::Https => self.https.as_ref(),
            Protocol::Ssh => self.ssh.as_ref(),
            Protocol::Ipmi => self.ipmi.as_ref(),
            Protocol::Snmp => self.snmp.as_ref(),
        }
    }

    /// `None` when the protocol block is missing or the endpoint was unavailable.
    pub fn is_enabled(&self, protocol: Protocol) -> Option<bool> {
        if !self.is_valid {
            return None;
        }
        self.setting(protocol)
            .and_then(|setting| setting.protocol_enabled)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProtocolSetting {
    #[serde(default)]
    pub protocol_enabled: Option<bool>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Network services whose enablement can be toggled through `NetworkProtocol`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Protocol {
    #[strum(serialize = "http")]
    Http,
    #[strum(serialize = "https")]
    Https,
    #[strum(serialize = "ssh")]
    Ssh,
    #[strum(serialize = "ipmi")]
    Ipmi,
    #[strum(serialize = "snmp")]
    Snmp,
}

impl Protocol {
    /// Property name of this protocol in the `NetworkProtocol` resource.
    pub fn redfish_property(self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Https => "HTTPS",
            Self::Ssh => "SSH",
            Self::Ipmi => "IPMI",
            Self::Snmp => "SNMP",
        }
    }
}
