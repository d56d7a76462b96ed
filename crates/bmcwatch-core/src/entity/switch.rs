use bmcwatch_api::models::{IndicatorLed, Protocol};

use super::EntityCategory;
use crate::command::Command;
use crate::snapshot::MergedSnapshot;

pub struct SwitchDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub category: EntityCategory,
    pub enabled_by_default: bool,
    pub value_fn: fn(&MergedSnapshot) -> Option<bool>,
    pub available_fn: fn(&MergedSnapshot) -> bool,
    /// Command that turns the switch on (`true`) or off (`false`).
    pub command_fn: fn(bool) -> Command,
}

fn protocol_command(protocol: Protocol, enabled: bool) -> Command {
    Command::SetProtocolEnabled { protocol, enabled }
}

pub const SWITCHES: &[SwitchDescription] = &[
    SwitchDescription {
        key: "indicator_led",
        name: "Indicator LED",
        category: EntityCategory::Primary,
        enabled_by_default: true,
        value_fn: |data| {
            Some(matches!(
                data.system.indicator_led,
                Some(IndicatorLed::Lit | IndicatorLed::Blinking)
            ))
        },
        available_fn: |_| true,
        command_fn: |on| {
            Command::SetIndicatorLed(if on {
                IndicatorLed::Lit
            } else {
                IndicatorLed::Off
            })
        },
    },
    SwitchDescription {
        key: "http_protocol",
        name: "HTTP",
        category: EntityCategory::Config,
        enabled_by_default: false,
        value_fn: |data| data.network_protocol.is_enabled(Protocol::Http),
        available_fn: |data| data.network_protocol.is_valid,
        command_fn: |on| protocol_command(Protocol::Http, on),
    },
    SwitchDescription {
        key: "ssh_protocol",
        name: "SSH",
        category: EntityCategory::Config,
        enabled_by_default: false,
        value_fn: |data| data.network_protocol.is_enabled(Protocol::Ssh),
        available_fn: |data| data.network_protocol.is_valid,
        command_fn: |on| protocol_command(Protocol::Ssh, on),
    },
    SwitchDescription {
        key: "ipmi_protocol",
        name: "IPMI",
        category: EntityCategory::Config,
        enabled_by_default: false,
        value_fn: |data| data.network_protocol.is_enabled(Protocol::Ipmi),
        available_fn: |data| data.network_protocol.is_valid,
        command_fn: |on| protocol_command(Protocol::Ipmi, on),
    },
    SwitchDescription {
        key: "snmp_protocol",
        name: "SNMP",
        category: EntityCategory::Config,
        enabled_by_default: false,
        value_fn: |data| data.network_protocol.is_enabled(Protocol::Snmp),
        available_fn: |data| data.network_protocol.is_valid,
        command_fn: |on| protocol_command(Protocol::Snmp, on),
    },
];
