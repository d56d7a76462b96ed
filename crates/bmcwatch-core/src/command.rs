// ── Control commands ──
//
// Typed mutation requests. Each maps to exactly one Redfish action or PATCH
// and is executed through `Coordinator::execute`, which follows it with a
// burst refresh so the effect shows up quickly.

use std::fmt;

use bmcwatch_api::models::{
    BootSourceOverrideEnabled, FanModeType, IndicatorLed, Protocol, ResetType,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `ComputerSystem.Reset`: power on/off, shutdown, restart, NMI.
    SystemReset(ResetType),
    /// `Manager.Reset`: restart the BMC itself.
    ManagerReset(ResetType),
    SetIndicatorLed(IndicatorLed),
    SetProtocolEnabled { protocol: Protocol, enabled: bool },
    SetFanMode(FanModeType),
    SetBootSource {
        target: String,
        enabled: BootSourceOverrideEnabled,
    },
    /// Re-arm the chassis intrusion sensor.
    ResetIntrusionSensor,
}

impl Command {
    /// `true` if the command changes data held in the static snapshot, so
    /// the follow-up refresh must bypass the static cache.
    pub fn touches_static(&self) -> bool {
        !matches!(self, Self::SetFanMode(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SystemReset(reset) => write!(f, "system reset ({reset})"),
            Self::ManagerReset(reset) => write!(f, "BMC reset ({reset})"),
            Self::SetIndicatorLed(state) => write!(f, "indicator LED -> {state}"),
            Self::SetProtocolEnabled { protocol, enabled } => {
                let verb = if *enabled { "enable" } else { "disable" };
                write!(f, "{verb} {protocol}")
            }
            Self::SetFanMode(mode) => write!(f, "fan mode -> {mode}"),
            Self::SetBootSource { target, enabled } => {
                write!(f, "boot override -> {target} ({enabled})")
            }
            Self::ResetIntrusionSensor => f.write_str("reset intrusion sensor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_fan_mode_is_dynamic() {
        assert!(!Command::SetFanMode(FanModeType::FullSpeed).touches_static());
        assert!(Command::SystemReset(ResetType::On).touches_static());
        assert!(Command::ResetIntrusionSensor.touches_static());
        assert!(
            Command::SetProtocolEnabled {
                protocol: Protocol::Ipmi,
                enabled: false
            }
            .touches_static()
        );
    }

    #[test]
    fn display_is_human_readable() {
        let cmd = Command::SetProtocolEnabled {
            protocol: Protocol::Ssh,
            enabled: false,
        };
        assert_eq!(cmd.to_string(), "disable ssh");
        assert_eq!(
            Command::SetBootSource {
                target: "Pxe".into(),
                enabled: BootSourceOverrideEnabled::Once
            }
            .to_string(),
            "boot override -> Pxe (Once)"
        );
    }
}
