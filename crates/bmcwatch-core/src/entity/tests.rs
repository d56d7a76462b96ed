use bmcwatch_api::models::{
    Battery, Boot, BootSourceOverrideEnabled, FanMode, FanModeType, Health, IndicatorLed, IntrusionSensor, License,
    NetworkProtocol, PhysicalSecurity, PowerControl, PowerOem, PowerState, Protocol,
    ProtocolSetting, ResetType, ResourceState, Snooping, Status, SupermicroPowerOem, Temperature,
};
use pretty_assertions::assert_eq;

use super::*;
use crate::command::Command;

fn snapshot() -> MergedSnapshot {
    let mut data = MergedSnapshot::default();
    data.system.power_state = Some(PowerState::On);
    data.system.indicator_led = Some(IndicatorLed::Blinking);
    data.system.bios_version = Some("2.1".into());
    data.system.status = Some(Status {
        health: Some(Health::Warning),
        ..Status::default()
    });
    data.system.boot = Some(Boot {
        boot_source_override_target: Some("Pxe".into()),
        allowable_targets: vec!["None".into(), "Pxe".into(), "Hdd".into(), "Vendor".into()],
        ..Boot::default()
    });
    data.manager.status = Some(Status {
        health: Some(Health::Ok),
        ..Status::default()
    });
    data.power.power_control = vec![PowerControl {
        member_id: "0".into(),
        power_consumed_watts: Some(142.0),
        ..PowerControl::default()
    }];
    data.power.oem = Some(PowerOem {
        supermicro: Some(SupermicroPowerOem {
            battery: Some(Battery {
                name: Some("CMOS".into()),
                status: Status {
                    health: Some(Health::Critical),
                    ..Status::default()
                },
            }),
        }),
    });
    data.thermal.temperatures = vec![
        Temperature {
            member_id: "1".into(),
            name: Some("CPU Temp".into()),
            reading_celsius: Some(48.0),
            ..Temperature::default()
        },
        Temperature {
            member_id: "2".into(),
            name: Some("PCH Temp".into()),
            reading_celsius: None,
            ..Temperature::default()
        },
        Temperature {
            member_id: "3".into(),
            name: Some("GPU Temp".into()),
            reading_celsius: Some(30.0),
            status: Status {
                state: Some(ResourceState::Absent),
                ..Status::default()
            },
            ..Temperature::default()
        },
    ];
    data.fan_mode = FanMode {
        mode: Some(FanModeType::HeavyIo),
        allowable_modes: vec![FanModeType::Standard, FanModeType::HeavyIo],
        is_valid: true,
    };
    data.snooping = Snooping {
        post_code: Some("00".into()),
        is_valid: true,
    };
    data.network_protocol = NetworkProtocol {
        ssh: Some(ProtocolSetting {
            protocol_enabled: Some(false),
            port: Some(22),
        }),
        is_valid: true,
        ..NetworkProtocol::default()
    };
    data
}

fn sensor(key: &str) -> &'static SensorDescription {
    SENSORS.iter().find(|d| d.key == key).unwrap()
}

fn binary(key: &str) -> &'static BinarySensorDescription {
    BINARY_SENSORS.iter().find(|d| d.key == key).unwrap()
}

#[test]
fn keys_are_unique() {
    let mut keys: Vec<&str> = SENSORS
        .iter()
        .map(|d| d.key)
        .chain(BINARY_SENSORS.iter().map(|d| d.key))
        .chain(SWITCHES.iter().map(|d| d.key))
        .chain(BUTTONS.iter().map(|d| d.key))
        .chain(SELECTS.iter().map(|d| d.key))
        .collect();
    let total = keys.len();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), total);
}

#[test]
fn unique_id_is_entry_scoped() {
    assert_eq!(unique_id("abc123", "system_power"), "abc123_system_power");
}

#[test]
fn sensor_values() {
    let data = snapshot();
    assert_eq!(
        (sensor("power_consumption").value_fn)(&data, None),
        Some(SensorValue::Number(142.0))
    );
    assert_eq!(
        (sensor("bios_version").value_fn)(&data, None),
        Some(SensorValue::Text("2.1".into()))
    );
    assert_eq!(
        (sensor("post_code").value_fn)(&data, None),
        Some(SensorValue::Text("00".into()))
    );

    let stats = ClientStats {
        total_requests: 4,
        failed_requests: 0,
        average_response_ms: Some(12.345),
        last_response_ms: Some(10.0),
    };
    assert_eq!(
        (sensor("api_response_time").value_fn)(&data, Some(&stats)),
        Some(SensorValue::Number(12.3))
    );
}

#[test]
fn power_sensor_needs_a_reading() {
    let data = MergedSnapshot::default();
    assert!(!sensor("power_consumption").is_supported(&data));
    assert!(sensor("api_response_time").is_supported(&data));
}

#[test]
fn health_problems() {
    let data = snapshot();
    assert_eq!((binary("system_health").value_fn)(&data), Some(true));
    assert_eq!((binary("bmc_health").value_fn)(&data), Some(false));
    // Unreported health is unknown, not healthy.
    assert_eq!((binary("chassis_health").value_fn)(&data), None);
    assert_eq!((binary("cmos_battery").value_fn)(&data), Some(true));
    assert_eq!((binary("system_power").value_fn)(&data), Some(true));
}

#[test]
fn oem_sensors_follow_validity() {
    let mut data = snapshot();
    assert!(!(binary("ntp_enabled").available_fn)(&data));
    assert!(!(binary("license_active").available_fn)(&data));

    data.license = License {
        licenses: vec![serde_json::json!({"Name": "SFT-DCMS-SINGLE"})],
        is_valid: true,
    };
    assert!((binary("license_active").available_fn)(&data));
    assert_eq!((binary("license_active").value_fn)(&data), Some(true));
}

#[test]
fn intrusion_and_reset_button() {
    let mut data = snapshot();
    let reset = BUTTONS.iter().find(|b| b.key == "reset_intrusion").unwrap();
    assert!(!(reset.available_fn)(&data));

    data.chassis.physical_security = Some(PhysicalSecurity {
        intrusion_sensor: Some(IntrusionSensor::HardwareIntrusion),
        ..PhysicalSecurity::default()
    });
    assert_eq!((binary("intrusion").value_fn)(&data), Some(true));
    assert!((reset.available_fn)(&data));
    assert_eq!((reset.command_fn)(), Command::ResetIntrusionSensor);
}

#[test]
fn switches_produce_commands() {
    let data = snapshot();
    let led = SWITCHES.iter().find(|s| s.key == "indicator_led").unwrap();
    assert_eq!((led.value_fn)(&data), Some(true));
    assert_eq!(
        (led.command_fn)(false),
        Command::SetIndicatorLed(IndicatorLed::Off)
    );

    let ssh = SWITCHES.iter().find(|s| s.key == "ssh_protocol").unwrap();
    assert_eq!((ssh.value_fn)(&data), Some(false));
    assert_eq!(
        (ssh.command_fn)(true),
        Command::SetProtocolEnabled {
            protocol: Protocol::Ssh,
            enabled: true
        }
    );
}

#[test]
fn bmc_restart_targets_the_manager() {
    let button = BUTTONS.iter().find(|b| b.key == "bmc_restart").unwrap();
    assert_eq!(
        (button.command_fn)(),
        Command::ManagerReset(ResetType::GracefulRestart)
    );
}

#[test]
fn fan_mode_select_uses_display_names() {
    let data = snapshot();
    let select = SELECTS.iter().find(|s| s.key == "fan_mode").unwrap();
    assert_eq!((select.options_fn)(&data), vec!["Standard", "Heavy I/O"]);
    assert_eq!((select.current_fn)(&data).as_deref(), Some("Heavy I/O"));
    assert_eq!(
        (select.command_fn)("Full Speed").unwrap(),
        Command::SetFanMode(FanModeType::FullSpeed)
    );
    assert_eq!(
        (select.command_fn)("optimal").unwrap(),
        Command::SetFanMode(FanModeType::Optimal)
    );
    assert!((select.command_fn)("Turbo").is_err());
}

#[test]
fn boot_select_passes_unknown_targets_through() {
    let data = snapshot();
    let select = SELECTS.iter().find(|s| s.key == "boot_source").unwrap();
    assert_eq!(
        (select.options_fn)(&data),
        vec!["None", "PXE", "HDD", "Vendor"]
    );
    assert_eq!((select.current_fn)(&data).as_deref(), Some("PXE"));
    assert_eq!(
        (select.command_fn)("CD/DVD").unwrap(),
        Command::SetBootSource {
            target: "Cd".into(),
            enabled: BootSourceOverrideEnabled::Once,
        }
    );
    assert_eq!(
        (select.command_fn)("Vendor").unwrap(),
        Command::SetBootSource {
            target: "Vendor".into(),
            enabled: BootSourceOverrideEnabled::Once,
        }
    );
}

#[test]
fn member_sensors_skip_unavailable_members() {
    let data = snapshot();
    let members = discover_member_sensors(&data);
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].key(), "temperature_1");
    assert_eq!(members[0].name, "CPU Temp");
    assert_eq!(members[0].value(&data), Some(48.0));

    // A member that disappears later reads as unavailable.
    let mut later = data.clone();
    later.thermal.temperatures.clear();
    assert!(!members[0].available(&later));
}

#[test]
fn readings_cover_every_platform() {
    let data = snapshot();
    let rendered = readings("e1", &data, None);
    let find = |key: &str| rendered.iter().find(|r| r.key == key).unwrap();

    assert_eq!(find("power_consumption").value.as_deref(), Some("142"));
    assert_eq!(find("power_consumption").unit, Some("W"));
    assert_eq!(find("system_power").value.as_deref(), Some("on"));
    assert_eq!(find("temperature_1").unique_id, "e1_temperature_1");
    assert_eq!(find("fan_mode").platform, Platform::Select);
    assert!(!find("reset_intrusion").available);
    assert!(rendered.iter().all(|r| r.key != "ntp_enabled"));
}
