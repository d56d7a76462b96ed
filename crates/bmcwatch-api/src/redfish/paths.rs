// Resource paths. Supermicro BMCs expose a single system, chassis and
// manager, always with member id `1`.

pub(crate) const SESSIONS: &str = "/redfish/v1/SessionService/Sessions";

pub(crate) const SYSTEM: &str = "/redfish/v1/Systems/1";
pub(crate) const SYSTEM_RESET: &str = "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset";

pub(crate) const CHASSIS: &str = "/redfish/v1/Chassis/1";
pub(crate) const THERMAL: &str = "/redfish/v1/Chassis/1/Thermal";
pub(crate) const POWER: &str = "/redfish/v1/Chassis/1/Power";

pub(crate) const MANAGER: &str = "/redfish/v1/Managers/1";
pub(crate) const MANAGER_RESET: &str = "/redfish/v1/Managers/1/Actions/Manager.Reset";
pub(crate) const NETWORK_PROTOCOL: &str = "/redfish/v1/Managers/1/NetworkProtocol";

pub(crate) const FAN_MODE: &str = "/redfish/v1/Managers/1/Oem/Supermicro/FanMode";
pub(crate) const NTP: &str = "/redfish/v1/Managers/1/Oem/Supermicro/NTP";
pub(crate) const LLDP: &str = "/redfish/v1/Managers/1/Oem/Supermicro/LLDP";
pub(crate) const SNOOPING: &str = "/redfish/v1/Managers/1/Oem/Supermicro/Snooping";
pub(crate) const LICENSE: &str =
    "/redfish/v1/Managers/1/Oem/Supermicro/LicenseManager/QueryLicense";
