// Composite fetches
//
// The static and dynamic snapshots are each assembled from several
// resources fetched concurrently (bounded by the client's semaphore).
// Core resources must succeed; OEM resources and `NetworkProtocol`
// degrade to an `is_valid = false` default when the BMC does not
// implement them.

use std::future::Future;

use chrono::Utc;
use tracing::debug;

use crate::error::Error;
use crate::models::{DynamicSnapshot, StaticSnapshot};
use crate::redfish::client::RedfishClient;

impl RedfishClient {
    /// Fetch identity and configuration data.
    pub async fn fetch_static(&self) -> Result<StaticSnapshot, Error> {
        let (system, chassis, manager, license, ntp, lldp, network_protocol) = tokio::try_join!(
            self.system(),
            self.chassis(),
            self.manager(),
            optional("license", self.license()),
            optional("ntp", self.ntp()),
            optional("lldp", self.lldp()),
            optional("network_protocol", self.network_protocol()),
        )?;

        Ok(StaticSnapshot {
            system,
            chassis,
            manager,
            license,
            ntp,
            lldp,
            network_protocol,
            fetched_at: Utc::now(),
        })
    }

    /// Fetch runtime telemetry.
    pub async fn fetch_dynamic(&self) -> Result<DynamicSnapshot, Error> {
        let (thermal, power, fan_mode, snooping) = tokio::try_join!(
            self.thermal(),
            self.power(),
            optional("fan_mode", self.fan_mode()),
            optional("snooping", self.snooping()),
        )?;

        Ok(DynamicSnapshot {
            thermal,
            power,
            fan_mode,
            snooping,
            fetched_at: Utc::now(),
        })
    }
}

/// Treat an unimplemented endpoint as an unavailable (default) value.
async fn optional<T: Default>(
    resource: &'static str,
    fetch: impl Future<Output = Result<T, Error>>,
) -> Result<T, Error> {
    match fetch.await {
        Err(e) if e.is_unsupported() => {
            debug!(resource, error = %e, "endpoint unavailable");
            Ok(T::default())
        }
        other => other,
    }
}
