// Manager (BMC) endpoints

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::Error;
use crate::models::{Manager, NetworkProtocol, Protocol, ResetType};
use crate::redfish::client::RedfishClient;
use crate::redfish::paths;

impl RedfishClient {
    /// `GET /redfish/v1/Managers/1`
    pub async fn manager(&self) -> Result<Manager, Error> {
        self.get(paths::MANAGER).await
    }

    /// Restart the BMC. The session is gone once the BMC comes back.
    ///
    /// `POST /redfish/v1/Managers/1/Actions/Manager.Reset`
    pub async fn reset_manager(&self, reset_type: ResetType) -> Result<(), Error> {
        debug!(%reset_type, "manager reset");
        self.post_action(paths::MANAGER_RESET, &json!({ "ResetType": reset_type }))
            .await
    }

    /// `GET /redfish/v1/Managers/1/NetworkProtocol`
    pub async fn network_protocol(&self) -> Result<NetworkProtocol, Error> {
        self.get(paths::NETWORK_PROTOCOL).await
    }

    /// Enable or disable a network service on the BMC.
    ///
    /// `PATCH /redfish/v1/Managers/1/NetworkProtocol` with
    /// `{"<PROTO>": {"ProtocolEnabled": bool}}`
    pub async fn set_protocol_enabled(
        &self,
        protocol: Protocol,
        enabled: bool,
    ) -> Result<(), Error> {
        let mut body = Map::new();
        body.insert(
            protocol.redfish_property().to_owned(),
            json!({ "ProtocolEnabled": enabled }),
        );
        self.patch(paths::NETWORK_PROTOCOL, &Value::Object(body))
            .await
    }
}
