// Redfish session authentication
//
// Token-based login via the SessionService. The token comes back in the
// `X-Auth-Token` response header and the session resource in `Location`;
// logout deletes that resource.

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::Error;
use crate::redfish::client::{AUTH_TOKEN_HEADER, RedfishClient, SessionToken, check_status};
use crate::redfish::paths;

impl RedfishClient {
    /// Open a session on the BMC.
    ///
    /// Any session held from a previous `connect()` is replaced.
    pub async fn connect(&self) -> Result<(), Error> {
        self.login().await?;
        debug!(host = %self.host(), "connected");
        Ok(())
    }

    /// Close the current session. Safe to call when not connected.
    ///
    /// The session is dropped locally even if the BMC does not answer; it
    /// will time out on the BMC side.
    pub async fn disconnect(&self) -> Result<(), Error> {
        let Some(session) = self.take_session() else {
            return Ok(());
        };
        let Some(uri) = session.uri else {
            debug!("session has no resource URI, nothing to delete");
            return Ok(());
        };

        debug!("DELETE {}", uri);
        let resp = self
            .http()
            .delete(uri)
            .header(AUTH_TOKEN_HEADER, session.token)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        if !resp.status().is_success() {
            warn!(status = %resp.status(), "BMC refused to delete session");
        }
        debug!("logout complete");
        Ok(())
    }

    /// `POST /redfish/v1/SessionService/Sessions` and store the token.
    pub(crate) async fn login(&self) -> Result<(), Error> {
        let url = self.url(paths::SESSIONS)?;
        debug!("logging in at {}", url);

        let body = json!({
            "UserName": self.username(),
            "Password": self.password().expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(Error::Authentication {
                message: format!("login rejected (HTTP {status})"),
            });
        }
        let resp = check_status(resp).await?;

        let token = resp
            .headers()
            .get(AUTH_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| Error::Authentication {
                message: "login response carried no X-Auth-Token".into(),
            })?;

        let uri = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|location| self.base_url().join(location).ok());

        self.store_session(SessionToken { token, uri });
        debug!("login successful");
        Ok(())
    }
}
