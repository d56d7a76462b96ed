// Redfish HTTP client
//
// Wraps `reqwest::Client` with session-token injection, a per-BMC request
// concurrency bound, Redfish error-body decoding and request statistics.
// Endpoint methods (systems, chassis, managers, OEM) are implemented as
// inherent methods in sibling files to keep this module focused on
// transport mechanics.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::common::RedfishErrorBody;
use crate::redfish::stats::{ClientStats, RequestStats};
use crate::transport::TransportConfig;

/// Header carrying the session token on every authenticated request.
pub(crate) const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// An established Redfish session.
#[derive(Debug, Clone)]
pub(crate) struct SessionToken {
    pub token: String,
    /// Session resource to `DELETE` on logout, from the login `Location` header.
    pub uri: Option<Url>,
}

/// Async client for one Supermicro BMC.
///
/// `connect()` must be called before any resource is fetched. A session
/// rejected mid-flight (BMC restart, idle timeout) triggers one transparent
/// re-login before the request is reported as an authentication failure.
/// Concurrent requests rejected with the same token share that re-login.
pub struct RedfishClient {
    http: reqwest::Client,
    base_url: Url,
    host: String,
    username: String,
    password: SecretString,
    timeout: Duration,
    session: RwLock<Option<SessionToken>>,
    relogin: Mutex<()>,
    limiter: Semaphore,
    stats: RequestStats,
}

impl RedfishClient {
    /// Create a client for `host`.
    ///
    /// `host` is either a bare address (`10.0.0.5`, `bmc.lan:8443`), which
    /// is reached over HTTPS, or a full base URL.
    pub fn new(
        host: &str,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = base_url_for_host(host)?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            host: host.to_owned(),
            username: username.into(),
            password,
            timeout: transport.timeout,
            session: RwLock::new(None),
            relogin: Mutex::new(()),
            limiter: Semaphore::new(transport.permits()),
            stats: RequestStats::default(),
        })
    }

    /// The host this client was configured with.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    /// `true` once a session token is held.
    pub fn is_connected(&self) -> bool {
        self.session.read().expect("session lock poisoned").is_some()
    }

    /// Snapshot of request counters and response timings.
    pub fn stats(&self) -> ClientStats {
        self.stats.snapshot()
    }

    // ── Session storage ──────────────────────────────────────────────

    pub(crate) fn store_session(&self, session: SessionToken) {
        *self.session.write().expect("session lock poisoned") = Some(session);
    }

    pub(crate) fn take_session(&self) -> Option<SessionToken> {
        self.session.write().expect("session lock poisoned").take()
    }

    fn token(&self) -> Result<String, Error> {
        self.session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|session| session.token.clone())
            .ok_or(Error::NotConnected)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve an absolute Redfish path (`/redfish/v1/...`) against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET a resource and decode it.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        debug!("GET {}", path);
        let resp = self.send_authenticated(Method::GET, path, None, None).await?;
        let resp = check_status(resp).await?;
        parse_json(resp).await
    }

    /// POST a Redfish action. The response body, if any, is discarded.
    pub(crate) async fn post_action(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<(), Error> {
        debug!("POST {}", path);
        let resp = self
            .send_authenticated(Method::POST, path, Some(body), None)
            .await?;
        check_status(resp).await.map(drop)
    }

    /// PATCH a resource.
    ///
    /// Newer Supermicro firmware answers `428 Precondition Required` unless
    /// the request carries the resource's current ETag; in that case the
    /// ETag is read with a GET and the PATCH retried once with `If-Match`.
    pub(crate) async fn patch(&self, path: &str, body: &serde_json::Value) -> Result<(), Error> {
        debug!("PATCH {}", path);
        let resp = self
            .send_authenticated(Method::PATCH, path, Some(body), None)
            .await?;
        if resp.status() != StatusCode::PRECONDITION_REQUIRED {
            return check_status(resp).await.map(drop);
        }

        trace!("PATCH {} requires If-Match", path);
        let current = self.send_authenticated(Method::GET, path, None, None).await?;
        let current = check_status(current).await?;
        let etag = current
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|value| value.to_str().ok())
            .map(String::from)
            .ok_or_else(|| Error::Redfish {
                status: StatusCode::PRECONDITION_REQUIRED.as_u16(),
                message: format!("{path} requires If-Match but returned no ETag"),
            })?;

        let resp = self
            .send_authenticated(Method::PATCH, path, Some(body), Some(&etag))
            .await?;
        check_status(resp).await.map(drop)
    }

    /// Send a request with the session token, logging in again once if the
    /// BMC rejects the token.
    async fn send_authenticated(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        if_match: Option<&str>,
    ) -> Result<reqwest::Response, Error> {
        let token = self.token()?;
        let resp = self
            .send(method.clone(), path, body, if_match, &token)
            .await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        {
            let _relogin = self.relogin.lock().await;
            if self.token().ok().as_deref() == Some(token.as_str()) {
                debug!("session rejected by BMC, logging in again");
                self.login().await?;
            } else {
                debug!("session already renewed by a concurrent request");
            }
        }

        let renewed = self.token()?;
        let resp = self.send(method, path, body, if_match, &renewed).await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }
        Ok(resp)
    }

    /// Send a single request under the concurrency bound, recording timing.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        if_match: Option<&str>,
        token: &str,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;

        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| Error::NotConnected)?;

        let mut builder = self
            .http
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, token);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        if let Some(etag) = if_match {
            builder = builder.header(reqwest::header::IF_MATCH, etag);
        }

        let started = Instant::now();
        let result = builder.send().await;
        let failed = result
            .as_ref()
            .map_or(true, |resp| resp.status().is_server_error());
        self.stats.record(started.elapsed(), failed);

        result.map_err(|e| self.map_transport(e))
    }

    /// Fold reqwest timeouts into `Error::Timeout` so callers see the budget.
    pub(crate) fn map_transport(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(error)
        }
    }
}

/// Build the API base URL from a configured host string.
pub fn base_url_for_host(host: &str) -> Result<Url, Error> {
    let host = host.trim().trim_end_matches('/');
    if host.contains("://") {
        Url::parse(host).map_err(Error::InvalidUrl)
    } else {
        Url::parse(&format!("https://{host}")).map_err(Error::InvalidUrl)
    }
}

/// Map non-success statuses to typed errors, decoding the Redfish error body.
pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::SessionExpired);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<RedfishErrorBody>(&body)
        .ok()
        .and_then(RedfishErrorBody::into_message)
        .unwrap_or_else(|| body.chars().take(200).collect());
    Err(Error::Redfish {
        status: status.as_u16(),
        message,
    })
}

/// Decode a JSON body, keeping a preview of the payload on failure.
pub(crate) async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await.map_err(Error::Transport)?;
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_defaults_to_https() {
        let url = base_url_for_host("10.0.0.5").unwrap();
        assert_eq!(url.as_str(), "https://10.0.0.5/");
        let url = base_url_for_host("bmc.lan:8443/").unwrap();
        assert_eq!(url.as_str(), "https://bmc.lan:8443/");
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let url = base_url_for_host("http://127.0.0.1:9000").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn requests_before_connect_fail() {
        let client = RedfishClient::new(
            "10.0.0.5",
            "ADMIN",
            SecretString::from("secret".to_owned()),
            &TransportConfig::default(),
        )
        .unwrap();
        assert!(!client.is_connected());
        assert!(matches!(client.token(), Err(Error::NotConnected)));
    }
}
