// ── Session lifecycle ──
//
// One configured BMC connection: builds the client, authenticates, runs the
// initial refresh and hands the connection to a Coordinator that keeps it
// fresh. Also owns credential changes, which always end in a reload.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::alert::{AlertSink, IssueRegistry};
use crate::config::{ConnectionConfig, CoordinatorConfig, Credentials};
use crate::coordinator::Coordinator;
use crate::error::CoreError;
use crate::fetch::{ClientFactory, FetchClient, RedfishClientFactory};

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Credentials were rejected; polling is halted until they change.
    ReauthRequired,
    Failed,
}

// ── Session ──────────────────────────────────────────────────────────

/// Lifecycle owner for one BMC connection.
///
/// Cheaply cloneable. `start()` may be called again after `stop()`.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    entry_id: String,
    connection: Mutex<ConnectionConfig>,
    coordinator_config: CoordinatorConfig,
    factory: Arc<dyn ClientFactory>,
    alerts: Arc<dyn AlertSink>,
    state: Arc<watch::Sender<ConnectionState>>,
    active: Mutex<Option<Active>>,
}

/// Everything that exists only while the session is started.
struct Active {
    client: Arc<dyn FetchClient>,
    coordinator: Coordinator,
    cancel: CancellationToken,
    watcher: JoinHandle<()>,
}

impl Session {
    pub fn new(
        entry_id: impl Into<String>,
        connection: ConnectionConfig,
        coordinator_config: CoordinatorConfig,
        factory: Arc<dyn ClientFactory>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(SessionInner {
                entry_id: entry_id.into(),
                connection: Mutex::new(connection),
                coordinator_config,
                factory,
                alerts,
                state: Arc::new(state),
                active: Mutex::new(None),
            }),
        }
    }

    /// A session backed by the Redfish client.
    pub fn redfish(
        entry_id: impl Into<String>,
        connection: ConnectionConfig,
        coordinator_config: CoordinatorConfig,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self::new(
            entry_id,
            connection,
            coordinator_config,
            Arc::new(RedfishClientFactory),
            alerts,
        )
    }

    pub fn entry_id(&self) -> &str {
        &self.inner.entry_id
    }

    pub fn coordinator_config(&self) -> &CoordinatorConfig {
        &self.inner.coordinator_config
    }

    pub fn alerts(&self) -> &Arc<dyn AlertSink> {
        &self.inner.alerts
    }

    /// A copy of the current connection settings.
    pub async fn connection(&self) -> ConnectionConfig {
        self.inner.connection.lock().await.clone()
    }

    /// The running coordinator, if the session is started.
    pub async fn coordinator(&self) -> Option<Coordinator> {
        self.inner
            .active
            .lock()
            .await
            .as_ref()
            .map(|active| active.coordinator.clone())
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    fn set_state(&self, state: ConnectionState) {
        self.inner.state.send_replace(state);
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Connect, perform the first refresh and start scheduled polling.
    ///
    /// A session that is already started is stopped first.
    pub async fn start(&self) -> Result<Coordinator, CoreError> {
        self.start_inner(true).await
    }

    async fn start_inner(&self, poll: bool) -> Result<Coordinator, CoreError> {
        self.stop_active().await;
        self.set_state(ConnectionState::Connecting);

        let config = self.connection().await;
        let client = match self.inner.factory.build(&config) {
            Ok(client) => client,
            Err(e) => {
                self.set_state(ConnectionState::Failed);
                return Err(e);
            }
        };
        let host = client.host().to_owned();

        if let Err(e) = client.connect().await {
            return Err(self.fail_start(&client, &host, e).await);
        }
        debug!(%host, "session established");

        let coordinator = Coordinator::new(
            self.inner.entry_id.clone(),
            Arc::clone(&client),
            Arc::clone(&self.inner.alerts),
            self.inner.coordinator_config,
        );

        // Initial data load
        if let Err(e) = coordinator.refresh().await {
            coordinator.shutdown().await;
            return Err(self.fail_start(&client, &host, e).await);
        }

        if poll {
            coordinator.start_polling().await;
        }

        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(reauth_watch_task(
            coordinator.subscribe_reauth(),
            Arc::clone(&self.inner.state),
            cancel.clone(),
        ));

        *self.inner.active.lock().await = Some(Active {
            client,
            coordinator: coordinator.clone(),
            cancel,
            watcher,
        });
        self.set_state(ConnectionState::Connected);
        info!(%host, entry_id = %self.inner.entry_id, "connected to BMC");
        Ok(coordinator)
    }

    /// Classify a start failure, clean up, and produce the caller's error.
    async fn fail_start(
        &self,
        client: &Arc<dyn FetchClient>,
        host: &str,
        err: CoreError,
    ) -> CoreError {
        client.disconnect().await;

        if err.is_auth() {
            warn!(%host, error = %err, "credentials rejected");
            self.set_state(ConnectionState::ReauthRequired);
            return match err {
                CoreError::ReauthRequired { .. } => err,
                other => CoreError::ReauthRequired {
                    host: host.to_owned(),
                    message: other.to_string(),
                },
            };
        }

        self.set_state(ConnectionState::Failed);
        if err.is_connection() {
            warn!(%host, error = %err, "BMC not ready");
            CoreError::NotReady {
                host: host.to_owned(),
                message: err.to_string(),
            }
        } else {
            err
        }
    }

    /// Stop polling and close the BMC session.
    pub async fn stop(&self) {
        self.stop_active().await;
        self.set_state(ConnectionState::Disconnected);
        debug!(entry_id = %self.inner.entry_id, "session stopped");
    }

    async fn stop_active(&self) {
        let Some(active) = self.inner.active.lock().await.take() else {
            return;
        };
        active.cancel.cancel();
        let _ = active.watcher.await;
        active.coordinator.shutdown().await;
        active.client.disconnect().await;
    }

    /// Tear down and start again with the current settings.
    pub async fn reload(&self) -> Result<Coordinator, CoreError> {
        info!(entry_id = %self.inner.entry_id, "reloading session");
        self.stop().await;
        self.start().await
    }

    // ── Credentials ──────────────────────────────────────────────────

    /// Replace the stored credentials. Takes effect on the next start.
    pub async fn update_credentials(&self, credentials: Credentials) {
        let mut connection = self.inner.connection.lock().await;
        debug!(username = %credentials.username, "credentials updated");
        connection.credentials = credentials;
    }

    /// Check credentials against the BMC with a throwaway client.
    pub async fn validate_credentials(&self, credentials: &Credentials) -> Result<(), CoreError> {
        let mut candidate = self.connection().await;
        candidate.credentials = credentials.clone();

        let client = self.inner.factory.build(&candidate)?;
        client.connect().await?;
        client.disconnect().await;
        Ok(())
    }

    /// Validate new credentials, store them and reload.
    ///
    /// Nothing changes if validation fails.
    pub async fn reauthenticate(&self, credentials: Credentials) -> Result<Coordinator, CoreError> {
        self.validate_credentials(&credentials).await?;
        self.update_credentials(credentials).await;
        self.reload().await
    }

    // ── One-shot ─────────────────────────────────────────────────────

    /// Connect without scheduled polling, run `f`, then stop.
    ///
    /// Alerts go to a private registry that is dropped afterwards.
    pub async fn oneshot<F, Fut, T>(
        entry_id: impl Into<String>,
        connection: ConnectionConfig,
        coordinator_config: CoordinatorConfig,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Coordinator) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let session = Self::redfish(
            entry_id,
            connection,
            coordinator_config,
            Arc::new(IssueRegistry::new()),
        );
        let coordinator = session.start_inner(false).await?;
        let result = f(coordinator).await;
        session.stop().await;
        result
    }
}

/// Mirror the coordinator's auth halt into the connection state.
async fn reauth_watch_task(
    mut reauth: watch::Receiver<bool>,
    state: Arc<watch::Sender<ConnectionState>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = reauth.changed() => {
                if changed.is_err() {
                    break;
                }
                if *reauth.borrow_and_update() {
                    state.send_replace(ConnectionState::ReauthRequired);
                    break;
                }
            }
        }
    }
}
