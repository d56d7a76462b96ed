// Shared fakes for the coordinator and session tests.

#![allow(dead_code, clippy::unwrap_used, clippy::cast_precision_loss)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bmcwatch_api::models::{ComputerSystem, DynamicSnapshot, Power, PowerControl, StaticSnapshot};
use bmcwatch_core::{
    AlertSink, ClientFactory, Command, ConnectionConfig, CoordinatorConfig, CoreError, Credentials,
    FetchClient, Issue, IssueRegistry,
};
use secrecy::ExposeSecret;

pub const HOST: &str = "10.0.0.5";
pub const GOOD_PASSWORD: &str = "hunter2";

pub fn connection_failed() -> CoreError {
    CoreError::ConnectionFailed {
        message: "connection refused".into(),
    }
}

pub fn auth_failed() -> CoreError {
    CoreError::AuthenticationFailed {
        message: "login rejected (HTTP 401)".into(),
    }
}

pub fn unexpected() -> CoreError {
    CoreError::UnexpectedResponse {
        message: "expected value at line 1".into(),
    }
}

// ── Scripted client ──────────────────────────────────────────────────

/// Fetch client whose outcomes are queued up front. An empty queue means
/// success. Dynamic snapshots carry the call number as their wattage and
/// static snapshots as their BIOS version, so tests can tell fetches apart.
#[derive(Default)]
pub struct ScriptedClient {
    connect_results: Mutex<VecDeque<Result<(), CoreError>>>,
    dynamic_results: Mutex<VecDeque<Result<(), CoreError>>>,
    static_results: Mutex<VecDeque<Result<(), CoreError>>>,
    execute_results: Mutex<VecDeque<Result<(), CoreError>>>,
    delay: Mutex<Duration>,
    pub connect_calls: AtomicUsize,
    pub disconnect_calls: AtomicUsize,
    pub dynamic_calls: AtomicUsize,
    pub static_calls: AtomicUsize,
    pub executed: Mutex<Vec<Command>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_connect(&self, err: CoreError) {
        self.connect_results.lock().unwrap().push_back(Err(err));
    }

    pub fn fail_dynamic(&self, err: CoreError) {
        self.dynamic_results.lock().unwrap().push_back(Err(err));
    }

    pub fn succeed_dynamic(&self) {
        self.dynamic_results.lock().unwrap().push_back(Ok(()));
    }

    pub fn fail_static(&self, err: CoreError) {
        self.static_results.lock().unwrap().push_back(Err(err));
    }

    pub fn fail_execute(&self, err: CoreError) {
        self.execute_results.lock().unwrap().push_back(Err(err));
    }

    /// Every fetch takes this long.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn dynamic_calls(&self) -> usize {
        self.dynamic_calls.load(Ordering::SeqCst)
    }

    pub fn static_calls(&self) -> usize {
        self.static_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    fn next(queue: &Mutex<VecDeque<Result<(), CoreError>>>) -> Result<(), CoreError> {
        queue.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl FetchClient for ScriptedClient {
    fn host(&self) -> &str {
        HOST
    }

    async fn connect(&self) -> Result<(), CoreError> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.connect_results)
    }

    async fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn fetch_dynamic(&self) -> Result<DynamicSnapshot, CoreError> {
        let n = self.dynamic_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.pause().await;
        Self::next(&self.dynamic_results)?;
        Ok(DynamicSnapshot {
            power: Power {
                power_control: vec![PowerControl {
                    member_id: "0".into(),
                    power_consumed_watts: Some(n as f64),
                    ..PowerControl::default()
                }],
                ..Power::default()
            },
            ..DynamicSnapshot::default()
        })
    }

    async fn fetch_static(&self) -> Result<StaticSnapshot, CoreError> {
        let n = self.static_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.pause().await;
        Self::next(&self.static_results)?;
        Ok(StaticSnapshot {
            system: ComputerSystem {
                id: "1".into(),
                manufacturer: Some("Supermicro".into()),
                model: Some("X12STH-SYS".into()),
                bios_version: Some(format!("static-{n}")),
                ..ComputerSystem::default()
            },
            ..StaticSnapshot::default()
        })
    }

    async fn execute(&self, command: &Command) -> Result<(), CoreError> {
        self.executed.lock().unwrap().push(command.clone());
        Self::next(&self.execute_results)
    }
}

// ── Factory ──────────────────────────────────────────────────────────

/// Builds scripted clients. Connecting succeeds only with
/// [`GOOD_PASSWORD`] while the BMC is reachable.
pub struct FakeFactory {
    pub reachable: AtomicBool,
    pub built: Mutex<Vec<Arc<ScriptedClient>>>,
    /// Queued into the dynamic script of the next client built.
    pending_dynamic: Mutex<Vec<CoreError>>,
}

impl FakeFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            reachable: AtomicBool::new(true),
            built: Mutex::new(Vec::new()),
            pending_dynamic: Mutex::new(Vec::new()),
        })
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    pub fn fail_next_dynamic(&self, err: CoreError) {
        self.pending_dynamic.lock().unwrap().push(err);
    }

    pub fn last(&self) -> Arc<ScriptedClient> {
        Arc::clone(self.built.lock().unwrap().last().unwrap())
    }

    pub fn built_count(&self) -> usize {
        self.built.lock().unwrap().len()
    }
}

struct FactoryHandle(Arc<FakeFactory>);

impl ClientFactory for FactoryHandle {
    fn build(&self, config: &ConnectionConfig) -> Result<Arc<dyn FetchClient>, CoreError> {
        let client = ScriptedClient::new();
        if !self.0.reachable.load(Ordering::SeqCst) {
            client.fail_connect(connection_failed());
        } else if config.credentials.password.expose_secret() != GOOD_PASSWORD {
            client.fail_connect(auth_failed());
        }
        for err in self.0.pending_dynamic.lock().unwrap().drain(..) {
            client.fail_dynamic(err);
        }
        self.0.built.lock().unwrap().push(Arc::clone(&client));
        Ok(client)
    }
}

pub fn factory_handle(factory: &Arc<FakeFactory>) -> Arc<dyn ClientFactory> {
    Arc::new(FactoryHandle(Arc::clone(factory)))
}

pub fn connection(password: &str) -> ConnectionConfig {
    ConnectionConfig::new(HOST, Credentials::new("ADMIN", password))
}

pub fn config() -> CoordinatorConfig {
    CoordinatorConfig::default()
}

// ── Alert sink ───────────────────────────────────────────────────────

/// Issue registry that also counts `raise` calls.
#[derive(Default)]
pub struct RecordingSink {
    pub registry: IssueRegistry,
    pub raises: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn raises(&self) -> usize {
        self.raises.load(Ordering::SeqCst)
    }
}

impl AlertSink for RecordingSink {
    fn raise(&self, issue: Issue) {
        self.raises.fetch_add(1, Ordering::SeqCst);
        self.registry.raise(issue);
    }

    fn clear(&self, issue_id: &str) -> bool {
        self.registry.clear(issue_id)
    }

    fn get(&self, issue_id: &str) -> Option<Issue> {
        self.registry.get(issue_id)
    }
}
