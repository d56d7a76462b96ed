//! Adaptive polling layer between `bmcwatch-api` and consumers (CLI, daemons).
//!
//! This crate owns the polling policy, alerting and control surface for a
//! Supermicro BMC:
//!
//! - **[`Coordinator`]**: Keeps a [`MergedSnapshot`] fresh. Dynamic data
//!   (thermal, power, fan mode, POST code) is fetched every cycle; static data
//!   (identity, firmware, protocols, licensing) is cached for a configurable
//!   maximum age. Concurrent refresh requests coalesce into one fetch. After a
//!   user action, [`enable_burst_mode()`](Coordinator::enable_burst_mode)
//!   polls fast for a bounded window.
//!
//! - **[`Session`]**: Lifecycle of one configured connection: authenticate,
//!   initial refresh, scheduled polling, credential changes and reloads.
//!   [`Session::oneshot()`](Session::oneshot) runs a closure against a
//!   connected coordinator for single CLI invocations.
//!
//! - **Alerts** ([`alert`]): Three consecutive connection failures raise a
//!   persistent, fixable issue through an [`AlertSink`]. The [`RepairFlow`]
//!   resolves it by validating new credentials and reloading the session.
//!
//! - **[`Command`]**: Typed control actions (power, LED, protocols, fan mode,
//!   boot override) executed through [`Coordinator::execute`].
//!
//! - **Entity tables** ([`entity`]): Declarative sensors, binary sensors,
//!   switches, buttons and selects over the merged snapshot.
//!
//! - **[`FetchClient`]**: The data-source seam. Implemented for
//!   [`bmcwatch_api::RedfishClient`]; tests substitute scripted fakes.

pub mod alert;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod fetch;
pub mod repair;
pub mod session;
pub mod snapshot;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use alert::{AlertSink, Issue, IssueKind, IssueRegistry, Severity, connection_issue_id};
pub use command::Command;
pub use config::{
    CONNECTION_ERROR_THRESHOLD, ConnectionConfig, CoordinatorConfig, Credentials, OptionRange,
    TlsVerification,
};
pub use coordinator::{Coordinator, CoordinatorStatus, Health};
pub use error::{CoreError, ErrorKind};
pub use fetch::{ClientFactory, FetchClient, RedfishClientFactory};
pub use repair::{RepairError, RepairFlow};
pub use session::{ConnectionState, Session};
pub use snapshot::{MergedSnapshot, merge};
pub use stream::SnapshotStream;

// Model types consumers need to build commands and read snapshots.
pub use bmcwatch_api::ClientStats;
pub use bmcwatch_api::models::{
    BootSourceOverrideEnabled, DynamicSnapshot, FanModeType, IndicatorLed, Protocol, ResetType,
    StaticSnapshot,
};
