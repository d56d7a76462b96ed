// bmcwatch-api: Async Rust client for the Redfish API of Supermicro BMCs

pub mod error;
pub mod models;
pub mod redfish;
pub mod transport;

pub use error::Error;
pub use redfish::{ClientStats, RedfishClient};
pub use transport::{TlsMode, TransportConfig};
