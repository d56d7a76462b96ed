pub mod client;
pub mod stats;

mod chassis;
mod composite;
mod managers;
mod oem;
mod paths;
mod session;
mod systems;

pub use client::{RedfishClient, base_url_for_host};
pub use stats::ClientStats;
