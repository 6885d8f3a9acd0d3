// omada-api: Async Rust client for the TP-Link Omada controller API

pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod ports;
mod session;
pub mod transport;

pub use auth::{Credentials, Session, SessionState};
pub use client::{ClientConfig, OmadaClient, SiteSelector};
pub use devices::enrich_switches;
pub use error::Error;
pub use models::{Device, Port, PortStatus};
pub use ports::PortFetcher;
pub use transport::{TlsMode, TransportConfig};
