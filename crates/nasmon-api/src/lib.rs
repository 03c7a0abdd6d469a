// nasmon-api: Async Rust client for the NAS Monitor backend REST API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ApiClient;
pub use error::Error;
pub use models::{
    ActionAck, DeviceRecord, DeviceType, DeviceUpdate, Envelope, FrontendConfig, HistoryType,
    Inventory, LatestValues, MetricSample, MetricsQuery, SystemDevices,
};
pub use transport::{TlsMode, TransportConfig};
