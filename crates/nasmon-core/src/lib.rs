//! Reactive data layer between `nasmon-api` and UI consumers.
//!
//! - **[`DeviceStore`]** -- Owns the lifecycle: [`initialize()`](DeviceStore::initialize)
//!   loads the inventory and frontend config, then starts one recurring poll
//!   per device type at the backend-configured cadence. Any failed inventory
//!   or latest-values call takes the store offline: polling stops and a
//!   fixed-interval reconnection probe runs until the backend answers again.
//!
//! - **[`DataStore`]** -- Cached state held in `tokio::sync::watch` channels,
//!   plus derived views (`zpools`, `cpu`, `standalone_storage`, ...) computed
//!   from the current snapshot.
//!
//! - **[`StateStream<T>`]** -- Subscription handle exposing
//!   `current()` / `latest()` / `changed()`, or a `Stream`.
//!
//! - **[`NasBackend`]** -- The transport seam. [`ApiClient`] is the HTTP
//!   implementation; tests substitute an in-memory backend.

pub mod backend;
pub mod config;
pub mod device_store;
pub mod error;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{NasBackend, build_api_client};
pub use config::{StoreConfig, TlsVerification};
pub use device_store::{CONNECT_ERROR, ConnectionState, DeviceStore};
pub use error::CoreError;
pub use store::{DataStore, MetricsByDevice};
pub use stream::{StateStream, StateWatchStream};

pub use nasmon_api::Error as TransportError;
pub use nasmon_api::{
    ActionAck, ApiClient, DeviceRecord, DeviceType, DeviceUpdate, Envelope, FrontendConfig,
    HistoryType, Inventory, LatestValues, MetricSample, MetricsQuery, SystemDevices,
};
