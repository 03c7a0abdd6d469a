// ── Runtime store configuration ──
//
// These types describe *where* the backend lives and how the store paces
// itself. They never touch disk: `nasmon-config` (or a test) builds a
// `StoreConfig` and hands it in.

use std::time::Duration;

use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for a single [`DeviceStore`](crate::DeviceStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Backend root (e.g., `http://localhost:8000`).
    pub api_base: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout enforced by the HTTP transport.
    pub timeout: Duration,
    /// Fixed period of the reconnection probe.
    pub reconnect_interval: Duration,
    /// Trailing window, in hours, for polled raw metrics when the
    /// backend config doesn't specify one.
    pub metrics_window_hours: u32,
    /// Default window, in hours, for drill-down detail metrics.
    pub detail_window_hours: u32,
}

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(3);

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base: Url::parse(DEFAULT_API_BASE).expect("default API base is a valid URL"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            metrics_window_hours: 1,
            detail_window_hours: 24,
        }
    }
}
