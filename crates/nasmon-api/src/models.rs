// NAS Monitor wire types
//
// Every endpoint wraps its payload in `{ "status": "success", "data": ... }`.
// Fields use `#[serde(default)]` liberally: the inventory and system-info
// shapes depend on the host (pool layout, NIC count, sensors present).

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard response envelope.
///
/// ```json
/// { "status": "success", "data": { ... } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

impl<T> Envelope<T> {
    /// `true` when the backend reported `"status": "success"`.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Acknowledgment returned by host power actions (no `data` member).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionAck {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionAck {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

// ── Enumerations ─────────────────────────────────────────────────────

/// The unit of independent polling granularity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviceType {
    Cpu,
    Ram,
    Network,
    Storage,
    ZfsPool,
}

impl DeviceType {
    /// The fixed polling set, in start order.
    pub const ALL: [DeviceType; 5] = [
        DeviceType::Cpu,
        DeviceType::Ram,
        DeviceType::Network,
        DeviceType::Storage,
        DeviceType::ZfsPool,
    ];
}

/// Metric granularity: raw samples, daily rollups, or full history.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HistoryType {
    #[default]
    Raw,
    Daily,
    History,
}

// ── Inventory ────────────────────────────────────────────────────────

/// Point-in-time inventory snapshot from `GET /api/inventory`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// ZFS pools (each with its member disks).
    #[serde(default)]
    pub zpools: Vec<serde_json::Value>,
    #[serde(default)]
    pub system_devices: SystemDevices,
    #[serde(default)]
    pub uptime_seconds: Option<u64>,
    /// Catch-all for fields this client doesn't model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Non-pool devices: cpu, ram, network and standalone storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemDevices {
    #[serde(default)]
    pub cpu: Option<serde_json::Value>,
    #[serde(default)]
    pub ram: Option<serde_json::Value>,
    #[serde(default)]
    pub network: Option<serde_json::Value>,
    /// Disks that are not members of a multi-disk pool.
    #[serde(default)]
    pub storage: Vec<serde_json::Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Configuration ────────────────────────────────────────────────────

/// Frontend settings from `GET /api/config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Polling interval in seconds, keyed by device type (`"cpu"`, `"zfs_pool"`, ...).
    #[serde(default)]
    pub update_intervals: HashMap<String, u64>,
    /// SMART health level to display name (`"0" -> "OK"`, `"2" -> "Critical"`).
    #[serde(default)]
    pub smart_status_levels: HashMap<String, String>,
    #[serde(default)]
    pub chart_history_points: Option<u32>,
    /// Trailing window, in hours, the dashboard should request for raw metrics.
    #[serde(default)]
    pub raw_metrics_hours: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FrontendConfig {
    /// Polling interval for a device type, if configured and non-zero.
    pub fn interval_secs(&self, device_type: DeviceType) -> Option<u64> {
        self.update_intervals
            .get(device_type.as_ref())
            .copied()
            .filter(|secs| *secs > 0)
    }
}

// ── Metrics ──────────────────────────────────────────────────────────

/// A single timestamped measurement from `GET /api/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(default)]
    pub id: Option<i64>,
    pub device_name: String,
    #[serde(default)]
    pub device_type: Option<String>,
    pub label: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Accept RFC 3339, or a naive ISO-8601 timestamp interpreted as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Latest value per device and label: `{ device_name: { label: value } }`.
pub type LatestValues = HashMap<String, HashMap<String, f64>>;

/// Query for `GET /api/metrics`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsQuery {
    pub history_type: HistoryType,
    pub device_types: Vec<DeviceType>,
    pub device_names: Vec<String>,
    /// Trailing window; only sent for [`HistoryType::Raw`].
    pub hours: Option<u32>,
}

impl MetricsQuery {
    /// Raw samples over the trailing `hours`.
    pub fn raw(hours: u32) -> Self {
        Self {
            history_type: HistoryType::Raw,
            hours: Some(hours),
            ..Self::default()
        }
    }

    pub fn with_device_types(mut self, types: &[DeviceType]) -> Self {
        self.device_types = types.to_vec();
        self
    }

    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_names.push(name.into());
        self
    }

    /// Render as query pairs. List filters become repeated keys.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("history_type", self.history_type.to_string())];
        pairs.extend(
            self.device_types
                .iter()
                .map(|t| ("device_types", t.to_string())),
        );
        pairs.extend(
            self.device_names
                .iter()
                .map(|n| ("device_names", n.clone())),
        );
        if self.history_type == HistoryType::Raw {
            if let Some(hours) = self.hours {
                pairs.push(("hours", hours.to_string()));
            }
        }
        pairs
    }
}

// ── Device registry ──────────────────────────────────────────────────

/// Registered device from `GET /api/devices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Partial settings update for `PATCH /api/devices/{name}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl DeviceUpdate {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
        }
    }
}
