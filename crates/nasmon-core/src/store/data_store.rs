// ── Central reactive data store ──
//
// Cached backend state. Each value lives in its own `watch` channel;
// derived views read the current snapshot, so they can never drift.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use nasmon_api::{DeviceRecord, FrontendConfig, Inventory, LatestValues, MetricSample, SystemDevices};
use tokio::sync::watch;

use super::merge::MetricsByDevice;
use crate::stream::StateStream;

/// Reactive cache for inventory, configuration, metrics and connectivity.
///
/// Only [`DeviceStore`](crate::DeviceStore) writes here; consumers read
/// snapshots or subscribe.
pub struct DataStore {
    pub(crate) inventory: watch::Sender<Option<Arc<Inventory>>>,
    pub(crate) config: watch::Sender<Option<Arc<FrontendConfig>>>,
    pub(crate) metrics: watch::Sender<Arc<MetricsByDevice>>,
    pub(crate) latest: watch::Sender<Arc<LatestValues>>,
    pub(crate) detail_metrics: watch::Sender<Arc<Vec<MetricSample>>>,
    pub(crate) devices: watch::Sender<Arc<Vec<DeviceRecord>>>,
    pub(crate) system_info: watch::Sender<Option<Arc<serde_json::Value>>>,
    pub(crate) uptime_seconds: watch::Sender<u64>,
    pub(crate) connected: watch::Sender<bool>,
    pub(crate) inventory_loaded: watch::Sender<bool>,
    pub(crate) loading: watch::Sender<bool>,
    pub(crate) error: watch::Sender<Option<String>>,
    pub(crate) last_inventory: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self {
            inventory: watch::channel(None).0,
            config: watch::channel(None).0,
            metrics: watch::channel(Arc::default()).0,
            latest: watch::channel(Arc::default()).0,
            detail_metrics: watch::channel(Arc::default()).0,
            devices: watch::channel(Arc::default()).0,
            system_info: watch::channel(None).0,
            uptime_seconds: watch::channel(0).0,
            // Optimistic until a call says otherwise.
            connected: watch::channel(true).0,
            inventory_loaded: watch::channel(false).0,
            loading: watch::channel(false).0,
            error: watch::channel(None).0,
            last_inventory: watch::channel(None).0,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn inventory(&self) -> Option<Arc<Inventory>> {
        self.inventory.borrow().clone()
    }

    pub fn config(&self) -> Option<Arc<FrontendConfig>> {
        self.config.borrow().clone()
    }

    pub fn metrics(&self) -> Arc<MetricsByDevice> {
        self.metrics.borrow().clone()
    }

    pub fn latest_values(&self) -> Arc<LatestValues> {
        self.latest.borrow().clone()
    }

    pub fn detail_metrics(&self) -> Arc<Vec<MetricSample>> {
        self.detail_metrics.borrow().clone()
    }

    pub fn devices(&self) -> Arc<Vec<DeviceRecord>> {
        self.devices.borrow().clone()
    }

    pub fn system_info(&self) -> Option<Arc<serde_json::Value>> {
        self.system_info.borrow().clone()
    }

    pub fn uptime_seconds(&self) -> u64 {
        *self.uptime_seconds.borrow()
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// User-visible error message, if one is recorded.
    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    // ── Derived views ────────────────────────────────────────────────

    pub fn zpools(&self) -> Vec<serde_json::Value> {
        self.inventory
            .borrow()
            .as_ref()
            .map(|inv| inv.zpools.clone())
            .unwrap_or_default()
    }

    pub fn system_devices(&self) -> SystemDevices {
        self.inventory
            .borrow()
            .as_ref()
            .map(|inv| inv.system_devices.clone())
            .unwrap_or_default()
    }

    pub fn cpu(&self) -> Option<serde_json::Value> {
        self.system_device(|d| d.cpu.clone())
    }

    pub fn ram(&self) -> Option<serde_json::Value> {
        self.system_device(|d| d.ram.clone())
    }

    pub fn network(&self) -> Option<serde_json::Value> {
        self.system_device(|d| d.network.clone())
    }

    /// Disks outside any multi-disk pool.
    pub fn standalone_storage(&self) -> Vec<serde_json::Value> {
        self.system_device(|d| Some(d.storage.clone()))
            .unwrap_or_default()
    }

    pub fn update_intervals(&self) -> HashMap<String, u64> {
        self.config
            .borrow()
            .as_ref()
            .map(|cfg| cfg.update_intervals.clone())
            .unwrap_or_default()
    }

    pub fn smart_status_levels(&self) -> HashMap<String, String> {
        self.config
            .borrow()
            .as_ref()
            .map(|cfg| cfg.smart_status_levels.clone())
            .unwrap_or_default()
    }

    /// Cached time series for one device (empty if never polled).
    pub fn device_metrics(&self, device_name: &str) -> Vec<MetricSample> {
        self.metrics
            .borrow()
            .get(device_name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn latest_value(&self, device_name: &str, label: &str) -> Option<f64> {
        self.latest
            .borrow()
            .get(device_name)
            .and_then(|labels| labels.get(label))
            .copied()
    }

    fn system_device<T>(&self, pick: impl FnOnce(&SystemDevices) -> Option<T>) -> Option<T> {
        self.inventory
            .borrow()
            .as_ref()
            .and_then(|inv| pick(&inv.system_devices))
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_inventory(&self) -> StateStream<Option<Arc<Inventory>>> {
        StateStream::new(self.inventory.subscribe())
    }

    pub fn subscribe_metrics(&self) -> StateStream<Arc<MetricsByDevice>> {
        StateStream::new(self.metrics.subscribe())
    }

    pub fn subscribe_latest_values(&self) -> StateStream<Arc<LatestValues>> {
        StateStream::new(self.latest.subscribe())
    }

    pub fn subscribe_connected(&self) -> StateStream<bool> {
        StateStream::new(self.connected.subscribe())
    }

    pub fn subscribe_error(&self) -> StateStream<Option<String>> {
        StateStream::new(self.error.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_inventory(&self) -> Option<DateTime<Utc>> {
        *self.last_inventory.borrow()
    }

    // ── Writers ──────────────────────────────────────────────────────

    /// Subscribers wake only on transitions.
    pub(crate) fn set_connected(&self, connected: bool) {
        self.connected.send_if_modified(|c| {
            let changed = *c != connected;
            *c = connected;
            changed
        });
    }

    pub(crate) fn set_error(&self, error: Option<String>) {
        self.error.send_replace(error);
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.loading.send_replace(loading);
    }

    pub(crate) fn apply_inventory(&self, inventory: Inventory) {
        if let Some(uptime) = inventory.uptime_seconds.filter(|u| *u > 0) {
            self.uptime_seconds.send_replace(uptime);
        }
        self.inventory.send_replace(Some(Arc::new(inventory)));
        self.last_inventory.send_replace(Some(Utc::now()));
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
