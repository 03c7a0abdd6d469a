// ── Device store ──
//
// Lifecycle management for the dashboard's view of one NAS backend.
// Owns the reactive caches, one recurring poll task per device type,
// and the reconnection probe that recovers from backend outages.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::TimeDelta;
use dashmap::DashMap;
use nasmon_api::{ActionAck, ApiClient, DeviceType, DeviceUpdate, HistoryType, MetricsQuery};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::backend::{NasBackend, build_api_client};
use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::store::{DataStore, group_by_device, merge_latest, merge_metrics};

/// Message recorded when the inventory can't be fetched.
pub const CONNECT_ERROR: &str = "Failed to connect to server";

// ── ConnectionState ──────────────────────────────────────────────

/// Connectivity as seen by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No inventory load has completed yet.
    Initializing,
    /// Last inventory load succeeded.
    ///
    /// Polling is normally active, but not guaranteed: when connectivity is
    /// restored by a call other than the reconnection probe (e.g.
    /// [`update_latest_values`](DeviceStore::update_latest_values) or
    /// [`load_inventory`](DeviceStore::load_inventory)), the probe stops
    /// without restarting the pollers. Check
    /// [`active_pollers`](DeviceStore::active_pollers) or call
    /// [`initialize`](DeviceStore::initialize) to resume.
    Connected,
    /// Polling suspended; the reconnection probe is (or was) running.
    DisconnectedProbing,
}

/// A running background task and the token that stops it.
struct TaskHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

// ── DeviceStore ──────────────────────────────────────────────────

/// The only stateful component between the UI and the backend.
///
/// Cheaply cloneable via `Arc<StoreInner>`. Lifecycle is explicit:
/// [`new`](DeviceStore::new) → [`initialize`](Self::initialize) →
/// [`dispose`](Self::dispose). Background work is spawned on the ambient
/// Tokio runtime, so polling methods must be called from within one.
pub struct DeviceStore<B: NasBackend = ApiClient> {
    inner: Arc<StoreInner<B>>,
}

impl<B: NasBackend> Clone for DeviceStore<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct StoreInner<B> {
    config: StoreConfig,
    backend: B,
    data: Arc<DataStore>,
    /// Root token; cancelled once on dispose. Every task runs on a child.
    cancel: CancellationToken,
    /// At most one poll task per device type.
    pollers: DashMap<DeviceType, TaskHandle>,
    probe: Mutex<Option<TaskHandle>>,
}

impl DeviceStore<ApiClient> {
    /// Create a store backed by the HTTP API. Does NOT contact the
    /// backend -- call [`initialize()`](Self::initialize).
    pub fn new(config: StoreConfig) -> Result<Self, CoreError> {
        let backend = build_api_client(&config)?;
        Ok(Self::with_backend(backend, config))
    }
}

impl<B: NasBackend> DeviceStore<B> {
    pub fn with_backend(backend: B, config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                config,
                backend,
                data: Arc::new(DataStore::new()),
                cancel: CancellationToken::new(),
                pollers: DashMap::new(),
                probe: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Access the cached state and its derived views.
    pub fn data(&self) -> &Arc<DataStore> {
        &self.inner.data
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn connection_state(&self) -> ConnectionState {
        let data = &self.inner.data;
        if !*data.inventory_loaded.borrow() {
            ConnectionState::Initializing
        } else if data.is_connected() {
            ConnectionState::Connected
        } else {
            ConnectionState::DisconnectedProbing
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Load inventory and config, then start polling every device type.
    ///
    /// Polling is skipped when the inventory load took the store offline;
    /// the reconnection probe re-runs this on recovery.
    pub async fn initialize(&self) {
        self.load_inventory().await;
        self.load_config().await;
        if self.inner.data.is_connected() {
            self.start_all_polling();
        } else {
            debug!("backend unreachable, polling deferred to reconnection");
        }
    }

    /// Stop every poller and the probe, and wait for their tasks to exit.
    ///
    /// Terminal: a disposed store never schedules new work.
    pub async fn dispose(&self) {
        self.inner.cancel.cancel();

        let mut handles = Vec::new();
        if let Some(probe) = self.lock_probe().take() {
            handles.push(probe);
        }
        let types: Vec<DeviceType> = self.inner.pollers.iter().map(|e| *e.key()).collect();
        for device_type in types {
            if let Some((_, handle)) = self.inner.pollers.remove(&device_type) {
                handles.push(handle);
            }
        }

        for handle in handles {
            handle.cancel.cancel();
            let _ = handle.task.await;
        }
        debug!("device store disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    // ── Loads ────────────────────────────────────────────────────

    /// Replace the inventory snapshot.
    ///
    /// On failure the store goes offline: connectivity drops, the error
    /// is recorded, polling stops and the reconnection probe starts.
    pub async fn load_inventory(&self) {
        let data = &self.inner.data;
        data.set_loading(true);
        data.set_error(None);

        match self.inner.backend.get_inventory().await {
            Ok(resp) => {
                data.apply_inventory(resp.data);
                data.set_connected(true);
            }
            Err(e) => {
                error!(error = %e, "failed to load inventory");
                data.set_connected(false);
                data.set_error(Some(CONNECT_ERROR.into()));
                self.start_reconnection_loop();
            }
        }

        data.inventory_loaded.send_replace(true);
        data.set_loading(false);
    }

    /// Fetch the frontend configuration. Failure records an error but
    /// leaves connectivity and polling alone.
    pub async fn load_config(&self) {
        match self.inner.backend.get_config().await {
            Ok(resp) => {
                self.inner.data.config.send_replace(Some(Arc::new(resp.data)));
            }
            Err(e) => {
                error!(error = %e, "failed to load config");
                self.inner.data.set_error(Some(e.to_string()));
            }
        }
    }

    /// Merge raw samples for `device_types` (all when `None`) over the
    /// trailing `hours` window into the per-device metric cache. Cached
    /// samples that fall out of the window are dropped.
    ///
    /// `hours` defaults to [`metrics_window_hours`](Self::metrics_window_hours).
    pub async fn update_metrics(&self, device_types: Option<&[DeviceType]>, hours: Option<u32>) {
        let hours = hours.unwrap_or_else(|| self.metrics_window_hours());
        let query = MetricsQuery::raw(hours).with_device_types(device_types.unwrap_or_default());

        match self.inner.backend.get_metrics(&query).await {
            Ok(resp) => {
                let grouped = group_by_device(resp.data);
                let window = TimeDelta::hours(i64::from(hours));
                self.inner
                    .data
                    .metrics
                    .send_modify(|cached| merge_metrics(Arc::make_mut(cached), grouped, window));
            }
            Err(e) => error!(error = %e, "failed to update metrics"),
        }
    }

    /// Overwrite latest values for the devices in the response.
    ///
    /// No-op while disconnected. Failure takes the store offline.
    pub async fn update_latest_values(&self, device_types: Option<&[DeviceType]>) {
        let data = &self.inner.data;
        if !data.is_connected() {
            return;
        }

        match self.inner.backend.get_latest(device_types).await {
            Ok(resp) => {
                data.latest
                    .send_modify(|cached| merge_latest(Arc::make_mut(cached), resp.data));
                data.set_connected(true);
            }
            Err(e) => {
                error!(error = %e, "failed to update latest values");
                data.set_connected(false);
                self.start_reconnection_loop();
            }
        }
    }

    /// Replace the drill-down cache with one device's series.
    ///
    /// `hours` only applies to raw granularity and defaults to
    /// `StoreConfig::detail_window_hours`.
    pub async fn fetch_detail_metrics(
        &self,
        device_name: &str,
        history_type: HistoryType,
        hours: Option<u32>,
    ) {
        let data = &self.inner.data;
        data.set_loading(true);

        let query = MetricsQuery {
            history_type,
            hours: (history_type == HistoryType::Raw)
                .then(|| hours.unwrap_or(self.inner.config.detail_window_hours)),
            ..MetricsQuery::default()
        }
        .with_device_name(device_name);

        match self.inner.backend.get_metrics(&query).await {
            Ok(resp) => {
                data.detail_metrics.send_replace(Arc::new(resp.data));
            }
            Err(e) => error!(device_name, error = %e, "failed to fetch detail metrics"),
        }

        data.set_loading(false);
    }

    /// Replace the device registry cache.
    pub async fn fetch_all_devices(&self) {
        match self.inner.backend.list_devices().await {
            Ok(resp) => {
                self.inner.data.devices.send_replace(Arc::new(resp.data));
            }
            Err(e) => error!(error = %e, "failed to fetch all devices"),
        }
    }

    /// Enable or disable a device, then reload the inventory so the
    /// dashboard reflects it. Failures are logged, not returned.
    pub async fn update_device_status(&self, name: &str, enabled: bool) {
        match self
            .inner
            .backend
            .update_device(name, &DeviceUpdate::enabled(enabled))
            .await
        {
            Ok(_) => self.load_inventory().await,
            Err(e) => error!(name, enabled, error = %e, "failed to update device status"),
        }
    }

    /// Replace the detailed host info cache.
    pub async fn fetch_system_info(&self) {
        match self.inner.backend.get_system_info().await {
            Ok(resp) => {
                self.inner.data.system_info.send_replace(Some(Arc::new(resp.data)));
            }
            Err(e) => error!(error = %e, "failed to fetch system info"),
        }
    }

    // ── Host actions ─────────────────────────────────────────────

    /// Trigger a host reboot. Errors are logged and returned.
    pub async fn reboot_host(&self) -> Result<(), CoreError> {
        let result = self.inner.backend.restart_host().await;
        host_action("reboot", result)
    }

    /// Trigger a host power-off. Errors are logged and returned.
    pub async fn shutdown_host(&self) -> Result<(), CoreError> {
        let result = self.inner.backend.poweroff_host().await;
        host_action("shutdown", result)
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Window used by the pollers: the backend's `raw_metrics_hours`
    /// when configured, else the store default.
    pub fn metrics_window_hours(&self) -> u32 {
        self.inner
            .data
            .config()
            .and_then(|cfg| cfg.raw_metrics_hours)
            .filter(|h| *h > 0)
            .unwrap_or(self.inner.config.metrics_window_hours)
    }

    /// Start (or restart) the recurring poll for one device type.
    ///
    /// Requires the config to be loaded and to carry an interval for the
    /// type; otherwise logs a warning and does nothing. The first fetch runs
    /// immediately, under the same cancellation as the recurring ticks.
    pub fn start_polling(&self, device_type: DeviceType) {
        if self.is_disposed() {
            debug!(%device_type, "store disposed, not polling");
            return;
        }
        let Some(config) = self.inner.data.config() else {
            warn!("config not loaded, cannot start polling");
            return;
        };
        let Some(secs) = config.interval_secs(device_type) else {
            warn!(%device_type, "no interval configured for device type");
            return;
        };

        let cancel = self.inner.cancel.child_token();
        let task = tokio::spawn(poll_task(
            self.clone(),
            device_type,
            Duration::from_secs(secs),
            cancel.clone(),
        ));
        if let Some(previous) = self
            .inner
            .pollers
            .insert(device_type, TaskHandle { cancel, task })
        {
            previous.cancel.cancel();
        }
        debug!(%device_type, interval_secs = secs, "polling started");
    }

    pub fn start_all_polling(&self) {
        for device_type in DeviceType::ALL {
            self.start_polling(device_type);
        }
    }

    pub fn stop_polling(&self, device_type: DeviceType) {
        if let Some((_, handle)) = self.inner.pollers.remove(&device_type) {
            handle.cancel.cancel();
            debug!(%device_type, "polling stopped");
        }
    }

    pub fn stop_all_polling(&self) {
        self.inner.pollers.retain(|device_type, handle| {
            handle.cancel.cancel();
            debug!(%device_type, "polling stopped");
            false
        });
    }

    /// Device types with an active poll task, in polling order.
    pub fn active_pollers(&self) -> Vec<DeviceType> {
        let mut types: Vec<DeviceType> = self.inner.pollers.iter().map(|e| *e.key()).collect();
        types.sort();
        types
    }

    /// One poll tick: metrics first, then latest values.
    async fn poll_once(&self, device_type: DeviceType) {
        let types = std::slice::from_ref(&device_type);
        self.update_metrics(Some(types), None).await;
        self.update_latest_values(Some(types)).await;
    }

    // ── Reconnection ─────────────────────────────────────────────

    /// `true` while the reconnection probe is scheduled.
    pub fn is_probing(&self) -> bool {
        self.lock_probe().is_some()
    }

    /// Suspend polling and start the fixed-interval probe, unless one is
    /// already running.
    fn start_reconnection_loop(&self) {
        self.stop_all_polling();
        if self.is_disposed() {
            return;
        }

        let mut slot = self.lock_probe();
        if slot.is_some() {
            return;
        }

        info!(
            interval = ?self.inner.config.reconnect_interval,
            "starting reconnection loop"
        );
        let cancel = self.inner.cancel.child_token();
        let task = tokio::spawn(probe_task(
            self.clone(),
            self.inner.config.reconnect_interval,
            cancel.clone(),
        ));
        *slot = Some(TaskHandle { cancel, task });
    }

    fn stop_reconnection_loop(&self) {
        if let Some(probe) = self.lock_probe().take() {
            probe.cancel.cancel();
        }
    }

    fn lock_probe(&self) -> std::sync::MutexGuard<'_, Option<TaskHandle>> {
        self.inner
            .probe
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn host_action(action: &str, result: Result<ActionAck, nasmon_api::Error>) -> Result<(), CoreError> {
    match result {
        Ok(ack) if ack.is_success() => {
            info!(action, message = ack.message.as_deref().unwrap_or(""), "host action triggered");
            Ok(())
        }
        Ok(ack) => {
            let message = ack.message.unwrap_or_else(|| format!("status={}", ack.status));
            error!(action, %message, "host action rejected");
            Err(CoreError::Rejected { message })
        }
        Err(e) => {
            error!(action, error = %e, "host action failed");
            Err(e.into())
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Recurring poll for one device type. The interval's first tick completes
/// at once, so the initial fetch happens without waiting a full period.
/// Cancellation stops future ticks; a tick already in flight runs to
/// completion.
async fn poll_task<B: NasBackend>(
    store: DeviceStore<B>,
    device_type: DeviceType,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                debug!(%device_type, "poll tick");
                store.poll_once(device_type).await;
            }
        }
    }
}

/// Fixed-interval reconnection probe.
///
/// Each tick asks for the inventory. A `"success"` answer tears the probe
/// down and re-runs full initialization. If connectivity was restored by
/// some other call in the meantime, the probe stops without
/// re-initializing.
async fn probe_task<B: NasBackend>(
    store: DeviceStore<B>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if store.inner.data.is_connected() {
                    debug!("connectivity already restored, stopping reconnection loop");
                    store.stop_reconnection_loop();
                    break;
                }

                match store.inner.backend.get_inventory().await {
                    Ok(resp) if resp.is_success() => {
                        info!("backend is back, performing full re-initialization");
                        store.stop_reconnection_loop();
                        store.inner.data.set_error(None);
                        store.initialize().await;
                        break;
                    }
                    Ok(resp) => debug!(status = %resp.status, "backend answered without success"),
                    Err(e) => debug!(error = %e, "backend still unreachable"),
                }
            }
        }
    }
}
