// ── Backend seam ──
//
// The store talks to the network only through `NasBackend`. `ApiClient`
// is the production implementation; tests plug in an in-memory one.

use std::future::Future;

use nasmon_api::{
    ActionAck, ApiClient, DeviceRecord, DeviceType, DeviceUpdate, Envelope, Error, FrontendConfig,
    Inventory, LatestValues, MetricSample, MetricsQuery, TlsMode, TransportConfig,
};

use crate::config::{StoreConfig, TlsVerification};
use crate::error::CoreError;

/// One async method per backend operation. Implementations hold no
/// cross-call state the store relies on.
pub trait NasBackend: Send + Sync + 'static {
    fn get_inventory(&self) -> impl Future<Output = Result<Envelope<Inventory>, Error>> + Send;

    fn get_config(&self) -> impl Future<Output = Result<Envelope<FrontendConfig>, Error>> + Send;

    fn get_metrics(
        &self,
        query: &MetricsQuery,
    ) -> impl Future<Output = Result<Envelope<Vec<MetricSample>>, Error>> + Send;

    fn get_latest(
        &self,
        device_types: Option<&[DeviceType]>,
    ) -> impl Future<Output = Result<Envelope<LatestValues>, Error>> + Send;

    fn list_devices(
        &self,
    ) -> impl Future<Output = Result<Envelope<Vec<DeviceRecord>>, Error>> + Send;

    fn update_device(
        &self,
        name: &str,
        payload: &DeviceUpdate,
    ) -> impl Future<Output = Result<Envelope<serde_json::Value>, Error>> + Send;

    fn get_system_info(
        &self,
    ) -> impl Future<Output = Result<Envelope<serde_json::Value>, Error>> + Send;

    fn restart_host(&self) -> impl Future<Output = Result<ActionAck, Error>> + Send;

    fn poweroff_host(&self) -> impl Future<Output = Result<ActionAck, Error>> + Send;
}

impl NasBackend for ApiClient {
    async fn get_inventory(&self) -> Result<Envelope<Inventory>, Error> {
        ApiClient::get_inventory(self).await
    }

    async fn get_config(&self) -> Result<Envelope<FrontendConfig>, Error> {
        ApiClient::get_config(self).await
    }

    async fn get_metrics(&self, query: &MetricsQuery) -> Result<Envelope<Vec<MetricSample>>, Error> {
        ApiClient::get_metrics(self, query).await
    }

    async fn get_latest(
        &self,
        device_types: Option<&[DeviceType]>,
    ) -> Result<Envelope<LatestValues>, Error> {
        ApiClient::get_latest(self, device_types).await
    }

    async fn list_devices(&self) -> Result<Envelope<Vec<DeviceRecord>>, Error> {
        ApiClient::list_devices(self).await
    }

    async fn update_device(
        &self,
        name: &str,
        payload: &DeviceUpdate,
    ) -> Result<Envelope<serde_json::Value>, Error> {
        ApiClient::update_device(self, name, payload).await
    }

    async fn get_system_info(&self) -> Result<Envelope<serde_json::Value>, Error> {
        ApiClient::get_system_info(self).await
    }

    async fn restart_host(&self) -> Result<ActionAck, Error> {
        ApiClient::restart_host(self).await
    }

    async fn poweroff_host(&self) -> Result<ActionAck, Error> {
        ApiClient::poweroff_host(self).await
    }
}

/// Build the production HTTP backend from a store configuration.
pub fn build_api_client(config: &StoreConfig) -> Result<ApiClient, CoreError> {
    let transport = TransportConfig {
        tls: tls_to_transport(&config.tls),
        ..TransportConfig::default()
    }
    .with_timeout(config.timeout);
    Ok(ApiClient::new(config.api_base.clone(), &transport)?)
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
