// NAS Monitor HTTP client
//
// Wraps `reqwest::Client` with base-URL path construction and response
// decoding. Stateless between calls: nothing here caches, retries, or
// tracks connectivity.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{
    ActionAck, DeviceRecord, DeviceType, DeviceUpdate, Envelope, FrontendConfig, Inventory,
    LatestValues, MetricSample, MetricsQuery,
};
use crate::transport::TransportConfig;

/// Raw HTTP client for the NAS Monitor backend.
///
/// Every method issues exactly one request against `{base_url}/api/...` and
/// returns the decoded JSON body. Non-2xx statuses and network failures
/// both surface as [`Error`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root, e.g. `http://nas.local:8000`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /api/inventory`
    pub async fn get_inventory(&self) -> Result<Envelope<Inventory>, Error> {
        let url = self.api_url(&["inventory"])?;
        self.get(url, &[]).await
    }

    /// `GET /api/config`
    pub async fn get_config(&self) -> Result<Envelope<FrontendConfig>, Error> {
        let url = self.api_url(&["config"])?;
        self.get(url, &[]).await
    }

    /// `GET /api/metrics?history_type=..&device_types=..&device_names=..&hours=..`
    pub async fn get_metrics(
        &self,
        query: &MetricsQuery,
    ) -> Result<Envelope<Vec<MetricSample>>, Error> {
        let url = self.api_url(&["metrics"])?;
        self.get(url, &query.query_pairs()).await
    }

    /// `GET /api/latest?device_types=..`
    ///
    /// `None` asks for every device type.
    pub async fn get_latest(
        &self,
        device_types: Option<&[DeviceType]>,
    ) -> Result<Envelope<LatestValues>, Error> {
        let url = self.api_url(&["latest"])?;
        let pairs: Vec<(&str, String)> = device_types
            .unwrap_or_default()
            .iter()
            .map(|t| ("device_types", t.to_string()))
            .collect();
        self.get(url, &pairs).await
    }

    /// `GET /api/devices`
    pub async fn list_devices(&self) -> Result<Envelope<Vec<DeviceRecord>>, Error> {
        let url = self.api_url(&["devices"])?;
        self.get(url, &[]).await
    }

    /// `PATCH /api/devices/{name}`
    ///
    /// Returns loosely-typed JSON: the backend echoes only the fields it
    /// touched.
    pub async fn update_device(
        &self,
        name: &str,
        payload: &DeviceUpdate,
    ) -> Result<Envelope<serde_json::Value>, Error> {
        let url = self.api_url(&["devices", name])?;
        debug!(name, ?payload, "updating device");
        self.send(self.http.patch(url).json(payload)).await
    }

    /// `GET /api/system/info`
    ///
    /// Returns loosely-typed JSON because the field set depends on the host.
    pub async fn get_system_info(&self) -> Result<Envelope<serde_json::Value>, Error> {
        let url = self.api_url(&["system", "info"])?;
        self.get(url, &[]).await
    }

    /// `POST /api/host/restart`
    pub async fn restart_host(&self) -> Result<ActionAck, Error> {
        let url = self.api_url(&["host", "restart"])?;
        debug!("restarting host");
        self.send(self.http.post(url)).await
    }

    /// `POST /api/host/poweroff`
    pub async fn poweroff_host(&self) -> Result<ActionAck, Error> {
        let url = self.api_url(&["host", "poweroff"])?;
        debug!("powering off host");
        self.send(self.http.post(url)).await
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/api/{segments..}`, percent-encoding each segment.
    fn api_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        self.send(self.http.get(url).query(query)).await
    }

    /// Send a request and decode the JSON body.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let req = builder.build().map_err(Error::Transport)?;
        debug!("{} {}", req.method(), req.url());

        let resp = self.http.execute(req).await.map_err(Error::Transport)?;
        Self::parse_response(resp).await
    }

    async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: preview(&body).to_owned(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }
}

/// First 200 bytes of a body, cut on a char boundary.
fn preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
