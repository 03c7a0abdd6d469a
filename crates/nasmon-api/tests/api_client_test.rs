#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nasmon_api::{ApiClient, DeviceType, DeviceUpdate, Error, HistoryType, MetricsQuery};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Inventory / config ──────────────────────────────────────────────

#[tokio::test]
async fn test_get_inventory() {
    let (server, client) = setup().await;

    let body = json!({
        "status": "success",
        "data": {
            "zpools": [{ "name": "tank", "disks": ["sda", "sdb"] }],
            "system_devices": {
                "cpu": { "name": "cpu0", "model": "Ryzen 5" },
                "ram": { "name": "ram", "total": 34359738368_u64 },
                "network": { "name": "eth0" },
                "storage": [{ "name": "nvme0n1" }]
            },
            "uptime_seconds": 86400,
            "hostname": "nas"
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let inv = client.get_inventory().await.unwrap();

    assert!(inv.is_success());
    assert_eq!(inv.data.zpools.len(), 1);
    assert_eq!(inv.data.uptime_seconds, Some(86400));
    assert_eq!(inv.data.system_devices.storage.len(), 1);
    assert_eq!(
        inv.data.system_devices.cpu.as_ref().unwrap()["model"],
        json!("Ryzen 5")
    );
    assert_eq!(inv.data.extra["hostname"], json!("nas"));
}

#[tokio::test]
async fn test_get_config() {
    let (server, client) = setup().await;

    let body = json!({
        "status": "success",
        "data": {
            "update_intervals": { "cpu": 5, "ram": 5, "network": 3, "storage": 60, "zfs_pool": 60 },
            "smart_status_levels": { "0": "OK", "1": "Warning", "2": "Critical", "3": "Failed" },
            "chart_history_points": 40,
            "raw_metrics_hours": 1
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let cfg = client.get_config().await.unwrap().data;

    assert_eq!(cfg.interval_secs(DeviceType::Network), Some(3));
    assert_eq!(cfg.interval_secs(DeviceType::ZfsPool), Some(60));
    assert_eq!(cfg.smart_status_levels["2"], "Critical");
    assert_eq!(cfg.raw_metrics_hours, Some(1));
}

// ── Metrics ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_metrics_repeats_list_params() {
    let (server, client) = setup().await;

    let body = json!({
        "status": "success",
        "count": 2,
        "data": [
            { "id": 1, "device_name": "cpu0", "device_type": "cpu", "label": "usage",
              "timestamp": "2025-03-01T10:00:00", "value": 12.0 },
            { "id": 2, "device_name": "ram", "device_type": "ram", "label": "used",
              "timestamp": "2025-03-01T10:00:00+00:00", "value": 55.5 }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .and(query_param("history_type", "raw"))
        .and(query_param("device_types", "cpu"))
        .and(query_param("device_types", "ram"))
        .and(query_param("hours", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let query = MetricsQuery::raw(1).with_device_types(&[DeviceType::Cpu, DeviceType::Ram]);
    let samples = client.get_metrics(&query).await.unwrap().data;

    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].device_name, "cpu0");
    assert_eq!(samples[1].value, 55.5);

    let requests = server.received_requests().await.unwrap();
    let raw_query = requests[0].url.query().unwrap();
    assert_eq!(
        raw_query,
        "history_type=raw&device_types=cpu&device_types=ram&hours=1"
    );
}

#[tokio::test]
async fn test_get_metrics_daily_omits_hours() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/metrics"))
        .and(query_param("history_type", "daily"))
        .and(query_param("device_names", "sda"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "success", "data": [] })),
        )
        .mount(&server)
        .await;

    let query = MetricsQuery {
        history_type: HistoryType::Daily,
        hours: Some(24),
        ..MetricsQuery::default()
    }
    .with_device_name("sda");
    let samples = client.get_metrics(&query).await.unwrap().data;
    assert!(samples.is_empty());

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap().contains("hours"));
}

#[tokio::test]
async fn test_get_latest_filtered() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/latest"))
        .and(query_param("device_types", "zfs_pool"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "tank": { "health": 0.0, "used_pct": 41.2 } }
        })))
        .mount(&server)
        .await;

    let latest = client
        .get_latest(Some(&[DeviceType::ZfsPool]))
        .await
        .unwrap()
        .data;
    assert_eq!(latest["tank"]["used_pct"], 41.2);
}

#[tokio::test]
async fn test_get_latest_unfiltered_sends_no_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/latest"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "status": "success", "data": {} })),
        )
        .mount(&server)
        .await;

    client.get_latest(None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": [
                { "name": "cpu0", "type": "cpu", "enabled": true, "details": {} },
                { "name": "sda", "type": "storage", "enabled": false, "details": { "model": "WD" } }
            ]
        })))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap().data;

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[1].device_type, "storage");
    assert!(!devices[1].enabled);
}

#[tokio::test]
async fn test_update_device_sends_json_patch() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/devices/disk1"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "enabled": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "name": "disk1", "enabled": false }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client
        .update_device("disk1", &DeviceUpdate::enabled(false))
        .await
        .unwrap();
    assert_eq!(resp.data["enabled"], json!(false));
}

#[tokio::test]
async fn test_update_device_encodes_name() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/devices/pool%2Fdata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "name": "pool/data", "enabled": true }
        })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_device("pool/data", &DeviceUpdate::enabled(true))
        .await
        .unwrap();
}

// ── System / host ───────────────────────────────────────────────────

#[tokio::test]
async fn test_host_actions() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/host/restart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success", "message": "Reboot triggered"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/host/poweroff"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success", "message": "Poweroff triggered"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client.restart_host().await.unwrap();
    assert!(ack.is_success());
    assert_eq!(ack.message.as_deref(), Some("Reboot triggered"));

    let ack = client.poweroff_host().await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Poweroff triggered"));
}

#[tokio::test]
async fn test_get_system_info() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/system/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "hostname": "nas", "kernel": "6.6.0" }
        })))
        .mount(&server)
        .await;

    let info = client.get_system_info().await.unwrap().data;
    assert_eq!(info["kernel"], json!("6.6.0"));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_success_status_is_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/host/restart"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "detail": "Failed to reboot" })),
        )
        .mount(&server)
        .await;

    let result = client.restart_host().await;

    match result {
        Err(Error::Http {
            status,
            ref message,
        }) => {
            assert_eq!(status, 500);
            assert!(message.contains("Failed to reboot"), "got: {message}");
        }
        other => panic!("expected Http error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Device not found"))
        .mount(&server)
        .await;

    let err = client
        .update_device("ghost", &DeviceUpdate::enabled(true))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let result = client.get_inventory().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind and drop a listener so the port is closed.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let base_url = Url::parse(&format!("http://127.0.0.1:{port}")).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);

    let err = client.get_inventory().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(err.is_transient());
}

// ── Transport ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_transport_sends_json_accept_and_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/system/info"))
        .and(header("accept", "application/json"))
        .and(header("user-agent", "nasmon-test/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "hostname": "nas" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = nasmon_api::TransportConfig {
        user_agent: "nasmon-test/1".into(),
        ..nasmon_api::TransportConfig::default()
    };
    let client = ApiClient::new(Url::parse(&server.uri()).unwrap(), &transport).unwrap();

    let info = client.get_system_info().await.unwrap();
    assert_eq!(info.data["hostname"], json!("nas"));
}
