#![allow(clippy::unwrap_used)]
// Integration tests for `LegacyClient` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unimqtt_api::{
    ControllerPlatform, Error, EventStream, LegacyClient, ReconnectConfig, SessionCredentials,
    StreamMessage, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, LegacyClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = LegacyClient::with_client(
        reqwest::Client::new(),
        base_url,
        "default".into(),
        ControllerPlatform::ClassicController,
    );
    (server, client)
}

fn site_path(suffix: &str) -> String {
    format!("/api/s/default/{suffix}")
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_session_cookie() {
    let server = MockServer::start().await;
    let client = LegacyClient::new(
        Url::parse(&server.uri()).unwrap(),
        "default".into(),
        ControllerPlatform::ClassicController,
        &TransportConfig::default(),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "username": "admin", "password": "pw" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "unifises=session123; Path=/")
                .set_body_json(json!({ "meta": { "rc": "ok" }, "data": [] })),
        )
        .mount(&server)
        .await;

    assert!(client.cookie_header().is_none());

    let secret: secrecy::SecretString = "pw".to_string().into();
    client.login("admin", &secret).await.unwrap();

    assert_eq!(client.cookie_header().as_deref(), Some("unifises=session123"));
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("api.err.Invalid"))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong-password".to_string().into();
    let result = client.login("admin", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unifi_os_login_path_and_csrf() {
    let server = MockServer::start().await;
    let client = LegacyClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        "default".into(),
        ControllerPlatform::UnifiOs,
    );

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-CSRF-Token", "tok-1"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/proxy/network/api/s/default/upd/wlanconf/w1"))
        .and(header("X-CSRF-Token", "tok-1"))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "pw".to_string().into();
    client.login("admin", &secret).await.unwrap();
    client.set_wlan_enabled("w1", true).await.unwrap();
}

// ── Inventory tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_list_wlans() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("rest/wlanconf")))
        .respond_with(ok(json!([
            { "_id": "w1", "name": "home", "enabled": true, "security": "wpapsk" },
            { "_id": "w2", "name": "guest", "enabled": false, "is_guest": true }
        ])))
        .mount(&server)
        .await;

    let wlans = client.list_wlans().await.unwrap();
    assert_eq!(wlans.len(), 2);
    assert_eq!(wlans[0].id, "w1");
    assert_eq!(wlans[0].name, "home");
    assert!(wlans[0].enabled);
    assert_eq!(wlans[1].is_guest, Some(true));
}

#[tokio::test]
async fn test_list_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("stat/device")))
        .respond_with(ok(json!([{
            "_id": "abc123",
            "mac": "aa:bb:cc:dd:ee:ff",
            "type": "uap",
            "name": "Office-AP",
            "model": "U7PG2",
            "led_override": "default",
            "adopted": true,
            "state": 1
        }])))
        .mount(&server)
        .await;

    let devices = client.list_devices().await.unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "abc123");
    assert_eq!(devices[0].name.as_deref(), Some("Office-AP"));
    assert_eq!(devices[0].led_override.as_deref(), Some("default"));
    assert_eq!(devices[0].device_type.as_deref(), Some("uap"));
}

#[tokio::test]
async fn test_list_clients() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("stat/sta")))
        .respond_with(ok(json!([
            { "mac": "11:22:33:44:55:66", "hostname": "laptop1", "essid": "home", "assoc_time": 1_700_000_000 },
            { "mac": "66:55:44:33:22:11", "name": "nas", "is_wired": true }
        ])))
        .mount(&server)
        .await;

    let clients = client.list_clients().await.unwrap();
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].essid.as_deref(), Some("home"));
    assert_eq!(clients[0].assoc_time, Some(1_700_000_000));
    assert!(clients[1].essid.is_none());
}

// ── Mutation tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_set_led_override() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(site_path("rest/device/abc123")))
        .and(body_json(json!({ "led_override": "off" })))
        .respond_with(ok(json!([{ "_id": "abc123", "led_override": "off" }])))
        .expect(1)
        .mount(&server)
        .await;

    client.set_led_override("abc123", "off").await.unwrap();
}

#[tokio::test]
async fn test_set_wlan_enabled() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(site_path("upd/wlanconf/w2")))
        .and(body_json(json!({ "enabled": false })))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.set_wlan_enabled("w2", false).await.unwrap();
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_session_expired() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path(site_path("stat/device")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_devices().await;
    let err = result.unwrap_err();
    assert!(
        matches!(err, Error::Authentication { .. }),
        "expected Authentication error, got: {err:?}"
    );
    assert!(err.is_auth_expired());
}

#[tokio::test]
async fn test_legacy_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path(site_path("rest/device/missing")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": { "rc": "error", "msg": "api.err.IdInvalid" },
            "data": []
        })))
        .mount(&server)
        .await;

    let result = client.set_led_override("missing", "on").await;
    match result {
        Err(Error::LegacyApi { message }) => assert_eq!(message, "api.err.IdInvalid"),
        other => panic!("expected LegacyApi error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_detect_classic_controller() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;

    let base = Url::parse(&server.uri()).unwrap();
    let platform = LegacyClient::detect_platform(&base, &TransportConfig::default())
        .await
        .unwrap();
    assert_eq!(platform, ControllerPlatform::ClassicController);
}

// ── Event stream tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_event_stream_keeps_retrying_failed_logins() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("api.err.Invalid"))
        .mount(&server)
        .await;

    let (tx, mut rx) = mpsc::channel::<StreamMessage>(8);
    let stream = EventStream::spawn(
        Arc::new(client),
        SessionCredentials {
            username: "admin".into(),
            password: "pw".to_string().into(),
        },
        &TransportConfig::default(),
        ReconnectConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        },
        CancellationToken::new(),
        tx,
    )
    .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    stream.shutdown();

    let logins = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/login")
        .count();
    assert!(logins >= 10, "expected repeated login attempts, got {logins}");
    assert!(rx.try_recv().is_err(), "stream never came online");
}
