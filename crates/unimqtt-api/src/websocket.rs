//! Controller event stream with login and auto-reconnect.
//!
//! Logs into the controller, upgrades to the legacy events WebSocket using
//! the session cookie, and forwards every parsed event into an mpsc channel.
//! Each completed handshake is reported as [`StreamMessage::Connected`] and
//! each dropped connection as [`StreamMessage::Disconnected`], so consumers
//! can treat the stream as the controller's online/offline signal.
//!
//! # Example
//!
//! ```rust,ignore
//! use unimqtt_api::websocket::{EventStream, ReconnectConfig, StreamMessage};
//!
//! let (tx, mut rx) = tokio::sync::mpsc::channel::<StreamMessage>(64);
//! let stream = EventStream::spawn(client, credentials, &transport,
//!     ReconnectConfig::default(), cancel.clone(), tx)?;
//!
//! while let Some(msg) = rx.recv().await {
//!     println!("{msg:?}");
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_tungstenite::Connector;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::SessionCredentials;
use crate::error::Error;
use crate::legacy::LegacyClient;
use crate::transport::TransportConfig;

// ── UnifiEvent ───────────────────────────────────────────────────────

/// A parsed event from the UniFi WebSocket stream.
///
/// Uses `#[serde(flatten)]` to capture all fields beyond the core set,
/// so nothing from the controller is silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiEvent {
    /// Event key, e.g. `"EVT_WU_Connected"`, `"EVT_WU_Disconnected"`.
    pub key: String,

    /// Subsystem that emitted the event: `"wlan"`, `"lan"`, `"sta"`, etc.
    #[serde(default)]
    pub subsystem: String,

    /// Site ID this event belongs to.
    #[serde(default)]
    pub site_id: String,

    /// Human-readable event message, if present.
    #[serde(default, alias = "msg")]
    pub message: Option<String>,

    /// ISO-8601 timestamp from the controller.
    #[serde(default)]
    pub datetime: Option<String>,

    /// All remaining fields the controller sends (`user`, `ssid`,
    /// `hostname`, `time`, ...).
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl UnifiEvent {
    /// String field from the event payload.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(serde_json::Value::as_str)
    }

    /// Integer field from the event payload.
    pub fn field_i64(&self, name: &str) -> Option<i64> {
        self.extra.get(name).and_then(serde_json::Value::as_i64)
    }
}

// ── StreamMessage ────────────────────────────────────────────────────

/// What the event stream reports to its consumer.
#[derive(Debug, Clone)]
pub enum StreamMessage {
    /// Login and WebSocket handshake succeeded.
    Connected,
    /// The connection dropped; a reconnect is scheduled.
    Disconnected,
    /// A controller event.
    Event(Arc<UnifiEvent>),
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for reconnection. The stream never
/// gives up; it retries until cancelled.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

// ── EventStream ──────────────────────────────────────────────────────

/// Handle to the background login + WebSocket task.
pub struct EventStream {
    cancel: CancellationToken,
}

impl EventStream {
    /// Spawn the session loop. Returns once the task is running; the first
    /// login happens asynchronously.
    ///
    /// Messages are converted with `T::from` so the consumer can feed them
    /// straight into its own event channel.
    pub fn spawn<T>(
        client: Arc<LegacyClient>,
        credentials: SessionCredentials,
        transport: &TransportConfig,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
        events: mpsc::Sender<T>,
    ) -> Result<Self, Error>
    where
        T: From<StreamMessage> + Send + 'static,
    {
        let connector = transport.websocket_tls()?.map(Connector::Rustls);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            session_loop(
                client,
                credentials,
                connector,
                reconnect,
                task_cancel,
                events,
            )
            .await;
        });

        Ok(Self { cancel })
    }

    /// Signal the background task to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: login → connect → read → on drop, backoff → repeat.
async fn session_loop<T>(
    client: Arc<LegacyClient>,
    credentials: SessionCredentials,
    connector: Option<Connector>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
    events: mpsc::Sender<T>,
) where
    T: From<StreamMessage> + Send + 'static,
{
    let mut attempt: u32 = 0;

    loop {
        let mut online = false;

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = run_session(&client, &credentials, connector.clone(), &events, &cancel, &mut online) => result,
        };

        if online {
            // Had a live connection; start the backoff schedule from scratch.
            attempt = 0;
            if events.send(T::from(StreamMessage::Disconnected)).await.is_err() {
                break;
            }
        }

        match result {
            Ok(()) => tracing::info!("controller event stream closed, reconnecting"),
            Err(e) if e.is_auth_expired() => {
                tracing::error!(error = %e, attempt, "controller rejected the session");
            }
            Err(e) => tracing::warn!(error = %e, attempt, "controller event stream error"),
        }

        if cancel.is_cancelled() {
            break;
        }

        let delay = calculate_backoff(attempt, &reconnect);
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "waiting before reconnect"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        attempt = attempt.saturating_add(1);
    }

    tracing::debug!("controller event stream exiting");
}

// ── Single session lifecycle ─────────────────────────────────────────

/// Log in, upgrade to the WebSocket, and read frames until it drops.
///
/// Sets `online` once the handshake succeeds.
async fn run_session<T>(
    client: &LegacyClient,
    credentials: &SessionCredentials,
    connector: Option<Connector>,
    events: &mpsc::Sender<T>,
    cancel: &CancellationToken,
    online: &mut bool,
) -> Result<(), Error>
where
    T: From<StreamMessage> + Send + 'static,
{
    client
        .login(&credentials.username, &credentials.password)
        .await?;

    let url = client.websocket_url()?;
    let cookie = client.cookie_header().ok_or_else(|| Error::Authentication {
        message: "login did not set a session cookie".into(),
    })?;

    tracing::info!(url = %url, "connecting to controller WebSocket");
    let request = build_request(&url, &cookie)?;

    let (ws_stream, _response) =
        tokio_tungstenite::connect_async_tls_with_config(request, None, false, connector)
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!("controller WebSocket connected");
    *online = true;
    if events.send(T::from(StreamMessage::Connected)).await.is_err() {
        return Ok(());
    }

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        for event in parse_frame(&text) {
                            if events.send(T::from(StreamMessage::Event(Arc::new(event)))).await.is_err() {
                                return Ok(());
                            }
                        }
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "WebSocket close frame received");
                        } else {
                            tracing::info!("WebSocket close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
                    None => {
                        tracing::info!("WebSocket stream ended");
                        return Ok(());
                    }
                    // Ping/Pong/Binary/Frame: tungstenite answers pings itself.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

fn build_request(url: &Url, cookie: &str) -> Result<ClientRequestBuilder, Error> {
    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;
    Ok(ClientRequestBuilder::new(uri).with_header("Cookie", cookie))
}

// ── Message parsing ──────────────────────────────────────────────────

/// Raw envelope the controller sends over the WebSocket:
/// `{ "meta": { "rc": "ok", "message": "events" }, "data": [...] }`.
#[derive(Debug, Deserialize)]
struct WsEnvelope {
    meta: WsMeta,
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WsMeta {
    #[serde(default)]
    message: Option<String>,
}

/// Parse a WebSocket text frame into events.
///
/// Discrete events (`"events"` messages) carry their own `key`; sync
/// messages (`"sta:sync"`, ...) are surfaced with the message type as key.
fn parse_frame(text: &str) -> Vec<UnifiEvent> {
    let envelope: WsEnvelope = match serde_json::from_str(text) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse WebSocket envelope");
            return Vec::new();
        }
    };

    let msg_type = envelope.meta.message.as_deref().unwrap_or("");

    envelope
        .data
        .into_iter()
        .map(|data| match msg_type {
            "events" => serde_json::from_value::<UnifiEvent>(data.clone()).unwrap_or_else(|e| {
                tracing::debug!(error = %e, "could not deserialize event, using raw data");
                event_from_raw(msg_type, &data)
            }),
            _ => event_from_raw(msg_type, &data),
        })
        .collect()
}

/// Build a [`UnifiEvent`] from raw JSON when typed deserialization fails
/// or the message is a sync/unknown type.
fn event_from_raw(msg_type: &str, data: &serde_json::Value) -> UnifiEvent {
    UnifiEvent {
        key: data["key"].as_str().unwrap_or(msg_type).to_string(),
        subsystem: data["subsystem"].as_str().unwrap_or("unknown").to_string(),
        site_id: data["site_id"].as_str().unwrap_or("").to_string(),
        message: data["msg"]
            .as_str()
            .or_else(|| data["message"].as_str())
            .map(String::from),
        datetime: data["datetime"].as_str().map(String::from),
        extra: data.clone(),
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 ± 0.25)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────
