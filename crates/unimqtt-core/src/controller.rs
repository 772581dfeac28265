// ── Controller session setup ──
//
// Detects the controller platform, builds the legacy client and starts
// the event stream. The stream does its own login and reconnects; its
// connect/disconnect notifications are the bridge's controller-online
// signal.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use unimqtt_api::transport::{TlsMode, TransportConfig};
use unimqtt_api::{EventStream, LegacyClient, ReconnectConfig};

use crate::bridge::BridgeEvent;
use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;

const DETECT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Build the legacy client, probing the platform until the controller
/// answers or `cancel` fires.
pub async fn connect(
    config: &ControllerConfig,
    cancel: &CancellationToken,
) -> Result<Arc<LegacyClient>, CoreError> {
    let transport = build_transport(config);
    info!(url = %config.url, "trying to connect to controller");

    let platform = loop {
        match LegacyClient::detect_platform(&config.url, &transport).await {
            Ok(platform) => break platform,
            Err(e) => {
                warn!(error = %e, "controller unreachable, retrying platform detection");
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        return Err(CoreError::ConnectionFailed {
                            url: config.url.to_string(),
                            reason: "shut down before the controller answered".into(),
                        });
                    }
                    () = tokio::time::sleep(DETECT_RETRY_DELAY) => {}
                }
            }
        }
    };
    debug!(?platform, "detected controller platform");

    let client = LegacyClient::new(
        config.url.clone(),
        config.site.clone(),
        platform,
        &transport,
    )?;
    Ok(Arc::new(client))
}

/// Start the login + WebSocket loop, feeding the bridge's event channel.
pub fn spawn_event_stream(
    client: Arc<LegacyClient>,
    config: &ControllerConfig,
    events: mpsc::Sender<BridgeEvent>,
    cancel: CancellationToken,
) -> Result<EventStream, CoreError> {
    let stream = EventStream::spawn(
        client,
        config.credentials.clone(),
        &build_transport(config),
        ReconnectConfig::default(),
        cancel,
        events,
    )?;
    Ok(stream)
}

// ── Helpers ──────────────────────────────────────────────────────

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(config.tls),
        timeout: config.timeout,
        cookie_jar: None, // LegacyClient::new adds one automatically
    }
}

fn tls_to_transport(tls: TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
