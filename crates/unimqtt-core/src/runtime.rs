// ── Process wiring ──
//
// Connects the pieces: MQTT pump, controller event stream and the bridge
// loop (plus the controller calls it spawns), all feeding one event channel and sharing one cancellation token.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bridge::Bridge;
use crate::config::BridgeConfig;
use crate::controller;
use crate::error::CoreError;
use crate::mqtt::{self, MqttBus};
use crate::topic::Topics;

const EVENT_CHANNEL_SIZE: usize = 256;

/// Run the bridge until `cancel` fires.
///
/// Returns an error only for problems found before the loop starts;
/// once running, connection failures are logged and retried.
pub async fn run(config: BridgeConfig, cancel: CancellationToken) -> Result<(), CoreError> {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
    let topics = Topics::new(config.name.clone());

    info!(
        host = %config.mqtt.host,
        port = config.mqtt.port,
        tls = config.mqtt.tls,
        "mqtt trying to connect"
    );
    // No explicit DISCONNECT on shutdown, so the broker delivers the
    // retained `online = false` will.
    let (bus, eventloop) = MqttBus::new(&config.mqtt, &topics.online());
    let pump = tokio::spawn(mqtt::pump(eventloop, tx.clone(), cancel.clone()));

    let client = match controller::connect(&config.controller, &cancel).await {
        Ok(client) => client,
        Err(e) => {
            let shutting_down = cancel.is_cancelled();
            cancel.cancel();
            if let Err(join) = pump.await {
                warn!(error = %join, "mqtt task failed");
            }
            return if shutting_down { Ok(()) } else { Err(e) };
        }
    };

    let stream = controller::spawn_event_stream(
        client.clone(),
        &config.controller,
        tx.clone(),
        cancel.child_token(),
    )?;

    let bridge = Bridge::new(config.name, bus, client, config.timings, tx);
    bridge.run(rx, cancel.clone()).await;

    stream.shutdown();
    if let Err(join) = pump.await {
        warn!(error = %join, "mqtt task failed");
    }
    info!("bridge stopped");
    Ok(())
}
