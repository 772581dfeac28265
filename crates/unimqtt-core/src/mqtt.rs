// ── MQTT adapter ──
//
// `MqttBus` wraps rumqttc's `AsyncClient` behind the `Bus` trait using the
// non-blocking `try_*` calls, so the bridge loop never waits on the
// broker. `pump` drives the rumqttc event loop and turns CONNACKs,
// dropped connections and inbound publishes into `BridgeEvent`s.

use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, LastWill, MqttOptions, Packet, QoS, Transport};
use secrecy::ExposeSecret;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bridge::BridgeEvent;
use crate::bus::{Bus, Publication};
use crate::config::MqttConfig;
use crate::error::CoreError;
use crate::payload;

/// Outstanding requests rumqttc buffers before `try_publish` fails. While
/// the broker is unreachable this holds everything published meanwhile.
const REQUEST_CAPACITY: usize = 1024;
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

pub struct MqttBus {
    client: AsyncClient,
}

impl MqttBus {
    /// Build the client and its event loop. Nothing connects until the
    /// event loop is polled.
    ///
    /// `will_topic` receives a retained `false` if the connection dies.
    pub fn new(config: &MqttConfig, will_topic: &str) -> (Self, EventLoop) {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(config.keep_alive);
        if let Some(ref user) = config.username {
            let password = config
                .password
                .as_ref()
                .map(|p| p.expose_secret().to_owned())
                .unwrap_or_default();
            options.set_credentials(user, password);
        }
        options.set_last_will(LastWill::new(will_topic, "false", QoS::AtLeastOnce, true));
        if config.tls {
            options.set_transport(Transport::tls_with_default_config());
        }

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        (Self { client }, eventloop)
    }
}

impl Bus for MqttBus {
    fn publish(&self, publication: Publication) -> Result<(), CoreError> {
        self.client.try_publish(
            publication.topic,
            QoS::AtLeastOnce,
            publication.retain,
            payload::encode(&publication.payload),
        )?;
        Ok(())
    }

    fn subscribe(&self, filter: &str) -> Result<(), CoreError> {
        self.client.try_subscribe(filter, QoS::AtLeastOnce)?;
        Ok(())
    }

    fn unsubscribe(&self, filter: &str) -> Result<(), CoreError> {
        self.client.try_unsubscribe(filter)?;
        Ok(())
    }
}

// ── Event loop pump ──────────────────────────────────────────────────

/// Poll the rumqttc event loop until cancelled, forwarding connection
/// changes and inbound messages. Connection errors are retried every
/// second; rumqttc reconnects on the next poll.
pub async fn pump(
    mut eventloop: EventLoop,
    events: mpsc::Sender<BridgeEvent>,
    cancel: CancellationToken,
) {
    let mut connected = false;

    loop {
        let polled = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            polled = eventloop.poll() => polled,
        };

        let event = match polled {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                if ack.code == ConnectReturnCode::Success {
                    connected = true;
                    Some(BridgeEvent::BusConnected)
                } else {
                    warn!(code = ?ack.code, "mqtt connection refused");
                    None
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                debug!(topic = %publish.topic, "mqtt <");
                Some(BridgeEvent::BusMessage {
                    topic: publish.topic,
                    payload: publish.payload,
                })
            }
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "mqtt connection error");
                let dropped = connected.then_some(BridgeEvent::BusDisconnected);
                connected = false;
                if let Some(event) = dropped {
                    if events.send(event).await.is_err() {
                        break;
                    }
                }
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(RECONNECT_DELAY) => {}
                }
                None
            }
        };

        if let Some(event) = event {
            if events.send(event).await.is_err() {
                break;
            }
        }
    }

    info!("mqtt event loop stopped");
}
