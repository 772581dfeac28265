// ── Bridge state machine ──
//
// Owns the registry, the presence tracker and the connection flags, and
// handles one `BridgeEvent` (or timer expiry) at a time. Controller calls
// run as spawned tasks and come back as `BridgeEvent::Reply`, so the loop
// keeps serving the broker and the event stream while a fetch is in
// flight. Command routing, event forwarding and reconciliation are
// inherent impls in sibling modules.

use std::future::Future;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use unimqtt_api::StreamMessage;

use crate::api::{ApiReply, ControllerApi};
use crate::bus::{Bus, Publication};
use crate::model::ControllerEvent;
use crate::payload;
use crate::presence::{PresenceChange, PresenceTracker};
use crate::registry::Registry;
use crate::timer::{self, TimerKind, Timers, Timings};
use crate::topic::{Inbound, Topics};

// ── BridgeEvent ──────────────────────────────────────────────────────

/// Everything that can wake the bridge, apart from its own timers.
#[derive(Debug)]
pub enum BridgeEvent {
    /// The broker accepted our connection (every CONNACK).
    BusConnected,
    /// The broker connection dropped.
    BusDisconnected,
    /// A message on one of our subscriptions.
    BusMessage { topic: String, payload: Bytes },
    /// Something from the controller event stream.
    Controller(StreamMessage),
    /// A controller call started by the bridge finished.
    Reply(ApiReply),
}

impl From<StreamMessage> for BridgeEvent {
    fn from(msg: StreamMessage) -> Self {
        Self::Controller(msg)
    }
}

// ── Bridge ───────────────────────────────────────────────────────────

pub struct Bridge<B, A> {
    pub(crate) topics: Topics,
    pub(crate) bus: B,
    pub(crate) api: A,
    pub(crate) registry: Registry,
    pub(crate) presence: PresenceTracker,
    pub(crate) timers: Timers,
    pub(crate) timings: Timings,
    /// Where spawned controller calls deliver their replies.
    pub(crate) events: mpsc::Sender<BridgeEvent>,
    /// Bumped on every full resync; replies from older ones are dropped.
    pub(crate) generation: u64,
    /// Broker connection is up.
    pub(crate) bus_connected: bool,
    /// Retained client drain has finished; presence may be published.
    pub(crate) bus_ready: bool,
    pub(crate) controller_online: bool,
}

impl<B: Bus, A: ControllerApi + Clone + 'static> Bridge<B, A> {
    /// `events` must be the sending side of the channel later passed to
    /// [`Bridge::run`].
    pub fn new(
        name: impl Into<String>,
        bus: B,
        api: A,
        timings: Timings,
        events: mpsc::Sender<BridgeEvent>,
    ) -> Self {
        Self {
            topics: Topics::new(name),
            bus,
            api,
            registry: Registry::new(),
            presence: PresenceTracker::new(),
            timers: Timers::new(),
            timings,
            events,
            generation: 0,
            bus_connected: false,
            bus_ready: false,
            controller_online: false,
        }
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn is_bus_ready(&self) -> bool {
        self.bus_ready
    }

    pub fn is_controller_online(&self) -> bool {
        self.controller_online
    }

    // ── Event loop ───────────────────────────────────────────────────

    /// Process events and timers until `cancel` fires.
    pub async fn run(mut self, mut events: mpsc::Receiver<BridgeEvent>, cancel: CancellationToken) {
        loop {
            let next = self.timers.next_due();
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                kind = timer::expiry(next) => self.fire(kind),
                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.handle(event);
                }
            }
        }
        debug!("bridge loop exiting");
    }

    /// Handle a single event. Never waits on the network; controller
    /// calls it starts report back later as [`BridgeEvent::Reply`].
    pub fn handle(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::BusConnected => self.on_bus_connected(),
            BridgeEvent::BusDisconnected => {
                self.bus_connected = false;
                info!("mqtt disconnected");
            }
            BridgeEvent::BusMessage { topic, payload } => self.on_bus_message(&topic, &payload),
            BridgeEvent::Controller(StreamMessage::Connected) => self.set_controller_online(true),
            BridgeEvent::Controller(StreamMessage::Disconnected) => {
                self.set_controller_online(false);
            }
            BridgeEvent::Controller(StreamMessage::Event(event)) => {
                self.forward(&ControllerEvent::from(event.as_ref()));
            }
            BridgeEvent::Reply(reply) => self.on_reply(reply),
        }
    }

    /// Run the action for an expired timer.
    pub fn fire(&mut self, kind: TimerKind) {
        self.timers.cancel(kind);
        debug!(timer = %kind, "timer fired");
        match kind {
            TimerKind::RetainedDrain => self.finish_drain(),
            TimerKind::ClientRetry => self.reconcile_clients(),
            TimerKind::WirelessRefetch => self.refetch_wireless(),
        }
    }

    fn on_reply(&mut self, reply: ApiReply) {
        match reply {
            ApiReply::Wireless { purpose, result } => self.on_wireless(purpose, result),
            ApiReply::Devices { purpose, result } => self.on_devices(purpose, result),
            ApiReply::Clients { generation, result } => self.on_clients(generation, result),
            ApiReply::LedSet { device, result } => self.on_led_set(&device, result),
            ApiReply::WirelessSet { network, result } => self.on_wireless_set(&network, result),
        }
    }

    // ── Connection state ─────────────────────────────────────────────

    fn on_bus_connected(&mut self) {
        info!("mqtt connected");
        self.bus_connected = true;

        self.publish(Publication::retained(self.topics.online(), true));
        self.publish(Publication::retained(
            self.topics.controller_online(),
            self.controller_online,
        ));

        let commands = self.topics.command_filter();
        info!(filter = %commands, "mqtt subscribe");
        self.subscribe(&commands);

        if !self.bus_ready {
            self.begin_drain();
        } else if self.controller_online {
            // The broker may have restarted without its retained store.
            info!("mqtt reconnected, republishing controller state");
            self.reconcile();
        }
    }

    fn set_controller_online(&mut self, online: bool) {
        if self.controller_online == online {
            return;
        }
        self.controller_online = online;
        self.publish(Publication::retained(self.topics.controller_online(), online));

        if online {
            info!("unifi connected");
            self.registry.clear();
            self.reconcile();
        } else {
            info!("unifi disconnected");
        }
    }

    fn on_bus_message(&mut self, topic: &str, raw: &[u8]) {
        match self.topics.parse(topic) {
            Some(Inbound::SetLed { device }) => self.set_led(device, &payload::decode(raw)),
            Some(Inbound::SetWifiEnabled { network }) => {
                self.set_wifi_enabled(network, &payload::decode(raw));
            }
            Some(Inbound::RetainedClient { network, hostname }) => {
                self.on_retained_client(topic, network, hostname, raw);
            }
            None => debug!(topic, "ignoring message"),
        }
    }

    // ── Controller calls ─────────────────────────────────────────────

    /// Run a controller call off the loop. Its reply re-enters through the
    /// event channel.
    pub(crate) fn request<F, Fut>(&self, call: F)
    where
        F: FnOnce(A) -> Fut,
        Fut: Future<Output = ApiReply> + Send + 'static,
    {
        let reply = call(self.api.clone());
        let events = self.events.clone();
        tokio::spawn(async move {
            if events.send(BridgeEvent::Reply(reply.await)).await.is_err() {
                debug!("bridge loop gone, dropping controller reply");
            }
        });
    }

    // ── Publishing ───────────────────────────────────────────────────

    /// Hand a publication to the bus. While the broker is away the client
    /// queues it and delivers it after reconnecting.
    pub(crate) fn publish(&self, publication: Publication) {
        if self.bus_connected {
            debug!(topic = %publication.topic, payload = %publication.payload, "mqtt >");
        } else {
            debug!(topic = %publication.topic, "mqtt offline, queueing publication");
        }
        if let Err(e) = self.bus.publish(publication) {
            warn!(error = %e, "mqtt publish failed");
        }
    }

    pub(crate) fn subscribe(&self, filter: &str) {
        if let Err(e) = self.bus.subscribe(filter) {
            warn!(filter, error = %e, "mqtt subscribe failed");
        }
    }

    pub(crate) fn unsubscribe(&self, filter: &str) {
        if let Err(e) = self.bus.unsubscribe(filter) {
            warn!(filter, error = %e, "mqtt unsubscribe failed");
        }
    }

    pub(crate) fn publish_change(&self, change: &PresenceChange) {
        self.publish(Publication::retained(
            self.topics.wifi_client(&change.network, &change.hostname),
            payload::client_status(change.present, change.mac.as_deref(), change.ts),
        ));
    }

    /// Per-network `clientCount` and `enabled`, then the overall count.
    pub(crate) fn publish_summary(&self) {
        let summary = self.presence.summary(&self.registry);
        let ts = payload::now_ms();
        for network in &summary.networks {
            self.publish(Publication::retained(
                self.topics.wifi_client_count(&network.name),
                payload::status_at(network.count, ts),
            ));
            self.publish(Publication::retained(
                self.topics.wifi_enabled(&network.name),
                payload::status_at(network.enabled, ts),
            ));
        }
        self.publish(Publication::retained(
            self.topics.client_count(),
            payload::status_at(summary.total, ts),
        ));
    }

    pub(crate) fn schedule(&mut self, kind: TimerKind) {
        let delay = self.timings.delay(kind);
        debug!(timer = %kind, delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), "timer scheduled");
        self.timers.schedule(kind, delay);
    }
}
